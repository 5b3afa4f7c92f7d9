//! Error types for the operations layer.

use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur during operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// A data request to the backing store failed.
    #[error("Data request for {resource} failed: {message}")]
    DataRequest { resource: String, message: String },

    /// A concept id is not part of the ontology.
    #[error("Unknown concept {0}")]
    UnknownConcept(String),

    /// A relationship id is not part of the ontology.
    #[error("Unknown relationship {0}")]
    UnknownRelationship(String),

    /// A parent chain loops back on itself.
    #[error("Cyclic hierarchy at {id}: {}", .chain.join(" -> "))]
    CyclicHierarchy { id: String, chain: Vec<String> },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context.
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl OpsError {
    /// Create a new error with additional context.
    pub fn with_context(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a data request error.
    pub fn data_request(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataRequest {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for OpsError {
    fn from(err: anyhow::Error) -> Self {
        OpsError::WithContext {
            context: "Operation failed".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = OpsError::CyclicHierarchy {
            id: "a".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic hierarchy at a: a -> b -> a");
    }

    #[test]
    fn test_anyhow_errors_convert() {
        let err: OpsError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "Operation failed: boom");
    }
}
