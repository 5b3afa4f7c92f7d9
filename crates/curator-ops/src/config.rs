//! Configuration for the operations layer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{OpsError, OpsResult};

/// Server-side property controlling the history stack size.
pub const HISTORY_STACK_MAX_KEY: &str = "detail.history.stack.max";

/// Environment override for the history stack size.
pub const HISTORY_STACK_MAX_ENV: &str = "CURATOR_HISTORY_STACK_MAX";

/// Configuration for curator operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of visible entries in the selection history.
    #[serde(default = "default_history_stack_max", rename = "detail.history.stack.max")]
    pub history_stack_max: usize,

    /// Maximum characters of an endpoint title in edge stack titles.
    #[serde(default = "default_title_truncate")]
    pub title_truncate: usize,

    /// Concept every ontology concept ultimately descends from.
    #[serde(default = "default_root_concept_iri")]
    pub root_concept_iri: String,

    /// Concept marking the top of the real entity hierarchy.
    #[serde(default = "default_entity_root_concept_iri")]
    pub entity_root_concept_iri: String,
}

fn default_history_stack_max() -> usize {
    5
}

fn default_title_truncate() -> usize {
    15
}

fn default_root_concept_iri() -> String {
    "http://www.w3.org/2002/07/owl#Thing".to_string()
}

fn default_entity_root_concept_iri() -> String {
    "http://curator.graph/ontology#root".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_stack_max: default_history_stack_max(),
            title_truncate: default_title_truncate(),
            root_concept_iri: default_root_concept_iri(),
            entity_root_concept_iri: default_entity_root_concept_iri(),
        }
    }
}

impl Config {
    /// Load configuration from disk with environment overrides.
    pub fn load() -> OpsResult<Self> {
        let config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> OpsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| {
            OpsError::with_context(format!("Invalid config {}", path.display()), err.to_string())
        })
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> OpsResult<Self> {
        if let Ok(value) = std::env::var(HISTORY_STACK_MAX_ENV) {
            self.set(HISTORY_STACK_MAX_KEY, &value)?;
        }
        Ok(self)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> OpsResult<()> {
        if let Some(path) = Self::config_file_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> OpsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("graph", "curator", "curator")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Overlay properties served by the backend.
    ///
    /// Unknown keys are ignored; malformed values are logged and skipped.
    pub fn apply_server_properties(&mut self, properties: &HashMap<String, String>) {
        for (key, value) in properties {
            if self.get(key).is_none() {
                continue;
            }
            if let Err(err) = self.set(key, value) {
                warn!(key = %key, value = %value, error = %err, "Ignoring server property");
            }
        }
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            HISTORY_STACK_MAX_KEY => Some(self.history_stack_max.to_string()),
            "title_truncate" => Some(self.title_truncate.to_string()),
            "root_concept_iri" => Some(self.root_concept_iri.clone()),
            "entity_root_concept_iri" => Some(self.entity_root_concept_iri.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OpsResult<()> {
        match key {
            HISTORY_STACK_MAX_KEY => {
                self.history_stack_max = parse_count(value)?;
            }
            "title_truncate" => {
                self.title_truncate = parse_count(value)?;
            }
            "root_concept_iri" => {
                self.root_concept_iri = value.to_string();
            }
            "entity_root_concept_iri" => {
                self.entity_root_concept_iri = value.to_string();
            }
            _ => {
                return Err(OpsError::Config(format!("Unknown config key: {}", key)));
            }
        }
        Ok(())
    }

    /// All known keys, in display order.
    pub fn keys() -> &'static [&'static str] {
        &[
            HISTORY_STACK_MAX_KEY,
            "title_truncate",
            "root_concept_iri",
            "entity_root_concept_iri",
        ]
    }
}

fn parse_count(value: &str) -> OpsResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| OpsError::Config(format!("Invalid number: {}", value)))
}
