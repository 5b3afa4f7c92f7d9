//! Core domain types shared across the Graph Curator workspace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

pub mod comments;
pub mod ontology;

pub use comments::{build_comment_tree, CommentContent, CommentNode, CommentTree, COMMENT_PATH_KEY};
pub use ontology::{Concept, Ontology, OntologyProperty, Relationship};

// =============================================================================
// Element Identifiers
// =============================================================================

/// Identifier for a vertex (entity) in the graph.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

/// Identifier for an edge (relationship instance) in the graph.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl VertexId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EdgeId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// Graph Elements
// =============================================================================

/// A single property value attached to a graph element.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Multi-value key; distinguishes several values of the same property.
    pub key: String,
    /// Ontology property name (IRI).
    #[serde(default)]
    pub name: String,
    /// The property value.
    #[serde(default)]
    pub value: Value,
    /// Arbitrary metadata, e.g. the comment ancestor path.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Property {
    /// Create a property with the given key and value and no metadata.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attach a metadata value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a metadata value as a string, if present and textual.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A vertex as returned by the vertex store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    /// Unique identifier.
    pub id: VertexId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Concept IRI this vertex is an instance of.
    #[serde(default)]
    pub concept_type: String,
    /// Property values.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Vertex {
    /// Create a vertex with an id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: VertexId(id.into()),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// An edge as returned by the edge store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier.
    pub id: EdgeId,
    /// Relationship IRI.
    #[serde(default)]
    pub label: String,
    /// Source vertex.
    pub out_vertex_id: VertexId,
    /// Destination vertex.
    pub in_vertex_id: VertexId,
    /// Property values.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Edge {
    /// Create an edge between two vertices.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        out_vertex_id: impl Into<String>,
        in_vertex_id: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId(id.into()),
            label: label.into(),
            out_vertex_id: VertexId(out_vertex_id.into()),
            in_vertex_id: VertexId(in_vertex_id.into()),
            properties: Vec::new(),
        }
    }
}

// =============================================================================
// Selection Identifiers
// =============================================================================

/// The ids making up a selection, partitioned into vertices and edges.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionIds {
    /// Selected vertex ids, in selection order.
    #[serde(default)]
    pub vertex_ids: Vec<VertexId>,
    /// Selected edge ids, in selection order.
    #[serde(default)]
    pub edge_ids: Vec<EdgeId>,
}

impl SelectionIds {
    /// Build from id lists, dropping duplicates while keeping first occurrence order.
    pub fn new(vertex_ids: Vec<VertexId>, edge_ids: Vec<EdgeId>) -> Self {
        Self {
            vertex_ids: dedup_preserving_order(vertex_ids),
            edge_ids: dedup_preserving_order(edge_ids),
        }
    }

    /// An empty selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of selected elements.
    pub fn len(&self) -> usize {
        self.vertex_ids.len() + self.edge_ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty() && self.edge_ids.is_empty()
    }

    /// Check whether a vertex is part of the selection.
    pub fn contains_vertex(&self, id: &VertexId) -> bool {
        self.vertex_ids.contains(id)
    }

    /// Check whether an edge is part of the selection.
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge_ids.contains(id)
    }

    /// Id-set equality, ignoring order.
    pub fn same_elements(&self, other: &SelectionIds) -> bool {
        let ours: HashSet<&VertexId> = self.vertex_ids.iter().collect();
        let theirs: HashSet<&VertexId> = other.vertex_ids.iter().collect();
        if ours != theirs {
            return false;
        }
        let ours: HashSet<&EdgeId> = self.edge_ids.iter().collect();
        let theirs: HashSet<&EdgeId> = other.edge_ids.iter().collect();
        ours == theirs
    }

    /// Copy of this selection with the given ids removed.
    pub fn without(&self, vertex_ids: &[VertexId], edge_ids: &[EdgeId]) -> Self {
        Self {
            vertex_ids: self
                .vertex_ids
                .iter()
                .filter(|id| !vertex_ids.contains(id))
                .cloned()
                .collect(),
            edge_ids: self
                .edge_ids
                .iter()
                .filter(|id| !edge_ids.contains(id))
                .cloned()
                .collect(),
        }
    }
}

fn dedup_preserving_order<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Truncate a title to at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    let trimmed = title.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_elements_ignores_order() {
        let a = SelectionIds::new(vec!["v1".into(), "v2".into()], vec!["e1".into()]);
        let b = SelectionIds::new(vec!["v2".into(), "v1".into()], vec!["e1".into()]);
        assert!(a.same_elements(&b));
        assert!(!a.same_elements(&SelectionIds::new(vec!["v1".into()], vec!["e1".into()])));
    }

    #[test]
    fn test_new_drops_duplicate_ids() {
        let ids = SelectionIds::new(vec!["v1".into(), "v1".into(), "v2".into()], vec![]);
        assert_eq!(ids.vertex_ids, vec![VertexId::new("v1"), VertexId::new("v2")]);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_without_removes_deleted_ids() {
        let ids = SelectionIds::new(vec!["v1".into(), "v2".into()], vec!["e1".into()]);
        let reduced = ids.without(&["v1".into()], &["e1".into()]);
        assert_eq!(reduced.vertex_ids, vec![VertexId::new("v2")]);
        assert!(reduced.edge_ids.is_empty());
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short", 10), "short");
        assert_eq!(truncate_title("a rather long title", 8), "a rather…");
        assert_eq!(truncate_title("ünïcödé tïtle", 3), "ünï…");
    }

    #[test]
    fn test_vertex_deserializes_camel_case() {
        let json = r#"{"id":"v1","title":"Alice","conceptType":"person"}"#;
        let vertex: Vertex = serde_json::from_str(json).unwrap();
        assert_eq!(vertex.id, VertexId::new("v1"));
        assert_eq!(vertex.concept_type, "person");
        assert!(vertex.properties.is_empty());
    }
}
