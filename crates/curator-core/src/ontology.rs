//! Ontology records as delivered by the server.
//!
//! These are read-only projections; derived views (concept trees, inherited
//! properties, relationship lookups) live in the operations layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node type in the ontology.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Concept IRI.
    pub id: String,
    /// Short title, usually the same as `id`.
    #[serde(default)]
    pub title: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Parent concept IRI; `None` only for the root.
    #[serde(default)]
    pub parent_concept: Option<String>,
    /// Icon used when rendering instances.
    #[serde(default)]
    pub glyph_icon_href: Option<String>,
    /// Display color, e.g. `rgb(0, 102, 204)`.
    #[serde(default)]
    pub color: Option<String>,
    /// Property IRIs owned by this concept, in declaration order.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Whether the concept should be shown to end users.
    #[serde(default = "default_true")]
    pub user_visible: bool,
}

impl Concept {
    /// Create a concept with the given IRI and parent.
    pub fn new(id: impl Into<String>, parent: Option<&str>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            display_name: id.clone(),
            id,
            parent_concept: parent.map(str::to_string),
            user_visible: true,
            ..Default::default()
        }
    }

    /// Builder-style property list.
    pub fn with_properties(mut self, properties: &[&str]) -> Self {
        self.properties = properties.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// An edge type in the ontology.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Relationship IRI.
    pub title: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Parent relationship IRI.
    #[serde(default)]
    pub parent_iri: Option<String>,
    /// Concepts allowed as the edge source.
    #[serde(default)]
    pub domain_concept_iris: Vec<String>,
    /// Concepts allowed as the edge destination.
    #[serde(default)]
    pub range_concept_iris: Vec<String>,
    /// Property IRIs owned by this relationship.
    #[serde(default)]
    pub properties: Vec<String>,
}

impl Relationship {
    /// Create a relationship between the given domain and range concepts.
    pub fn new(title: impl Into<String>, domain: &[&str], range: &[&str]) -> Self {
        let title = title.into();
        Self {
            display_name: title.clone(),
            title,
            domain_concept_iris: domain.iter().map(|c| c.to_string()).collect(),
            range_concept_iris: range.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// A property definition in the ontology.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyProperty {
    /// Property IRI.
    pub title: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Value type, e.g. `string`, `date`, `geoLocation`.
    #[serde(default)]
    pub data_type: String,
    /// Whether the property should be shown to end users.
    #[serde(default = "default_true")]
    pub user_visible: bool,
    /// Whether the property can be used in search filters.
    #[serde(default)]
    pub searchable: bool,
}

impl OntologyProperty {
    /// Create a string-typed property definition.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            display_name: title.clone(),
            title,
            data_type: "string".to_string(),
            user_visible: true,
            searchable: true,
        }
    }
}

/// A full ontology snapshot.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    /// Snapshot version; changes whenever the server-side ontology changes.
    #[serde(default)]
    pub version: u64,
    /// Concepts keyed by IRI.
    #[serde(default)]
    pub concepts: HashMap<String, Concept>,
    /// Relationships keyed by IRI.
    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
    /// Property definitions keyed by IRI.
    #[serde(default)]
    pub properties: HashMap<String, OntologyProperty>,
}

impl Ontology {
    /// Create an empty ontology at the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Add a concept, keyed by its id.
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.insert(concept.id.clone(), concept);
        self
    }

    /// Add a relationship, keyed by its title.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships
            .insert(relationship.title.clone(), relationship);
        self
    }

    /// Add a property definition, keyed by its title.
    pub fn with_property(mut self, property: OntologyProperty) -> Self {
        self.properties.insert(property.title.clone(), property);
        self
    }
}

fn default_true() -> bool {
    true
}
