//! Derived ontology views.
//!
//! The server hands out flat maps of concepts, relationships and properties.
//! [`OntologyProjection`] turns them into the shapes the admin screens and
//! search filters need and memoizes the results until the ontology changes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use curator_core::{Concept, Ontology, OntologyProperty, Relationship};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;
use petgraph::Direction;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{combined_stats, CacheStats, MemoCache};
use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::facade::DataRequest;

/// A concept with its sub-concepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptNode {
    /// The concept, with glyph icon and color inherited from its ancestors
    /// when it does not set its own.
    pub concept: Concept,
    /// Sub-concepts ordered by display name.
    pub children: Vec<ConceptNode>,
}

impl ConceptNode {
    /// Number of concepts in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ConceptNode::size).sum::<usize>()
    }

    /// Find a concept in this subtree.
    pub fn find(&self, id: &str) -> Option<&ConceptNode> {
        if self.concept.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Source/destination concept pairs mapped to the relationships allowed
/// between them, expanded over every sub-concept.
#[derive(Debug, Clone, Default)]
pub struct RelationshipLookup {
    pairs: HashMap<(String, String), Vec<String>>,
}

impl RelationshipLookup {
    /// Relationship titles allowed from `source` to `dest`.
    pub fn between(&self, source: &str, dest: &str) -> &[String] {
        self.pairs
            .get(&(source.to_string(), dest.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of concept pairs with at least one relationship.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair has a relationship.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Immutable indexes over one ontology snapshot.
#[derive(Debug)]
struct OntologyIndex {
    ontology: Ontology,
    root_iri: String,
    entity_root_iri: String,
    hierarchy: StableDiGraph<String, ()>,
    node_of: HashMap<String, NodeIndex>,
}

impl OntologyIndex {
    fn new(ontology: Ontology, root_iri: &str, entity_root_iri: &str) -> Self {
        let mut hierarchy = StableDiGraph::new();
        let mut node_of = HashMap::new();

        let mut ids: Vec<&String> = ontology.concepts.keys().collect();
        ids.sort();
        for id in ids {
            node_of.insert(id.clone(), hierarchy.add_node(id.clone()));
        }
        if !node_of.contains_key(root_iri) {
            let root = hierarchy.add_node(root_iri.to_string());
            node_of.insert(root_iri.to_string(), root);
        }

        for concept in ontology.concepts.values() {
            let Some(parent) = concept.parent_concept.as_deref() else {
                continue;
            };
            match (node_of.get(parent), node_of.get(&concept.id)) {
                (Some(&parent_idx), Some(&child_idx)) => {
                    hierarchy.add_edge(parent_idx, child_idx, ());
                }
                _ => debug!(concept = %concept.id, parent = %parent, "Parent concept not in ontology"),
            }
        }

        Self {
            ontology,
            root_iri: root_iri.to_string(),
            entity_root_iri: entity_root_iri.to_string(),
            hierarchy,
            node_of,
        }
    }

    fn concept(&self, id: &str) -> OpsResult<&Concept> {
        self.ontology
            .concepts
            .get(id)
            .ok_or_else(|| OpsError::UnknownConcept(id.to_string()))
    }

    fn relationship(&self, id: &str) -> OpsResult<&Relationship> {
        self.ontology
            .relationships
            .get(id)
            .ok_or_else(|| OpsError::UnknownRelationship(id.to_string()))
    }

    /// Walk a parent chain, failing on loops. The returned chain excludes
    /// `id` and ends at the first id with no known parent.
    fn walk_parents<'a>(
        id: &str,
        first_parent: Option<&'a str>,
        parent_of: impl Fn(&str) -> Option<&'a str>,
    ) -> OpsResult<Vec<String>> {
        let mut visited = HashSet::from([id.to_string()]);
        let mut chain = Vec::new();
        let mut current = first_parent;

        while let Some(parent) = current {
            if !visited.insert(parent.to_string()) {
                let mut looped = vec![id.to_string()];
                looped.extend(chain);
                looped.push(parent.to_string());
                return Err(OpsError::CyclicHierarchy {
                    id: id.to_string(),
                    chain: looped,
                });
            }
            chain.push(parent.to_string());
            current = parent_of(parent);
        }

        Ok(chain)
    }

    fn concept_ancestors(&self, id: &str) -> OpsResult<Vec<String>> {
        let concept = self.concept(id)?;
        Self::walk_parents(id, concept.parent_concept.as_deref(), |parent| {
            self.ontology
                .concepts
                .get(parent)
                .and_then(|c| c.parent_concept.as_deref())
        })
    }

    fn relationship_ancestors(&self, id: &str) -> OpsResult<Vec<String>> {
        let relationship = self.relationship(id)?;
        Self::walk_parents(id, relationship.parent_iri.as_deref(), |parent| {
            self.ontology
                .relationships
                .get(parent)
                .and_then(|r| r.parent_iri.as_deref())
        })
    }

    /// The concept and every transitive sub-concept.
    fn descendants(&self, id: &str) -> Vec<String> {
        let Some(&start) = self.node_of.get(id) else {
            return vec![id.to_string()];
        };
        let mut out = Vec::new();
        let mut dfs = Dfs::new(&self.hierarchy, start);
        while let Some(node) = dfs.next(&self.hierarchy) {
            out.push(self.hierarchy[node].clone());
        }
        out
    }

    fn concept_tree(&self) -> ConceptNode {
        let root = self
            .ontology
            .concepts
            .get(&self.root_iri)
            .cloned()
            .unwrap_or_else(|| Concept::new(self.root_iri.clone(), None));
        let mut visited = HashSet::new();
        self.concept_subtree(root, None, None, &mut visited)
    }

    fn concept_subtree(
        &self,
        mut concept: Concept,
        inherited_icon: Option<&str>,
        inherited_color: Option<&str>,
        visited: &mut HashSet<String>,
    ) -> ConceptNode {
        visited.insert(concept.id.clone());
        if concept.glyph_icon_href.is_none() {
            concept.glyph_icon_href = inherited_icon.map(str::to_string);
        }
        if concept.color.is_none() {
            concept.color = inherited_color.map(str::to_string);
        }

        let mut children: Vec<Concept> = match self.node_of.get(&concept.id) {
            Some(&idx) => self
                .hierarchy
                .neighbors_directed(idx, Direction::Outgoing)
                .filter_map(|child| self.ontology.concepts.get(&self.hierarchy[child]))
                .filter(|child| !visited.contains(&child.id))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        children.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.id.cmp(&b.id))
        });

        let icon = concept.glyph_icon_href.clone();
        let color = concept.color.clone();
        let children = children
            .into_iter()
            .map(|child| self.concept_subtree(child, icon.as_deref(), color.as_deref(), visited))
            .collect();

        ConceptNode { concept, children }
    }

    fn entity_concepts(&self) -> Vec<Concept> {
        let mut concepts: Vec<&Concept> = self
            .ontology
            .concepts
            .values()
            .filter(|c| c.id != self.root_iri && c.id != self.entity_root_iri)
            .collect();
        concepts.sort_by(|a, b| a.id.cmp(&b.id));

        concepts
            .into_iter()
            .filter(|concept| match self.concept_ancestors(&concept.id) {
                Ok(chain) if chain.iter().any(|id| *id == self.entity_root_iri) => true,
                Ok(chain) if chain.last().map(String::as_str) == Some(self.root_iri.as_str()) => {
                    false
                }
                Ok(chain) => {
                    error!(
                        concept = %concept.id,
                        last = chain.last().map(String::as_str).unwrap_or("<none>"),
                        "Concept lineage does not reach the root concept"
                    );
                    false
                }
                Err(err) => {
                    error!(concept = %concept.id, error = %err, "Concept lineage cannot be traced");
                    false
                }
            })
            .cloned()
            .collect()
    }

    fn resolve_properties(&self, owner: &str, ids: Vec<&String>) -> Vec<OntologyProperty> {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| match self.ontology.properties.get(id) {
                Some(property) => Some(property.clone()),
                None => {
                    warn!(owner = %owner, property = %id, "Property not defined in ontology");
                    None
                }
            })
            .collect()
    }

    fn concept_properties(&self, id: &str, include_inherited: bool) -> OpsResult<Vec<OntologyProperty>> {
        let concept = self.concept(id)?;
        let mut ids: Vec<&String> = concept.properties.iter().collect();
        if include_inherited {
            for ancestor in self.concept_ancestors(id)? {
                if let Some(parent) = self.ontology.concepts.get(&ancestor) {
                    ids.extend(parent.properties.iter());
                }
            }
        }
        Ok(self.resolve_properties(id, ids))
    }

    fn relationship_properties(
        &self,
        id: &str,
        include_inherited: bool,
    ) -> OpsResult<Vec<OntologyProperty>> {
        let relationship = self.relationship(id)?;
        let mut ids: Vec<&String> = relationship.properties.iter().collect();
        if include_inherited {
            for ancestor in self.relationship_ancestors(id)? {
                if let Some(parent) = self.ontology.relationships.get(&ancestor) {
                    ids.extend(parent.properties.iter());
                }
            }
        }
        Ok(self.resolve_properties(id, ids))
    }

    fn relationship_lookup(&self) -> RelationshipLookup {
        let mut relationships: Vec<&Relationship> = self.ontology.relationships.values().collect();
        relationships.sort_by(|a, b| a.title.cmp(&b.title));

        let mut lookup = RelationshipLookup::default();
        for relationship in relationships {
            let sources: Vec<String> = relationship
                .domain_concept_iris
                .iter()
                .flat_map(|iri| self.descendants(iri))
                .collect();
            let dests: Vec<String> = relationship
                .range_concept_iris
                .iter()
                .flat_map(|iri| self.descendants(iri))
                .collect();

            for source in &sources {
                for dest in &dests {
                    let titles = lookup
                        .pairs
                        .entry((source.clone(), dest.clone()))
                        .or_default();
                    if !titles.contains(&relationship.title) {
                        titles.push(relationship.title.clone());
                    }
                }
            }
        }
        lookup
    }
}

/// Memoized derivations for one snapshot.
#[derive(Debug, Default)]
struct DerivationCache {
    concept_tree: MemoCache<(), Arc<ConceptNode>>,
    entity_concepts: MemoCache<(), Arc<Vec<Concept>>>,
    concept_properties: MemoCache<(String, bool), Arc<Vec<OntologyProperty>>>,
    relationship_properties: MemoCache<(String, bool), Arc<Vec<OntologyProperty>>>,
    relationship_lookup: MemoCache<(), Arc<RelationshipLookup>>,
}

impl DerivationCache {
    fn new(snapshot: u64) -> Self {
        Self {
            concept_tree: MemoCache::new(snapshot),
            entity_concepts: MemoCache::new(snapshot),
            concept_properties: MemoCache::new(snapshot),
            relationship_properties: MemoCache::new(snapshot),
            relationship_lookup: MemoCache::new(snapshot),
        }
    }

    fn invalidate(&mut self, snapshot: u64) {
        self.concept_tree.invalidate(snapshot);
        self.entity_concepts.invalidate(snapshot);
        self.concept_properties.invalidate(snapshot);
        self.relationship_properties.invalidate(snapshot);
        self.relationship_lookup.invalidate(snapshot);
    }

    fn stats(&self) -> CacheStats {
        combined_stats([
            self.concept_tree.stats(),
            self.entity_concepts.stats(),
            self.concept_properties.stats(),
            self.relationship_properties.stats(),
            self.relationship_lookup.stats(),
        ])
    }
}

/// Derived, memoized views over an ontology snapshot.
#[derive(Debug)]
pub struct OntologyProjection {
    index: OntologyIndex,
    cache: DerivationCache,
}

impl OntologyProjection {
    /// Build a projection over an ontology.
    pub fn new(ontology: Ontology, config: &Config) -> Self {
        let snapshot = ontology.version;
        Self {
            index: OntologyIndex::new(
                ontology,
                &config.root_concept_iri,
                &config.entity_root_concept_iri,
            ),
            cache: DerivationCache::new(snapshot),
        }
    }

    /// Fetch the ontology through the data facade and project it.
    pub async fn load(data: &dyn DataRequest, config: &Config) -> OpsResult<Self> {
        let ontology = data.ontology().await?;
        info!(
            version = ontology.version,
            concepts = ontology.concepts.len(),
            relationships = ontology.relationships.len(),
            "Loaded ontology"
        );
        Ok(Self::new(ontology, config))
    }

    /// The underlying snapshot.
    pub fn ontology(&self) -> &Ontology {
        &self.index.ontology
    }

    /// Version of the underlying snapshot.
    pub fn version(&self) -> u64 {
        self.index.ontology.version
    }

    /// Swap in a new snapshot. Memoized derivations are dropped when it
    /// differs from the current one; returns whether that happened.
    pub fn replace(&mut self, ontology: Ontology) -> bool {
        if ontology == self.index.ontology {
            return false;
        }
        let previous = self.version();
        self.cache.invalidate(ontology.version);
        self.index = OntologyIndex::new(
            ontology,
            &self.index.root_iri,
            &self.index.entity_root_iri,
        );
        info!(previous, current = self.version(), "Ontology changed; derived views invalidated");
        true
    }

    /// Cache counters across all derivations.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Ancestor chain of a concept, nearest parent first.
    pub fn ancestors(&self, concept_id: &str) -> OpsResult<Vec<String>> {
        self.index.concept_ancestors(concept_id)
    }

    /// The concept and all of its transitive sub-concepts.
    pub fn descendants(&self, concept_id: &str) -> Vec<String> {
        self.index.descendants(concept_id)
    }

    /// Concept tree rooted at the configured root concept.
    pub fn concept_tree(&mut self) -> Arc<ConceptNode> {
        let index = &self.index;
        self.cache
            .concept_tree
            .get_or_insert_with((), || Arc::new(index.concept_tree()))
    }

    /// Concepts that descend from the entity root; untraceable ones are
    /// logged and left out.
    pub fn entity_concepts(&mut self) -> Arc<Vec<Concept>> {
        let index = &self.index;
        self.cache
            .entity_concepts
            .get_or_insert_with((), || Arc::new(index.entity_concepts()))
    }

    /// Properties of a concept, optionally including inherited ones.
    pub fn properties_by_concept(
        &mut self,
        concept_id: &str,
        include_inherited: bool,
    ) -> OpsResult<Arc<Vec<OntologyProperty>>> {
        let index = &self.index;
        self.cache.concept_properties.get_or_try_insert_with(
            (concept_id.to_string(), include_inherited),
            || index.concept_properties(concept_id, include_inherited).map(Arc::new),
        )
    }

    /// Properties of a relationship, optionally including inherited ones.
    pub fn properties_by_relationship(
        &mut self,
        relationship_id: &str,
        include_inherited: bool,
    ) -> OpsResult<Arc<Vec<OntologyProperty>>> {
        let index = &self.index;
        self.cache.relationship_properties.get_or_try_insert_with(
            (relationship_id.to_string(), include_inherited),
            || {
                index
                    .relationship_properties(relationship_id, include_inherited)
                    .map(Arc::new)
            },
        )
    }

    /// The expanded source/destination lookup table.
    pub fn relationship_lookup(&mut self) -> Arc<RelationshipLookup> {
        let index = &self.index;
        self.cache
            .relationship_lookup
            .get_or_insert_with((), || Arc::new(index.relationship_lookup()))
    }

    /// Relationships allowed from `source` to `dest`, including those
    /// declared on any of their ancestors.
    pub fn relationships_between(&mut self, source: &str, dest: &str) -> Vec<Relationship> {
        let lookup = self.relationship_lookup();
        lookup
            .between(source, dest)
            .iter()
            .filter_map(|title| self.index.ontology.relationships.get(title).cloned())
            .collect()
    }
}

/// Workspace-scoped ontology projections.
#[derive(Debug, Default)]
pub struct OntologyRegistry {
    config: Config,
    projections: HashMap<String, OntologyProjection>,
}

impl OntologyRegistry {
    /// Create an empty registry.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            projections: HashMap::new(),
        }
    }

    /// Record the ontology of a workspace. Returns `true` when an existing
    /// projection changed and its derivations were dropped.
    pub fn apply(&mut self, workspace_id: &str, ontology: Ontology) -> bool {
        match self.projections.get_mut(workspace_id) {
            Some(projection) => projection.replace(ontology),
            None => {
                debug!(workspace = %workspace_id, version = ontology.version, "Tracking workspace ontology");
                self.projections.insert(
                    workspace_id.to_string(),
                    OntologyProjection::new(ontology, &self.config),
                );
                false
            }
        }
    }

    /// Projection for a workspace.
    pub fn get_mut(&mut self, workspace_id: &str) -> Option<&mut OntologyProjection> {
        self.projections.get_mut(workspace_id)
    }

    /// Stop tracking a workspace.
    pub fn remove(&mut self, workspace_id: &str) -> Option<OntologyProjection> {
        self.projections.remove(workspace_id)
    }
}
