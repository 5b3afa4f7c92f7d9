//! Selection history ("previously viewed") stack.
//!
//! Entries are kept oldest first. The newest entry mirrors the current
//! selection and stays hidden until something else is selected; entries whose
//! elements no longer resolve stay in the stack but are hidden too.

use std::collections::{HashMap, HashSet};

use curator_core::{truncate_title, Edge, EdgeId, SelectionIds, Vertex, VertexId};
use serde::{Deserialize, Serialize};

/// One historical selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackEntry {
    /// Selected vertex ids.
    pub vertex_ids: Vec<VertexId>,
    /// Selected edge ids.
    pub edge_ids: Vec<EdgeId>,
    /// Whether the entry is left out of the visible projection.
    pub hide: bool,
    /// Whether the entry holds more than one element.
    pub multiple: bool,
    /// Display title; `None` until resolved.
    pub title: Option<String>,
    #[serde(skip)]
    current: bool,
    #[serde(skip)]
    unresolved: bool,
}

impl StackEntry {
    fn current(ids: &SelectionIds) -> Self {
        Self {
            vertex_ids: ids.vertex_ids.clone(),
            edge_ids: ids.edge_ids.clone(),
            hide: true,
            multiple: ids.len() > 1,
            title: None,
            current: true,
            unresolved: false,
        }
    }

    /// The ids of this entry.
    pub fn ids(&self) -> SelectionIds {
        SelectionIds {
            vertex_ids: self.vertex_ids.clone(),
            edge_ids: self.edge_ids.clone(),
        }
    }

    /// Id-set equality with a selection.
    pub fn matches(&self, ids: &SelectionIds) -> bool {
        self.ids().same_elements(ids)
    }

    fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty() && self.edge_ids.is_empty()
    }

    fn sync_hide(&mut self) {
        self.hide = self.current || self.unresolved;
    }
}

/// Bounded, deduplicated selection history.
#[derive(Debug, Clone, Default)]
pub struct SelectionStack {
    entries: Vec<StackEntry>,
    max_visible: usize,
}

impl SelectionStack {
    /// Create a stack exposing at most `max_visible` entries.
    pub fn new(max_visible: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_visible,
        }
    }

    /// All entries, oldest first, hidden ones included.
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a new current selection.
    ///
    /// Returns `false` when the selection is empty and nothing was recorded.
    pub fn append(&mut self, ids: &SelectionIds) -> bool {
        if ids.is_empty() {
            return false;
        }

        self.entries.retain(|entry| !entry.matches(ids));
        self.release_current();
        self.entries.push(StackEntry::current(ids));

        // Current entry plus the visible history.
        let limit = self.max_visible + 1;
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
        true
    }

    /// Mark the current entry as history, e.g. after the selection was cleared.
    pub fn release_current(&mut self) {
        for entry in &mut self.entries {
            entry.current = false;
            entry.sync_hide();
        }
    }

    /// Strip deleted ids from every entry, prune entries left empty and merge
    /// entries that became identical, keeping the newest.
    ///
    /// Returns whether anything changed.
    pub fn remove_ids(&mut self, vertex_ids: &[VertexId], edge_ids: &[EdgeId]) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            let before = entry.vertex_ids.len() + entry.edge_ids.len();
            entry.vertex_ids.retain(|id| !vertex_ids.contains(id));
            entry.edge_ids.retain(|id| !edge_ids.contains(id));
            let after = entry.vertex_ids.len() + entry.edge_ids.len();
            if after != before {
                changed = true;
                entry.multiple = after > 1;
                entry.title = None;
            }
        }
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is_empty());

        let mut kept: Vec<StackEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..).rev() {
            let ids = entry.ids();
            if kept.iter().any(|newer| newer.matches(&ids)) {
                continue;
            }
            kept.push(entry);
        }
        kept.reverse();
        self.entries = kept;

        changed || self.entries.len() != before
    }

    /// Edge ids whose resolution is needed to title the entries.
    pub fn title_edge_ids(&self) -> Vec<EdgeId> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| entry.vertex_ids.is_empty() && entry.edge_ids.len() == 1)
            .map(|entry| entry.edge_ids[0].clone())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// Vertex ids whose resolution is needed to title the entries, including
    /// the endpoints of single-edge entries.
    pub fn title_vertex_ids(&self, edges: &HashMap<EdgeId, Edge>) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for entry in &self.entries {
            match (entry.vertex_ids.len(), entry.edge_ids.len()) {
                (1, 0) => ids.push(entry.vertex_ids[0].clone()),
                (0, 1) => {
                    if let Some(edge) = edges.get(&entry.edge_ids[0]) {
                        ids.push(edge.out_vertex_id.clone());
                        ids.push(edge.in_vertex_id.clone());
                    }
                }
                _ => {}
            }
        }
        ids.retain(|id| seen.insert(id.clone()));
        ids
    }

    /// Recompute titles from resolved elements. Entries that cannot be titled
    /// are hidden, not removed.
    pub fn apply_titles(
        &mut self,
        vertices: &HashMap<VertexId, Vertex>,
        edges: &HashMap<EdgeId, Edge>,
        truncate: usize,
    ) {
        for entry in &mut self.entries {
            match entry_title(entry, vertices, edges, truncate) {
                Some(title) => {
                    entry.title = Some(title);
                    entry.unresolved = false;
                }
                None => entry.unresolved = true,
            }
            entry.sync_hide();
        }
    }

    /// Visible entries, newest first, capped at `max`.
    pub fn visible(&self, max: usize) -> Vec<StackEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| !entry.hide)
            .take(max)
            .cloned()
            .collect()
    }
}

fn entry_title(
    entry: &StackEntry,
    vertices: &HashMap<VertexId, Vertex>,
    edges: &HashMap<EdgeId, Edge>,
    truncate: usize,
) -> Option<String> {
    match (entry.vertex_ids.len(), entry.edge_ids.len()) {
        (1, 0) => vertices
            .get(&entry.vertex_ids[0])
            .map(|vertex| vertex.title.clone()),
        (0, 1) => {
            let edge = edges.get(&entry.edge_ids[0])?;
            let source = vertices.get(&edge.out_vertex_id)?;
            let target = vertices.get(&edge.in_vertex_id)?;
            Some(format!(
                "{} → {}",
                truncate_title(&source.title, truncate),
                truncate_title(&target.title, truncate)
            ))
        }
        (count, 0) => Some(format!("{} entities", count)),
        (0, count) => Some(format!("{} relationships", count)),
        (v, e) => Some(format!("{} items", v + e)),
    }
}
