//! Selection request and projection types.

use curator_core::{Edge, EdgeId, SelectionIds, Vertex, VertexId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options passed through untouched from the selecting party to listeners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptions {
    /// Pan/zoom the graph to the selection.
    #[serde(default)]
    pub focus: bool,
    /// Name of the component that made the selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Anything else the caller attached.
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl SelectOptions {
    /// Options tagged with the selecting component.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }
}

/// A request to change the selection.
///
/// Either ids or already-resolved elements can be supplied; both are
/// normalized to ids before anything else happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SelectionRequestWire")]
pub struct SelectionRequest {
    /// Requested element ids.
    pub ids: SelectionIds,
    /// Pass-through options.
    pub options: SelectOptions,
    /// Forward to the store (`true`) or apply directly (`false`).
    pub dispatch: bool,
}

fn default_dispatch() -> bool {
    true
}

/// Accepted JSON shapes: nested `ids`, flat `vertexIds`/`edgeIds`, or full
/// `vertices`/`edges`. All of them are merged into one id set.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequestWire {
    #[serde(default)]
    ids: SelectionIds,
    #[serde(default)]
    vertex_ids: Vec<VertexId>,
    #[serde(default)]
    edge_ids: Vec<EdgeId>,
    #[serde(default)]
    vertices: Vec<Vertex>,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default)]
    options: SelectOptions,
    #[serde(default = "default_dispatch")]
    dispatch: bool,
}

impl From<SelectionRequestWire> for SelectionRequest {
    fn from(wire: SelectionRequestWire) -> Self {
        let vertex_ids = wire
            .ids
            .vertex_ids
            .into_iter()
            .chain(wire.vertex_ids)
            .chain(wire.vertices.into_iter().map(|vertex| vertex.id))
            .collect();
        let edge_ids = wire
            .ids
            .edge_ids
            .into_iter()
            .chain(wire.edge_ids)
            .chain(wire.edges.into_iter().map(|edge| edge.id))
            .collect();
        Self {
            ids: SelectionIds::new(vertex_ids, edge_ids),
            options: wire.options,
            dispatch: wire.dispatch,
        }
    }
}

impl SelectionRequest {
    /// Select elements by id.
    pub fn ids(vertex_ids: Vec<VertexId>, edge_ids: Vec<EdgeId>) -> Self {
        Self {
            ids: SelectionIds::new(vertex_ids, edge_ids),
            options: SelectOptions::default(),
            dispatch: true,
        }
    }

    /// Select vertices by id.
    pub fn vertices<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ids(ids.into_iter().map(|id| VertexId(id.into())).collect(), Vec::new())
    }

    /// Select edges by id.
    pub fn edges<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ids(Vec::new(), ids.into_iter().map(|id| EdgeId(id.into())).collect())
    }

    /// Select already-resolved elements.
    pub fn elements(vertices: &[Vertex], edges: &[Edge]) -> Self {
        Self::ids(
            vertices.iter().map(|v| v.id.clone()).collect(),
            edges.iter().map(|e| e.id.clone()).collect(),
        )
    }

    /// Clear the selection.
    pub fn clear() -> Self {
        Self::ids(Vec::new(), Vec::new())
    }

    /// Attach pass-through options.
    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = options;
        self
    }

    /// Mark the request as coming from the store observer.
    pub fn without_dispatch(mut self) -> Self {
        self.dispatch = false;
        self
    }

    /// The normalized payload handed to the store.
    pub fn payload(&self) -> SelectionPayload {
        SelectionPayload {
            ids: self.ids.clone(),
            options: self.options.clone(),
        }
    }
}

/// Normalized selection forwarded to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    /// Requested element ids.
    pub ids: SelectionIds,
    /// Pass-through options.
    #[serde(default)]
    pub options: SelectOptions,
}

impl From<SelectionPayload> for SelectionRequest {
    fn from(payload: SelectionPayload) -> Self {
        Self {
            ids: payload.ids,
            options: payload.options,
            dispatch: false,
        }
    }
}

/// The externally visible current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedObjects {
    /// Resolved vertices.
    pub vertices: Vec<Vertex>,
    /// Resolved edges.
    pub edges: Vec<Edge>,
    /// Ids of `vertices`.
    pub vertex_ids: Vec<VertexId>,
    /// Ids of `edges`.
    pub edge_ids: Vec<EdgeId>,
}

impl SelectedObjects {
    /// Build the projection from resolved elements.
    pub fn new(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Self {
        let vertex_ids = vertices.iter().map(|v| v.id.clone()).collect();
        let edge_ids = edges.iter().map(|e| e.id.clone()).collect();
        Self {
            vertices,
            edges,
            vertex_ids,
            edge_ids,
        }
    }

    /// The ids of the selection.
    pub fn ids(&self) -> SelectionIds {
        SelectionIds {
            vertex_ids: self.vertex_ids.clone(),
            edge_ids: self.edge_ids.clone(),
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty() && self.edge_ids.is_empty()
    }
}
