//! Data-request facade.
//!
//! The coordinator and ontology projection never talk to the server
//! directly; they go through [`DataRequest`], which a host application backs
//! with its transport of choice. [`InMemoryDataRequest`] serves fixtures and
//! tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use curator_core::{Edge, EdgeId, Ontology, Vertex, VertexId};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{OpsError, OpsResult};

/// Opaque RPC surface used to resolve ids into elements.
///
/// Store lookups return only the elements that still exist; missing ids are
/// silently dropped rather than reported as errors.
#[async_trait]
pub trait DataRequest: Send + Sync {
    /// Resolve vertices by id (`vertex.store`).
    async fn vertex_store(&self, vertex_ids: &[VertexId]) -> OpsResult<Vec<Vertex>>;

    /// Resolve edges by id (`edge.store`).
    async fn edge_store(&self, edge_ids: &[EdgeId]) -> OpsResult<Vec<Edge>>;

    /// Fetch the current ontology snapshot (`ontology.relationships` and friends).
    async fn ontology(&self) -> OpsResult<Ontology>;

    /// Fetch server-side configuration properties (`config.properties`).
    async fn config_properties(&self) -> OpsResult<HashMap<String, String>>;
}

/// Counters describing how many requests of each kind were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// Number of `vertex_store` calls.
    pub vertex_requests: usize,
    /// Number of `edge_store` calls.
    pub edge_requests: usize,
}

/// In-memory implementation of [`DataRequest`].
#[derive(Debug, Default)]
pub struct InMemoryDataRequest {
    vertices: RwLock<HashMap<VertexId, Vertex>>,
    edges: RwLock<HashMap<EdgeId, Edge>>,
    ontology: RwLock<Ontology>,
    properties: RwLock<HashMap<String, String>>,
    fail_resolution: RwLock<bool>,
    vertex_requests: AtomicUsize,
    edge_requests: AtomicUsize,
}

impl InMemoryDataRequest {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with elements.
    pub fn with_elements(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Self {
        Self {
            vertices: RwLock::new(vertices.into_iter().map(|v| (v.id.clone(), v)).collect()),
            edges: RwLock::new(edges.into_iter().map(|e| (e.id.clone(), e)).collect()),
            ..Default::default()
        }
    }

    /// Insert or replace a vertex.
    pub async fn put_vertex(&self, vertex: Vertex) {
        self.vertices.write().await.insert(vertex.id.clone(), vertex);
    }

    /// Insert or replace an edge.
    pub async fn put_edge(&self, edge: Edge) {
        self.edges.write().await.insert(edge.id.clone(), edge);
    }

    /// Remove vertices, as a server-side delete would.
    pub async fn remove_vertices(&self, ids: &[VertexId]) {
        let mut vertices = self.vertices.write().await;
        for id in ids {
            vertices.remove(id);
        }
    }

    /// Remove edges, as a server-side delete would.
    pub async fn remove_edges(&self, ids: &[EdgeId]) {
        let mut edges = self.edges.write().await;
        for id in ids {
            edges.remove(id);
        }
    }

    /// Replace the served ontology.
    pub async fn set_ontology(&self, ontology: Ontology) {
        *self.ontology.write().await = ontology;
    }

    /// Set a server configuration property.
    pub async fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.write().await.insert(key.into(), value.into());
    }

    /// Make every subsequent store lookup fail.
    pub async fn fail_resolution(&self, fail: bool) {
        *self.fail_resolution.write().await = fail;
    }

    /// Snapshot of request counters.
    pub fn stats(&self) -> RequestStats {
        RequestStats {
            vertex_requests: self.vertex_requests.load(Ordering::SeqCst),
            edge_requests: self.edge_requests.load(Ordering::SeqCst),
        }
    }

    async fn check_failure(&self, resource: &str) -> OpsResult<()> {
        if *self.fail_resolution.read().await {
            return Err(OpsError::data_request(resource, "store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DataRequest for InMemoryDataRequest {
    async fn vertex_store(&self, vertex_ids: &[VertexId]) -> OpsResult<Vec<Vertex>> {
        self.vertex_requests.fetch_add(1, Ordering::SeqCst);
        self.check_failure("vertex.store").await?;
        let vertices = self.vertices.read().await;
        let found: Vec<Vertex> = vertex_ids
            .iter()
            .filter_map(|id| vertices.get(id).cloned())
            .collect();
        debug!(requested = vertex_ids.len(), found = found.len(), "vertex.store");
        Ok(found)
    }

    async fn edge_store(&self, edge_ids: &[EdgeId]) -> OpsResult<Vec<Edge>> {
        self.edge_requests.fetch_add(1, Ordering::SeqCst);
        self.check_failure("edge.store").await?;
        let edges = self.edges.read().await;
        let found: Vec<Edge> = edge_ids
            .iter()
            .filter_map(|id| edges.get(id).cloned())
            .collect();
        debug!(requested = edge_ids.len(), found = found.len(), "edge.store");
        Ok(found)
    }

    async fn ontology(&self) -> OpsResult<Ontology> {
        Ok(self.ontology.read().await.clone())
    }

    async fn config_properties(&self) -> OpsResult<HashMap<String, String>> {
        Ok(self.properties.read().await.clone())
    }
}
