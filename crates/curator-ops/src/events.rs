//! Typed event bus.
//!
//! Inbound [`Event`]s are handled by the selection coordinator; outbound
//! [`Notification`]s are broadcast to every subscriber.

use curator_core::{Edge, EdgeId, SelectionIds, Vertex, VertexId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::selection::{SelectOptions, SelectionRequest};

/// Default capacity of the notification channel.
const BUS_CAPACITY: usize = 256;

/// Events consumed by the selection coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    /// Change the selection.
    SelectObjects(SelectionRequest),
    /// Vertices were deleted elsewhere.
    VerticesDeleted { vertex_ids: Vec<VertexId> },
    /// Edges were deleted elsewhere.
    EdgesDeleted { edge_ids: Vec<EdgeId> },
    /// The active workspace changed.
    SwitchWorkspace { workspace_id: String },
    /// Search for the title of a vertex (or the selected vertex).
    SearchTitle { vertex_id: Option<VertexId> },
    /// Search for entities related to the given (or selected) vertices.
    SearchRelated { vertex_ids: Vec<VertexId> },
    /// Open the "add related" flow for a vertex (or the selected vertex).
    AddRelatedItems { vertex_id: Option<VertexId> },
    /// Delete whatever is currently selected.
    DeleteSelected,
    /// Highlight elements.
    FocusElements(SelectionIds),
    /// Remove any highlight.
    DefocusElements,
}

/// Notifications emitted by the selection coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notification {
    /// The selection changed.
    ObjectsSelected {
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        options: SelectOptions,
    },
    /// A selection request was a no-op.
    ObjectsSelectedAborted,
    /// Share text for the selection.
    ClipboardSet { text: String },
    /// Nothing to share.
    ClipboardClear,
    /// Informational message for the user.
    DisplayInformation { message: String },
    /// Run a phrase search.
    SearchForPhrase { query: String },
    /// Run a related-entity search.
    SearchByRelatedEntity { vertex_ids: Vec<VertexId> },
    /// Ask the host to delete elements.
    DeleteElements {
        vertex_ids: Vec<VertexId>,
        edge_ids: Vec<EdgeId>,
    },
    /// Ask the host to open the "add related" flow.
    AddRelatedRequested { vertex_id: VertexId },
    /// The highlighted elements changed.
    FocusChanged(SelectionIds),
}

impl Notification {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::ObjectsSelected { .. } => "objectsSelected",
            Notification::ObjectsSelectedAborted => "objectsSelectedAborted",
            Notification::ClipboardSet { .. } => "clipboardSet",
            Notification::ClipboardClear => "clipboardClear",
            Notification::DisplayInformation { .. } => "displayInformation",
            Notification::SearchForPhrase { .. } => "searchForPhrase",
            Notification::SearchByRelatedEntity { .. } => "searchByRelatedEntity",
            Notification::DeleteElements { .. } => "deleteElements",
            Notification::AddRelatedRequested { .. } => "addRelatedRequested",
            Notification::FocusChanged(_) => "focusChanged",
        }
    }
}

/// Broadcast channel for notifications.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(BUS_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` notifications per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every notification emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Broadcast a notification. Having no subscribers is fine.
    pub fn emit(&self, notification: Notification) {
        trace!(event = notification.name(), "emit");
        let _ = self.sender.send(notification);
    }
}
