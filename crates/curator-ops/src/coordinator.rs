//! SelectionCoordinator - the single owner of "what is selected".
//!
//! Interactive requests are dispatched to the selection store; the store's
//! observer feeds them back with `dispatch = false`, at which point the
//! coordinator resolves ids, deduplicates against the previous selection,
//! records history and broadcasts the result. Every state change happens
//! while holding one async lock, so operations are applied strictly one
//! after another and readers never observe a half-applied selection.

use std::collections::HashMap;
use std::sync::Arc;

use curator_core::{Edge, EdgeId, SelectionIds, Vertex, VertexId};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::OpsResult;
use crate::events::{Event, EventBus, Notification};
use crate::facade::DataRequest;
use crate::selection::{SelectOptions, SelectedObjects, SelectionPayload, SelectionRequest};
use crate::stack::{SelectionStack, StackEntry};
use crate::store::SelectionStore;

/// Collaborators injected into the coordinator.
#[derive(Clone)]
pub struct CoordinatorContext {
    /// Resolves ids into elements.
    pub data: Arc<dyn DataRequest>,
    /// Receives interactive selection requests.
    pub store: Arc<dyn SelectionStore>,
    /// Outbound notifications.
    pub bus: EventBus,
    /// Effective configuration.
    pub config: Config,
}

impl CoordinatorContext {
    /// Create a context with a fresh event bus and default configuration.
    pub fn new(data: Arc<dyn DataRequest>, store: Arc<dyn SelectionStore>) -> Self {
        Self {
            data,
            store,
            bus: EventBus::new(),
            config: Config::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Default)]
struct SelectionState {
    selected: SelectedObjects,
    previous: SelectionIds,
    stack: SelectionStack,
    focused: SelectionIds,
    workspace_id: Option<String>,
}

/// Coordinates selection changes, deletions and selection history.
pub struct SelectionCoordinator {
    data: Arc<dyn DataRequest>,
    store: Arc<dyn SelectionStore>,
    bus: EventBus,
    config: Config,
    state: Mutex<SelectionState>,
}

impl SelectionCoordinator {
    /// Create a coordinator from its context.
    pub fn new(context: CoordinatorContext) -> Self {
        let state = SelectionState {
            stack: SelectionStack::new(context.config.history_stack_max),
            ..Default::default()
        };
        Self {
            data: context.data,
            store: context.store,
            bus: context.bus,
            config: context.config,
            state: Mutex::new(state),
        }
    }

    /// Create a coordinator after overlaying server configuration properties.
    pub async fn connect(mut context: CoordinatorContext) -> OpsResult<Self> {
        let properties = context.data.config_properties().await?;
        context.config.apply_server_properties(&properties);
        debug!(
            history_stack_max = context.config.history_stack_max,
            "Selection coordinator configured"
        );
        Ok(Self::new(context))
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The notification bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.bus.subscribe()
    }

    /// Drain a [`crate::ChannelStore`] receiver, applying each dispatched
    /// selection.
    pub fn spawn_store_observer(
        self: &Arc<Self>,
        mut receiver: mpsc::UnboundedReceiver<SelectionPayload>,
    ) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(payload) = receiver.recv().await {
                if let Err(err) = coordinator.select_objects(payload.into()).await {
                    error!(error = %err, "Failed to apply dispatched selection");
                }
            }
            debug!("Selection store observer stopped");
        })
    }

    // =========================================================================
    // Event Dispatch
    // =========================================================================

    /// Handle one inbound event.
    pub async fn handle(&self, event: Event) -> OpsResult<()> {
        match event {
            Event::SelectObjects(request) => self.select_objects(request).await,
            Event::VerticesDeleted { vertex_ids } => self.vertices_deleted(&vertex_ids).await,
            Event::EdgesDeleted { edge_ids } => self.edges_deleted(&edge_ids).await,
            Event::SwitchWorkspace { workspace_id } => self.switch_workspace(workspace_id).await,
            Event::SearchTitle { vertex_id } => self.search_title(vertex_id).await,
            Event::SearchRelated { vertex_ids } => self.search_related(vertex_ids).await,
            Event::AddRelatedItems { vertex_id } => self.add_related_items(vertex_id).await,
            Event::DeleteSelected => self.delete_selected().await,
            Event::FocusElements(ids) => self.focus_elements(ids).await,
            Event::DefocusElements => self.defocus_elements().await,
        }
    }

    // =========================================================================
    // Public Read Surface
    // =========================================================================

    /// The current selection, once any in-flight change has completed.
    pub async fn selected_objects(&self) -> SelectedObjects {
        self.state.lock().await.selected.clone()
    }

    /// Visible history entries, newest first.
    pub async fn selected_objects_stack(&self) -> Vec<StackEntry> {
        self.state
            .lock()
            .await
            .stack
            .visible(self.config.history_stack_max)
    }

    /// The active workspace, if one was switched to.
    pub async fn workspace_id(&self) -> Option<String> {
        self.state.lock().await.workspace_id.clone()
    }

    /// Currently focused elements.
    pub async fn focused(&self) -> SelectionIds {
        self.state.lock().await.focused.clone()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Change the selection.
    ///
    /// With `dispatch` set the request is only forwarded to the store.
    /// Otherwise it is resolved and applied; a request that resolves to
    /// nothing, or to the same elements as the current selection, emits
    /// `ObjectsSelectedAborted` instead.
    pub async fn select_objects(&self, request: SelectionRequest) -> OpsResult<()> {
        if request.dispatch {
            debug!(
                vertices = request.ids.vertex_ids.len(),
                edges = request.ids.edge_ids.len(),
                "Dispatching selection to store"
            );
            self.store.dispatch(request.payload());
            return Ok(());
        }

        let mut state = self.state.lock().await;
        let requested = request.ids;

        let (vertices, edges) = tokio::try_join!(
            self.fetch_vertices(&requested.vertex_ids),
            self.fetch_edges(&requested.edge_ids)
        )?;

        if !requested.is_empty() && vertices.is_empty() && edges.is_empty() {
            debug!(requested = requested.len(), "Selection resolved to nothing");
            self.bus.emit(Notification::ObjectsSelectedAborted);
            return Ok(());
        }

        let selected = SelectedObjects::new(vertices, edges);
        let ids = selected.ids();
        if ids.same_elements(&state.previous) {
            debug!("Selection unchanged");
            self.bus.emit(Notification::ObjectsSelectedAborted);
            return Ok(());
        }

        if ids.is_empty() {
            state.stack.release_current();
        } else {
            state.stack.append(&ids);
        }
        state.previous = ids;
        state.selected = selected.clone();

        info!(
            vertices = selected.vertex_ids.len(),
            edges = selected.edge_ids.len(),
            "Objects selected"
        );
        self.bus.emit(Notification::ObjectsSelected {
            vertices: selected.vertices,
            edges: selected.edges,
            options: request.options,
        });
        self.update_clipboard(&state);

        self.refresh_stack_titles(&mut state).await
    }

    // =========================================================================
    // Deletions and Workspace Changes
    // =========================================================================

    /// React to vertices deleted elsewhere.
    pub async fn vertices_deleted(&self, vertex_ids: &[VertexId]) -> OpsResult<()> {
        self.elements_deleted(vertex_ids, &[]).await
    }

    /// React to edges deleted elsewhere.
    pub async fn edges_deleted(&self, edge_ids: &[EdgeId]) -> OpsResult<()> {
        self.elements_deleted(&[], edge_ids).await
    }

    async fn elements_deleted(&self, vertex_ids: &[VertexId], edge_ids: &[EdgeId]) -> OpsResult<()> {
        let mut state = self.state.lock().await;

        let current = state.selected.ids();
        let affected = vertex_ids.iter().any(|id| current.contains_vertex(id))
            || edge_ids.iter().any(|id| current.contains_edge(id));
        if affected {
            let remaining = current.without(vertex_ids, edge_ids);
            info!(
                deleted_vertices = vertex_ids.len(),
                deleted_edges = edge_ids.len(),
                remaining = remaining.len(),
                "Selected elements deleted"
            );
            self.store.dispatch(SelectionPayload {
                ids: remaining,
                options: SelectOptions::default(),
            });
        }

        if state.stack.remove_ids(vertex_ids, edge_ids) {
            self.refresh_stack_titles(&mut state).await?;
        }
        Ok(())
    }

    /// Switch to another workspace; history and focus are workspace-scoped.
    pub async fn switch_workspace(&self, workspace_id: String) -> OpsResult<()> {
        let mut state = self.state.lock().await;
        if state.workspace_id.as_deref() == Some(workspace_id.as_str()) {
            return Ok(());
        }

        info!(workspace = %workspace_id, "Switching workspace");
        state.workspace_id = Some(workspace_id);
        state.stack.clear();
        if !state.focused.is_empty() {
            state.focused = SelectionIds::empty();
            self.bus.emit(Notification::FocusChanged(SelectionIds::empty()));
        }
        if !state.selected.is_empty() {
            self.store.dispatch(SelectionPayload::default());
        }
        Ok(())
    }

    // =========================================================================
    // Selection-driven Actions
    // =========================================================================

    /// Search for the title of a vertex, or of the single selected vertex.
    pub async fn search_title(&self, vertex_id: Option<VertexId>) -> OpsResult<()> {
        let Some(vertex_id) = self.target_vertex(vertex_id).await else {
            self.inform("Select a single entity to search for its title");
            return Ok(());
        };

        let vertices = self.data.vertex_store(std::slice::from_ref(&vertex_id)).await?;
        match vertices.into_iter().next() {
            Some(vertex) if !vertex.title.trim().is_empty() => {
                self.bus.emit(Notification::SearchForPhrase {
                    query: vertex.title,
                });
            }
            Some(_) => self.inform("Entity has no title to search for"),
            None => self.inform("Entity is no longer available"),
        }
        Ok(())
    }

    /// Search for entities related to the given vertices, or the selected ones.
    pub async fn search_related(&self, vertex_ids: Vec<VertexId>) -> OpsResult<()> {
        let vertex_ids = if vertex_ids.is_empty() {
            self.state.lock().await.selected.vertex_ids.clone()
        } else {
            vertex_ids
        };

        if vertex_ids.is_empty() {
            self.inform("Select one or more entities to search for related items");
        } else {
            self.bus
                .emit(Notification::SearchByRelatedEntity { vertex_ids });
        }
        Ok(())
    }

    /// Open the "add related" flow for a vertex, or the single selected vertex.
    pub async fn add_related_items(&self, vertex_id: Option<VertexId>) -> OpsResult<()> {
        match self.target_vertex(vertex_id).await {
            Some(vertex_id) => self.bus.emit(Notification::AddRelatedRequested { vertex_id }),
            None => self.inform("Select a single entity to add related items"),
        }
        Ok(())
    }

    /// Ask the host to delete the current selection.
    pub async fn delete_selected(&self) -> OpsResult<()> {
        let state = self.state.lock().await;
        if state.selected.is_empty() {
            self.inform("Nothing is selected");
        } else {
            self.bus.emit(Notification::DeleteElements {
                vertex_ids: state.selected.vertex_ids.clone(),
                edge_ids: state.selected.edge_ids.clone(),
            });
        }
        Ok(())
    }

    /// Highlight elements.
    pub async fn focus_elements(&self, ids: SelectionIds) -> OpsResult<()> {
        let mut state = self.state.lock().await;
        if state.focused.same_elements(&ids) {
            return Ok(());
        }
        state.focused = ids.clone();
        self.bus.emit(Notification::FocusChanged(ids));
        Ok(())
    }

    /// Remove any highlight.
    pub async fn defocus_elements(&self) -> OpsResult<()> {
        self.focus_elements(SelectionIds::empty()).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_vertices(&self, ids: &[VertexId]) -> OpsResult<Vec<Vertex>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.data.vertex_store(ids).await
    }

    async fn fetch_edges(&self, ids: &[EdgeId]) -> OpsResult<Vec<Edge>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.data.edge_store(ids).await
    }

    /// The explicit vertex, or the selected vertex when exactly one vertex
    /// and nothing else is selected.
    async fn target_vertex(&self, vertex_id: Option<VertexId>) -> Option<VertexId> {
        if vertex_id.is_some() {
            return vertex_id;
        }
        let state = self.state.lock().await;
        match (state.selected.vertex_ids.as_slice(), state.selected.edge_ids.len()) {
            ([only], 0) => Some(only.clone()),
            _ => None,
        }
    }

    fn inform(&self, message: &str) {
        self.bus.emit(Notification::DisplayInformation {
            message: message.to_string(),
        });
    }

    fn update_clipboard(&self, state: &SelectionState) {
        match share_text(&state.selected, state.workspace_id.as_deref()) {
            Some(text) => self.bus.emit(Notification::ClipboardSet { text }),
            None => self.bus.emit(Notification::ClipboardClear),
        }
    }

    /// Re-resolve the elements the history titles depend on: one edge
    /// request, then one vertex request covering edge endpoints too.
    async fn refresh_stack_titles(&self, state: &mut SelectionState) -> OpsResult<()> {
        if state.stack.is_empty() {
            return Ok(());
        }

        let edges: HashMap<EdgeId, Edge> = self
            .fetch_edges(&state.stack.title_edge_ids())
            .await?
            .into_iter()
            .map(|edge| (edge.id.clone(), edge))
            .collect();
        let vertices: HashMap<VertexId, Vertex> = self
            .fetch_vertices(&state.stack.title_vertex_ids(&edges))
            .await?
            .into_iter()
            .map(|vertex| (vertex.id.clone(), vertex))
            .collect();

        state
            .stack
            .apply_titles(&vertices, &edges, self.config.title_truncate);
        debug!(entries = state.stack.len(), "Refreshed selection history titles");
        Ok(())
    }
}

/// Shareable fragment for a selection, e.g. `#v=a,b&e=c&w=ws1`.
fn share_text(selected: &SelectedObjects, workspace_id: Option<&str>) -> Option<String> {
    if selected.is_empty() {
        return None;
    }

    let join = |ids: Vec<&str>| ids.join(",");
    let mut parts = Vec::new();
    if !selected.vertex_ids.is_empty() {
        parts.push(format!(
            "v={}",
            join(selected.vertex_ids.iter().map(VertexId::as_str).collect())
        ));
    }
    if !selected.edge_ids.is_empty() {
        parts.push(format!(
            "e={}",
            join(selected.edge_ids.iter().map(EdgeId::as_str).collect())
        ));
    }
    if let Some(workspace_id) = workspace_id {
        parts.push(format!("w={}", workspace_id));
    }
    Some(format!("#{}", parts.join("&")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::InMemoryDataRequest;
    use crate::store::RecordingStore;
    use crate::OpsError;

    struct Harness {
        coordinator: SelectionCoordinator,
        data: Arc<InMemoryDataRequest>,
        store: Arc<RecordingStore>,
        events: broadcast::Receiver<Notification>,
    }

    impl Harness {
        fn new(config: Config) -> Self {
            let data = Arc::new(InMemoryDataRequest::with_elements(
                vec![
                    Vertex::new("v1", "Alice"),
                    Vertex::new("v2", "Bob"),
                    Vertex::new("v3", "Carol"),
                ],
                vec![Edge::new("e1", "knows", "v1", "v2")],
            ));
            let store = Arc::new(RecordingStore::new());
            let context =
                CoordinatorContext::new(data.clone(), store.clone()).with_config(config);
            let coordinator = SelectionCoordinator::new(context);
            let events = coordinator.subscribe();
            Self {
                coordinator,
                data,
                store,
                events,
            }
        }

        async fn select(&self, ids: &[&str]) {
            self.coordinator
                .select_objects(SelectionRequest::vertices(ids.iter().copied()).without_dispatch())
                .await
                .unwrap();
        }

        /// Feed everything the store received back into the coordinator.
        async fn pump_store(&self) {
            for payload in self.store.drain() {
                self.coordinator.select_objects(payload.into()).await.unwrap();
            }
        }

        fn drain(&mut self) -> Vec<Notification> {
            let mut out = Vec::new();
            while let Ok(notification) = self.events.try_recv() {
                out.push(notification);
            }
            out
        }

        fn drain_names(&mut self) -> Vec<&'static str> {
            self.drain().iter().map(Notification::name).collect()
        }
    }

    fn selected_vertex_ids(notifications: &[Notification]) -> Vec<Vec<String>> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::ObjectsSelected { vertices, .. } => {
                    Some(vertices.iter().map(|v| v.id.0.clone()).collect())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_dispatch_only_forwards_to_store() {
        let mut h = Harness::new(Config::default());
        h.coordinator
            .select_objects(SelectionRequest::vertices(["v1"]))
            .await
            .unwrap();

        assert!(h.drain().is_empty());
        assert!(h.coordinator.selected_objects().await.is_empty());
        let dispatched = h.store.drain();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].ids.vertex_ids, vec![VertexId::new("v1")]);
    }

    #[tokio::test]
    async fn test_reselecting_same_set_is_aborted() {
        let mut h = Harness::new(Config::default());
        h.select(&["v1", "v2"]).await;
        h.select(&["v2", "v1"]).await;

        let names = h.drain_names();
        assert_eq!(
            names.iter().filter(|n| **n == "objectsSelected").count(),
            1
        );
        assert_eq!(names.last(), Some(&"objectsSelectedAborted"));
    }

    #[tokio::test]
    async fn test_stale_ids_are_aborted() {
        let mut h = Harness::new(Config::default());
        h.select(&["deleted"]).await;
        assert_eq!(h.drain_names(), vec!["objectsSelectedAborted"]);
        assert!(h.coordinator.selected_objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_options_pass_through() {
        let mut h = Harness::new(Config::default());
        h.coordinator
            .select_objects(
                SelectionRequest::vertices(["v1"])
                    .with_options(SelectOptions::from_source("search"))
                    .without_dispatch(),
            )
            .await
            .unwrap();

        match h.drain().first() {
            Some(Notification::ObjectsSelected { options, .. }) => {
                assert_eq!(options.source.as_deref(), Some("search"));
            }
            other => panic!("Expected ObjectsSelected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stack_dedups_and_moves_to_top() {
        let h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.select(&["v2"]).await;
        h.select(&["v1"]).await;

        let state = h.coordinator.state.lock().await;
        let order: Vec<SelectionIds> = state.stack.entries().iter().map(StackEntry::ids).collect();
        assert_eq!(
            order,
            vec![
                SelectionIds::new(vec![VertexId::new("v2")], vec![]),
                SelectionIds::new(vec![VertexId::new("v1")], vec![]),
            ]
        );
        drop(state);

        let visible = h.coordinator.selected_objects_stack().await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn test_stack_is_capped() {
        let mut config = Config::default();
        config.history_stack_max = 2;
        let h = Harness::new(config);
        h.select(&["v1"]).await;
        h.select(&["v2"]).await;
        h.select(&["v3"]).await;
        h.coordinator.select_objects(SelectionRequest::clear().without_dispatch()).await.unwrap();

        let visible = h.coordinator.selected_objects_stack().await;
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].title.as_deref(), Some("Carol"));
        assert_eq!(visible[1].title.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn test_edge_entry_title_uses_endpoints() {
        let h = Harness::new(Config::default());
        h.coordinator
            .select_objects(SelectionRequest::edges(["e1"]).without_dispatch())
            .await
            .unwrap();
        h.select(&["v3"]).await;

        let visible = h.coordinator.selected_objects_stack().await;
        assert_eq!(visible[0].title.as_deref(), Some("Alice → Bob"));
        assert!(!visible[0].multiple);
    }

    #[tokio::test]
    async fn test_title_refresh_batches_one_request_per_kind() {
        let h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.coordinator
            .select_objects(SelectionRequest::edges(["e1"]).without_dispatch())
            .await
            .unwrap();
        h.select(&["v2", "v3"]).await;

        let before = h.data.stats();
        h.select(&["v3"]).await;
        let after = h.data.stats();
        // One vertex request resolves the selection itself; the refresh adds
        // exactly one edge and one vertex request for all four entries.
        assert_eq!(after.vertex_requests - before.vertex_requests, 2);
        assert_eq!(after.edge_requests - before.edge_requests, 1);

        let before = h.data.stats();
        h.coordinator
            .vertices_deleted(&[VertexId::new("v2")])
            .await
            .unwrap();
        let after = h.data.stats();
        assert_eq!(after.vertex_requests - before.vertex_requests, 1);
        assert_eq!(after.edge_requests - before.edge_requests, 1);

        let titles: Vec<_> = h
            .coordinator
            .selected_objects_stack()
            .await
            .into_iter()
            .filter_map(|entry| entry.title)
            .collect();
        assert_eq!(titles, vec!["Alice → Bob", "Alice"]);
    }

    #[tokio::test]
    async fn test_deleting_one_of_two_selected_rebroadcasts_remainder() {
        let mut h = Harness::new(Config::default());
        h.select(&["v1", "v2"]).await;
        h.drain();

        h.coordinator
            .handle(Event::VerticesDeleted {
                vertex_ids: vec![VertexId::new("v1")],
            })
            .await
            .unwrap();
        h.data.remove_vertices(&[VertexId::new("v1")]).await;
        h.pump_store().await;

        assert_eq!(selected_vertex_ids(&h.drain()), vec![vec!["v2".to_string()]]);
        assert_eq!(
            h.coordinator.selected_objects().await.vertex_ids,
            vec![VertexId::new("v2")]
        );
    }

    #[tokio::test]
    async fn test_deleting_only_selected_clears_selection() {
        let mut h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.drain();

        h.coordinator
            .vertices_deleted(&[VertexId::new("v1")])
            .await
            .unwrap();
        h.pump_store().await;

        let notifications = h.drain();
        assert_eq!(selected_vertex_ids(&notifications), vec![Vec::<String>::new()]);
        assert!(notifications.contains(&Notification::ClipboardClear));
        assert!(h.coordinator.selected_objects_stack().await.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_unselected_element_only_purges_history() {
        let mut h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.select(&["v2"]).await;
        h.drain();

        h.coordinator
            .vertices_deleted(&[VertexId::new("v1")])
            .await
            .unwrap();

        assert!(h.store.drain().is_empty());
        assert!(h.drain().is_empty());
        assert!(h.coordinator.selected_objects_stack().await.is_empty());
    }

    #[tokio::test]
    async fn test_clipboard_includes_workspace() {
        let mut h = Harness::new(Config::default());
        h.coordinator.switch_workspace("ws1".to_string()).await.unwrap();
        h.coordinator
            .select_objects(
                SelectionRequest::ids(vec![VertexId::new("v1")], vec![EdgeId::new("e1")])
                    .without_dispatch(),
            )
            .await
            .unwrap();

        assert!(h.drain().contains(&Notification::ClipboardSet {
            text: "#v=v1&e=e1&w=ws1".to_string()
        }));
    }

    #[tokio::test]
    async fn test_switch_workspace_clears_history_and_selection() {
        let h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.select(&["v2"]).await;

        h.coordinator.switch_workspace("ws2".to_string()).await.unwrap();
        h.pump_store().await;

        assert!(h.coordinator.selected_objects().await.is_empty());
        assert!(h.coordinator.selected_objects_stack().await.is_empty());
        assert_eq!(h.coordinator.workspace_id().await.as_deref(), Some("ws2"));
    }

    #[tokio::test]
    async fn test_resolution_failure_propagates() {
        let mut h = Harness::new(Config::default());
        h.data.fail_resolution(true).await;

        let result = h
            .coordinator
            .select_objects(SelectionRequest::vertices(["v1"]).without_dispatch())
            .await;
        assert!(matches!(result, Err(OpsError::DataRequest { .. })));
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn test_actions_use_single_selected_vertex() {
        let mut h = Harness::new(Config::default());
        h.select(&["v1"]).await;
        h.drain();

        h.coordinator.handle(Event::SearchTitle { vertex_id: None }).await.unwrap();
        h.coordinator.handle(Event::AddRelatedItems { vertex_id: None }).await.unwrap();
        h.coordinator.handle(Event::SearchRelated { vertex_ids: vec![] }).await.unwrap();
        h.coordinator.handle(Event::DeleteSelected).await.unwrap();

        assert_eq!(
            h.drain(),
            vec![
                Notification::SearchForPhrase {
                    query: "Alice".to_string()
                },
                Notification::AddRelatedRequested {
                    vertex_id: VertexId::new("v1")
                },
                Notification::SearchByRelatedEntity {
                    vertex_ids: vec![VertexId::new("v1")]
                },
                Notification::DeleteElements {
                    vertex_ids: vec![VertexId::new("v1")],
                    edge_ids: vec![],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_actions_without_selection_inform_user() {
        let mut h = Harness::new(Config::default());
        h.coordinator.handle(Event::DeleteSelected).await.unwrap();
        h.coordinator.handle(Event::SearchTitle { vertex_id: None }).await.unwrap();
        assert_eq!(h.drain_names(), vec!["displayInformation", "displayInformation"]);
    }

    #[tokio::test]
    async fn test_focus_and_defocus() {
        let mut h = Harness::new(Config::default());
        let ids = SelectionIds::new(vec![VertexId::new("v1")], vec![]);
        h.coordinator.handle(Event::FocusElements(ids.clone())).await.unwrap();
        h.coordinator.handle(Event::FocusElements(ids.clone())).await.unwrap();
        h.coordinator.handle(Event::DefocusElements).await.unwrap();

        assert_eq!(
            h.drain(),
            vec![
                Notification::FocusChanged(ids),
                Notification::FocusChanged(SelectionIds::empty()),
            ]
        );
        assert!(h.coordinator.focused().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_applies_server_stack_max() {
        let data = Arc::new(InMemoryDataRequest::new());
        data.set_property("detail.history.stack.max", "2").await;
        let context = CoordinatorContext::new(data, Arc::new(RecordingStore::new()));

        let coordinator = SelectionCoordinator::connect(context).await.unwrap();
        assert_eq!(coordinator.config().history_stack_max, 2);
    }

    #[test]
    fn test_share_text_without_workspace() {
        let selected = SelectedObjects::new(
            vec![Vertex::new("a", "A"), Vertex::new("b", "B")],
            vec![],
        );
        assert_eq!(share_text(&selected, None).as_deref(), Some("#v=a,b"));
        assert_eq!(share_text(&SelectedObjects::default(), Some("ws")), None);
    }
}
