//! End-to-end selection flows through the channel-backed store.

use std::sync::Arc;
use std::time::Duration;

use curator_core::{Edge, EdgeId, Vertex, VertexId};
use curator_ops::{
    ChannelStore, Config, CoordinatorContext, Event, InMemoryDataRequest, Notification,
    SelectionCoordinator, SelectionRequest,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct Session {
    coordinator: Arc<SelectionCoordinator>,
    data: Arc<InMemoryDataRequest>,
    events: broadcast::Receiver<Notification>,
    observer: JoinHandle<()>,
}

impl Session {
    async fn start(config: Config) -> Self {
        let data = Arc::new(InMemoryDataRequest::with_elements(
            (1..=8)
                .map(|n| Vertex::new(format!("v{}", n), format!("Vertex {}", n)))
                .collect(),
            vec![
                Edge::new("e1", "knows", "v1", "v2"),
                Edge::new("e2", "owns", "v2", "v3"),
            ],
        ));
        let (store, receiver) = ChannelStore::new();
        let context = CoordinatorContext::new(data.clone(), Arc::new(store)).with_config(config);
        let coordinator = Arc::new(SelectionCoordinator::connect(context).await.unwrap());
        let events = coordinator.subscribe();
        let observer = coordinator.spawn_store_observer(receiver);
        Self {
            coordinator,
            data,
            events,
            observer,
        }
    }

    /// Wait for the next selection outcome, skipping unrelated notifications.
    async fn next_outcome(&mut self) -> Notification {
        loop {
            let notification = timeout(Duration::from_secs(2), self.events.recv())
                .await
                .expect("timed out waiting for selection outcome")
                .expect("event bus closed");
            if matches!(
                notification,
                Notification::ObjectsSelected { .. } | Notification::ObjectsSelectedAborted
            ) {
                return notification;
            }
        }
    }

    async fn select(&mut self, ids: &[&str]) -> Notification {
        self.coordinator
            .select_objects(SelectionRequest::vertices(ids.iter().copied()))
            .await
            .unwrap();
        self.next_outcome().await
    }
}

fn vertex_ids(notification: &Notification) -> Vec<String> {
    match notification {
        Notification::ObjectsSelected { vertices, .. } => {
            vertices.iter().map(|v| v.id.0.clone()).collect()
        }
        other => panic!("Expected ObjectsSelected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_interactive_selection_round_trips_through_store() {
    let mut session = Session::start(Config::default()).await;

    let outcome = session.select(&["v1", "v2"]).await;
    assert_eq!(vertex_ids(&outcome), vec!["v1", "v2"]);

    let selected = session.coordinator.selected_objects().await;
    assert_eq!(selected.vertex_ids, vec![VertexId::new("v1"), VertexId::new("v2")]);

    session.observer.abort();
}

#[tokio::test]
async fn test_duplicate_selection_is_aborted() {
    let mut session = Session::start(Config::default()).await;
    session.select(&["v1"]).await;

    let outcome = session.select(&["v1"]).await;
    assert_eq!(outcome, Notification::ObjectsSelectedAborted);

    session.observer.abort();
}

#[tokio::test]
async fn test_history_is_capped_and_newest_first() {
    let mut config = Config::default();
    config.history_stack_max = 3;
    let mut session = Session::start(config).await;

    for id in ["v1", "v2", "v3", "v4", "v5", "v6"] {
        session.select(&[id]).await;
    }

    let titles: Vec<String> = session
        .coordinator
        .selected_objects_stack()
        .await
        .into_iter()
        .filter_map(|entry| entry.title)
        .collect();
    assert_eq!(titles, vec!["Vertex 5", "Vertex 4", "Vertex 3"]);

    session.observer.abort();
}

#[tokio::test]
async fn test_multi_element_entries_are_counted() {
    let mut session = Session::start(Config::default()).await;
    session.select(&["v1", "v2", "v3"]).await;
    session
        .coordinator
        .select_objects(SelectionRequest::edges(["e1", "e2"]))
        .await
        .unwrap();
    session.next_outcome().await;
    session.select(&["v4"]).await;

    let stack = session.coordinator.selected_objects_stack().await;
    let titles: Vec<_> = stack.iter().map(|e| e.title.clone().unwrap_or_default()).collect();
    assert_eq!(titles, vec!["2 relationships", "3 entities"]);
    assert!(stack.iter().all(|entry| entry.multiple));

    session.observer.abort();
}

#[tokio::test]
async fn test_deletion_reselects_remaining_elements() {
    let mut session = Session::start(Config::default()).await;
    session
        .coordinator
        .select_objects(SelectionRequest::ids(
            vec![VertexId::new("v1")],
            vec![EdgeId::new("e1")],
        ))
        .await
        .unwrap();
    session.next_outcome().await;

    session.data.remove_edges(&[EdgeId::new("e1")]).await;
    session
        .coordinator
        .handle(Event::EdgesDeleted {
            edge_ids: vec![EdgeId::new("e1")],
        })
        .await
        .unwrap();

    match session.next_outcome().await {
        Notification::ObjectsSelected { vertices, edges, .. } => {
            assert_eq!(vertices.len(), 1);
            assert!(edges.is_empty());
        }
        other => panic!("Expected ObjectsSelected, got {:?}", other),
    }

    session.observer.abort();
}

#[tokio::test]
async fn test_concurrent_selections_apply_in_order() {
    let mut session = Session::start(Config::default()).await;

    let first = session
        .coordinator
        .select_objects(SelectionRequest::vertices(["v1"]));
    let second = session
        .coordinator
        .select_objects(SelectionRequest::vertices(["v2"]));
    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    session.next_outcome().await;
    session.next_outcome().await;

    let selected = session.coordinator.selected_objects().await;
    assert_eq!(selected.vertex_ids, vec![VertexId::new("v2")]);

    let stack = session.coordinator.selected_objects_stack().await;
    assert_eq!(stack.len(), 1);
    assert_eq!(stack[0].title.as_deref(), Some("Vertex 1"));

    session.observer.abort();
}
