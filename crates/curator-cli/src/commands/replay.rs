//! Replay command implementation.
//!
//! Feeds a recorded session through the selection coordinator over an
//! in-memory data facade and prints what the coordinator emitted.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use curator_core::{Edge, Vertex};
use curator_ops::{
    Config, CoordinatorContext, Event, InMemoryDataRequest, Notification, RecordingStore,
    SelectionCoordinator, StackEntry,
};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::read_json;

/// A recorded session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFixture {
    /// Workspace to switch to before the first event.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Vertices known to the data facade.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    /// Edges known to the data facade.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Server configuration properties.
    #[serde(default)]
    pub config: HashMap<String, String>,
    /// Events in the order they are applied.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Everything a replay produced.
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Notifications in emission order.
    pub notifications: Vec<Notification>,
    /// Visible selection history after the last event, newest first.
    pub stack: Vec<StackEntry>,
}

/// Replay the session stored in `file` and print the outcome.
pub async fn execute(config: Config, file: &Path) -> Result<()> {
    let fixture: SessionFixture = read_json(file)?;
    let report = run(config, fixture).await?;

    for notification in &report.notifications {
        println!("{}", serde_json::to_string(notification)?);
    }

    println!("\nSelection history ({} entries)", report.stack.len());
    println!("{:-<40}", "");
    for entry in &report.stack {
        println!(
            "{}{}",
            entry.title.as_deref().unwrap_or("(untitled)"),
            if entry.multiple { "  [multiple]" } else { "" }
        );
    }
    Ok(())
}

/// Run a session through a fresh coordinator.
///
/// Selections dispatched to the store are fed back after every event, the
/// way the store observer would, so the outcome is deterministic.
pub async fn run(config: Config, fixture: SessionFixture) -> Result<ReplayReport> {
    let data = Arc::new(InMemoryDataRequest::with_elements(
        fixture.vertices,
        fixture.edges,
    ));
    for (key, value) in fixture.config {
        data.set_property(key, value).await;
    }

    let store = Arc::new(RecordingStore::new());
    let context = CoordinatorContext::new(data.clone(), store.clone()).with_config(config);
    let coordinator = SelectionCoordinator::connect(context).await?;
    let mut events = coordinator.subscribe();
    let mut report = ReplayReport::default();

    if let Some(workspace_id) = fixture.workspace_id {
        coordinator.switch_workspace(workspace_id).await?;
    }

    info!(events = fixture.events.len(), "Replaying session");
    for event in fixture.events {
        // Deletions arrive after the backend already dropped the elements.
        match &event {
            Event::VerticesDeleted { vertex_ids } => data.remove_vertices(vertex_ids).await,
            Event::EdgesDeleted { edge_ids } => data.remove_edges(edge_ids).await,
            _ => {}
        }

        coordinator.handle(event).await?;
        loop {
            let dispatched = store.drain();
            if dispatched.is_empty() {
                break;
            }
            debug!(count = dispatched.len(), "Applying dispatched selections");
            for payload in dispatched {
                coordinator.select_objects(payload.into()).await?;
            }
        }
        collect(&mut events, &mut report.notifications);
    }

    report.stack = coordinator.selected_objects_stack().await;
    Ok(report)
}

fn collect(events: &mut broadcast::Receiver<Notification>, out: &mut Vec<Notification>) {
    while let Ok(notification) = events.try_recv() {
        out.push(notification);
    }
}
