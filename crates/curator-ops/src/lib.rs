//! Graph Curator Operations Layer
//!
//! Runtime services behind a graph curation UI: the selection coordinator,
//! the selection history stack and the cached ontology projection. Front ends
//! talk to it through typed events and receive typed notifications back.
//!
//! ## Architecture
//!
//! - **DataRequest**: async facade resolving ids and serving the ontology
//! - **SelectionStore**: where interactive selections are dispatched
//! - **SelectionCoordinator**: applies selections, deletions and actions
//! - **OntologyProjection**: memoized derived views of one ontology snapshot
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use curator_ops::{
//!     ChannelStore, Config, CoordinatorContext, InMemoryDataRequest, SelectionCoordinator,
//!     SelectionRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let data = Arc::new(InMemoryDataRequest::new());
//!     let (store, receiver) = ChannelStore::new();
//!     let context = CoordinatorContext::new(data, Arc::new(store)).with_config(Config::load()?);
//!
//!     let coordinator = Arc::new(SelectionCoordinator::connect(context).await?);
//!     let observer = coordinator.spawn_store_observer(receiver);
//!
//!     coordinator.select_objects(SelectionRequest::vertices(["v1"])).await?;
//!     observer.abort();
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod coordinator;
mod error;
mod events;
mod facade;
mod menu;
mod ontology;
mod selection;
mod stack;
mod store;

// Re-export public API
pub use cache::{CacheStats, MemoCache};
pub use config::{Config, HISTORY_STACK_MAX_ENV, HISTORY_STACK_MAX_KEY};
pub use coordinator::{CoordinatorContext, SelectionCoordinator};
pub use error::{OpsError, OpsResult};
pub use events::{Event, EventBus, Notification};
pub use facade::{DataRequest, InMemoryDataRequest, RequestStats};
pub use menu::{insert_menu_item, MenuItem, MenuPlacement};
pub use ontology::{ConceptNode, OntologyProjection, OntologyRegistry, RelationshipLookup};
pub use selection::{SelectOptions, SelectedObjects, SelectionPayload, SelectionRequest};
pub use stack::{SelectionStack, StackEntry};
pub use store::{ChannelStore, RecordingStore, SelectionStore};
