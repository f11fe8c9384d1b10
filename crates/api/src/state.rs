use std::sync::Arc;

use folio_core::history::{RevisionBackend, RevisionStore};
use folio_core::memory::{MemoryPostStore, MemoryRevisionBackend};
use folio_core::restore::{PostStore, RestoreController};
use folio_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Per-post revision history.
    pub store: Arc<RevisionStore>,
    pub restore: Arc<RestoreController>,
    /// Live post content.
    pub posts: Arc<dyn PostStore>,
    /// Publishes revision events.
    pub event_bus: Arc<EventBus>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the revision store and restore controller over the given backends.
    pub fn new(
        backend: Arc<dyn RevisionBackend>,
        posts: Arc<dyn PostStore>,
        event_bus: Arc<EventBus>,
        config: ServerConfig,
    ) -> Self {
        let store = Arc::new(RevisionStore::new(backend, config.history.clone()));
        let restore = Arc::new(RestoreController::new(Arc::clone(&store), Arc::clone(&posts)));
        Self {
            store,
            restore,
            posts,
            event_bus,
            config: Arc::new(config),
        }
    }

    /// State backed entirely by in-process storage.
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(
            Arc::new(MemoryRevisionBackend::new()),
            Arc::new(MemoryPostStore::new()),
            Arc::new(EventBus::default()),
            config,
        )
    }
}
