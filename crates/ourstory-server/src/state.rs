//! Application state shared across handlers.

use std::sync::Arc;

use ourstory_llm::SharedBackend;
use ourstory_memory::MemoryStore;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// The store and the completion backend are injected capabilities so the
/// handlers can be exercised against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    /// Memory record store.
    pub store: Arc<MemoryStore>,

    /// Outbound completion backend.
    pub llm: SharedBackend,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: Arc<MemoryStore>, llm: SharedBackend, config: ServerConfig) -> Self {
        Self {
            store,
            llm,
            config: Arc::new(config),
        }
    }
}
