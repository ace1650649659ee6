//! HTTP API server for OurStory.
//!
//! This crate provides the network transport layer for the relationship
//! memory service: memory CRUD, aggregate stats, a chat proxy to an
//! external completion backend, and a health check.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ourstory_llm::GroqBackend;
//! use ourstory_memory::MemoryStore;
//! use ourstory_server::{Server, ServerConfig};
//!
//! let store = Arc::new(MemoryStore::open("ourstory.db")?);
//! let backend = Arc::new(GroqBackend::from_env()?);
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8787".parse()?);
//!
//! Server::new(store, backend, config).run().await?;
//! ```

pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::{ChatRequest, ChatResponse, FALLBACK_REPLY};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use ourstory_llm::SharedBackend;
use ourstory_memory::MemoryStore;

/// The OurStory HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given store, backend, and configuration.
    pub fn new(store: Arc<MemoryStore>, llm: SharedBackend, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, llm, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::get;

        Router::new()
            // Health is exempt from the origin check
            .route("/api/health", get(routes::health_handler))
            .merge(self.api_routes())
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes behind the origin allow-list.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        Router::new()
            // Chat proxy
            .route("/api/chat", post(routes::chat_handler))
            // Memory endpoints (static /stats wins over the {id} capture)
            .route(
                "/api/memories",
                get(routes::list_memories_handler).post(routes::create_memory_handler),
            )
            .route("/api/memories/stats", get(routes::memory_stats_handler))
            .route(
                "/api/memories/{id}",
                get(routes::get_memory_handler)
                    .put(routes::update_memory_handler)
                    .delete(routes::delete_memory_handler),
            )
            // Origin allow-list (runs first), then CORS response headers
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                cors::origin_middleware,
            ))
            .layer(cors::cors_layer(&self.state.config))
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
