//! API routes.

pub mod chat;
pub mod health;
pub mod memories;

pub use chat::{ChatRequest, ChatResponse, FALLBACK_REPLY, chat_handler};
pub use health::{HealthResponse, health_handler};
pub use memories::{
    ListMemoriesQuery, MemoryPayload, create_memory_handler, delete_memory_handler,
    get_memory_handler, list_memories_handler, memory_stats_handler, update_memory_handler,
};
