//! LLM completion client for OurStory.
//!
//! This crate provides the outbound half of the chat proxy: a
//! [`CompletionBackend`] trait over OpenAI-compatible chat completion APIs,
//! a [`GroqBackend`] implementation, and a [`MockBackend`] for deterministic
//! tests.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  CompletionBackend trait                │
//! │  - complete() -> CompletionResponse     │
//! └─────────────────────────────────────────┘
//!            │                │
//!            ▼                ▼
//!       ┌────────┐       ┌────────┐
//!       │  Groq  │       │  Mock  │
//!       └────────┘       └────────┘
//! ```

pub mod backend;
pub mod error;
pub mod groq;
pub mod types;

pub use backend::{CompletionBackend, MockBackend, MockResponse, SharedBackend};
pub use error::{LlmError, Result};
pub use groq::{GroqBackend, GroqConfig};
pub use types::{
    ChatMessage, Choice, CompletionRequest, CompletionResponse, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, Role, Usage,
};
