//! Memory storage for OurStory.
//!
//! This crate provides persistent storage for relationship memory records
//! and a best-effort chat transcript log, backed by a single SQLite file
//! with WAL mode (or an in-memory database for tests).
//!
//! # Usage
//!
//! ```no_run
//! use ourstory_memory::{MemoryDraft, MemoryFilter, MemoryStore, MemoryType};
//!
//! let store = MemoryStore::open("ourstory.db")?;
//!
//! let memory = store.create(&MemoryDraft::new(
//!     MemoryType::Event,
//!     "Anniversary",
//!     "Dinner at the place we met",
//! ))?;
//!
//! let events = store.list(&MemoryFilter::default().with_type(MemoryType::Event))?;
//! assert_eq!(events[0].id, memory.id);
//! # Ok::<(), ourstory_memory::MemoryError>(())
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::{MemoryError, Result};
pub use store::MemoryStore;
pub use types::{
    DEFAULT_LIST_LIMIT, Memory, MemoryDraft, MemoryFilter, MemoryStats, MemoryType,
};
