//! Core types for memory storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on list results (most-recent-N, no pagination contract).
pub const DEFAULT_LIST_LIMIT: usize = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Memory Type
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a memory record.
///
/// The set is closed; the wire spelling is SCREAMING_SNAKE_CASE
/// (`FIRST_MEETING`, `HER_INFO`, ...) to match the client contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryType {
    /// How the couple first met.
    FirstMeeting,
    /// A general shared memory.
    Memory,
    /// Facts about her.
    HerInfo,
    /// Facts about him.
    HisInfo,
    /// A dated event (anniversary, trip, ...).
    Event,
    /// Free-form note.
    Note,
}

impl MemoryType {
    /// All categories, in display order. Used for zero-filled stats.
    pub const ALL: [MemoryType; 6] = [
        MemoryType::FirstMeeting,
        MemoryType::Memory,
        MemoryType::HerInfo,
        MemoryType::HisInfo,
        MemoryType::Event,
        MemoryType::Note,
    ];

    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::FirstMeeting => "FIRST_MEETING",
            MemoryType::Memory => "MEMORY",
            MemoryType::HerInfo => "HER_INFO",
            MemoryType::HisInfo => "HIS_INFO",
            MemoryType::Event => "EVENT",
            MemoryType::Note => "NOTE",
        }
    }

    /// Parse from the database/wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FIRST_MEETING" => Some(MemoryType::FirstMeeting),
            "MEMORY" => Some(MemoryType::Memory),
            "HER_INFO" => Some(MemoryType::HerInfo),
            "HIS_INFO" => Some(MemoryType::HisInfo),
            "EVENT" => Some(MemoryType::Event),
            "NOTE" => Some(MemoryType::Note),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Record
// ─────────────────────────────────────────────────────────────────────────────

/// A stored memory record.
///
/// `id` is the server-assigned rowid and never changes. `created_at` is
/// immutable; `updated_at` is refreshed on every update and equals
/// `created_at` at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Unique record ID, assigned by the store.
    pub id: i64,
    /// Category of the memory.
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    /// Short title. Non-empty.
    pub title: String,
    /// Free text. Non-empty, unbounded.
    pub content: String,
    /// When the remembered event occurred (caller-supplied, distinct from
    /// record creation time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied fields of a memory, used for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDraft {
    /// Category of the memory.
    pub memory_type: MemoryType,
    /// Short title. Must be non-empty after trimming.
    pub title: String,
    /// Free text. Must be non-empty after trimming.
    pub content: String,
    /// Optional calendar date of the remembered event.
    pub date: Option<NaiveDate>,
}

impl MemoryDraft {
    /// Create a new draft.
    pub fn new(
        memory_type: MemoryType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            memory_type,
            title: title.into(),
            content: content.into(),
            date: None,
        }
    }

    /// Set the event date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filtering
// ─────────────────────────────────────────────────────────────────────────────

/// Filter for listing memories.
///
/// Category and search combine as an intersection. Results are always
/// newest-first by creation time, capped at `limit`.
#[derive(Debug, Clone)]
pub struct MemoryFilter {
    /// Restrict to a single category.
    pub memory_type: Option<MemoryType>,
    /// Case-insensitive substring match against title and content.
    pub search: Option<String>,
    /// Maximum number of records returned.
    pub limit: usize,
}

impl Default for MemoryFilter {
    fn default() -> Self {
        Self {
            memory_type: None,
            search: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl MemoryFilter {
    /// Restrict the filter to one category.
    pub fn with_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    /// Add a substring search over title and content.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Override the result cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate record counts, total plus one count per category.
///
/// Categories with no records report zero, so `total` always equals the sum
/// of the per-category counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total number of records.
    pub total: usize,
    #[serde(rename = "FIRST_MEETING")]
    pub first_meeting: usize,
    #[serde(rename = "MEMORY")]
    pub memory: usize,
    #[serde(rename = "HER_INFO")]
    pub her_info: usize,
    #[serde(rename = "HIS_INFO")]
    pub his_info: usize,
    #[serde(rename = "EVENT")]
    pub event: usize,
    #[serde(rename = "NOTE")]
    pub note: usize,
}

impl MemoryStats {
    /// Record `count` rows for `memory_type`, updating the total.
    pub(crate) fn record(&mut self, memory_type: MemoryType, count: usize) {
        *self.slot_mut(memory_type) += count;
        self.total += count;
    }

    /// Count for a single category.
    pub fn count_for(&self, memory_type: MemoryType) -> usize {
        match memory_type {
            MemoryType::FirstMeeting => self.first_meeting,
            MemoryType::Memory => self.memory,
            MemoryType::HerInfo => self.her_info,
            MemoryType::HisInfo => self.his_info,
            MemoryType::Event => self.event,
            MemoryType::Note => self.note,
        }
    }

    fn slot_mut(&mut self, memory_type: MemoryType) -> &mut usize {
        match memory_type {
            MemoryType::FirstMeeting => &mut self.first_meeting,
            MemoryType::Memory => &mut self.memory,
            MemoryType::HerInfo => &mut self.her_info,
            MemoryType::HisInfo => &mut self.his_info,
            MemoryType::Event => &mut self.event,
            MemoryType::Note => &mut self.note,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
