//! Memory CRUD and stats endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use ourstory_memory::{Memory, MemoryDraft, MemoryFilter, MemoryStats, MemoryType};

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for creating or updating a memory.
///
/// `type` arrives as a string and is parsed at the edge so an unknown
/// category maps to 400 rather than a body-decode rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPayload {
    /// Category, wire-spelled (e.g. `FIRST_MEETING`).
    #[serde(rename = "type")]
    pub memory_type: String,
    /// Title text.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Optional event date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl MemoryPayload {
    fn into_draft(self) -> Result<MemoryDraft, ServerError> {
        let memory_type = parse_type(&self.memory_type)?;
        let mut draft = MemoryDraft::new(memory_type, self.title, self.content);
        draft.date = self.date;
        Ok(draft)
    }
}

/// Query params for listing memories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMemoriesQuery {
    /// Filter by category.
    #[serde(rename = "type")]
    pub memory_type: Option<String>,
    /// Case-insensitive substring search over title and content.
    pub search: Option<String>,
    /// Maximum records to return.
    pub limit: Option<usize>,
}

fn parse_type(value: &str) -> Result<MemoryType, ServerError> {
    MemoryType::parse(value)
        .ok_or_else(|| ServerError::BadRequest(format!("Unknown memory type '{}'", value)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/memories - List memories, newest first.
pub async fn list_memories_handler(
    State(state): State<AppState>,
    Query(query): Query<ListMemoriesQuery>,
) -> Result<Json<Vec<Memory>>, ServerError> {
    let mut filter = MemoryFilter::default();

    if let Some(ref type_str) = query.memory_type {
        filter = filter.with_type(parse_type(type_str)?);
    }
    if let Some(search) = query.search {
        if !search.trim().is_empty() {
            filter = filter.with_search(search);
        }
    }
    if let Some(limit) = query.limit {
        filter = filter.with_limit(limit);
    }

    let memories = state.store.list(&filter)?;
    Ok(Json(memories))
}

/// GET /api/memories/stats - Total plus per-category counts.
pub async fn memory_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<MemoryStats>, ServerError> {
    let stats = state.store.stats()?;
    Ok(Json(stats))
}

/// GET /api/memories/:id - Get a single memory.
pub async fn get_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Memory>, ServerError> {
    let memory = state.store.get(id)?;
    Ok(Json(memory))
}

/// POST /api/memories - Create a memory.
pub async fn create_memory_handler(
    State(state): State<AppState>,
    Json(payload): Json<MemoryPayload>,
) -> Result<(StatusCode, Json<Memory>), ServerError> {
    let draft = payload.into_draft()?;
    let memory = state.store.create(&draft)?;
    Ok((StatusCode::CREATED, Json(memory)))
}

/// PUT /api/memories/:id - Overwrite a memory's fields.
pub async fn update_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MemoryPayload>,
) -> Result<Json<Memory>, ServerError> {
    let draft = payload.into_draft()?;
    let memory = state.store.update(id, &draft)?;
    Ok(Json(memory))
}

/// DELETE /api/memories/:id - Permanently delete a memory.
pub async fn delete_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
