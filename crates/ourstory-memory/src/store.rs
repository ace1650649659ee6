//! Memory store implementation using SQLite.
//!
//! Provides persistent storage for memory records plus a best-effort chat
//! transcript log. Uses WAL mode for better concurrent read performance.
//! Each operation is a single atomic unit against the store; there is no
//! transactional coupling between operations.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info};

use crate::error::{MemoryError, Result};
use crate::types::{Memory, MemoryDraft, MemoryFilter, MemoryStats, MemoryType};

/// Current schema version for migrations.
const SCHEMA_VERSION: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// Memory store backed by SQLite.
///
/// Record IDs are SQLite rowids: unique, monotonically assigned, and never
/// reused for the lifetime of the table. Deletion is permanent.
pub struct MemoryStore {
    /// The SQLite connection (wrapped in Mutex for thread safety).
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

impl MemoryStore {
    /// Open or create a memory store at the given path.
    ///
    /// Creates the database file and initializes the schema if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|_| {
                    MemoryError::Database(rusqlite::Error::InvalidPath(path.to_path_buf()))
                })?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!("Memory store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!("In-memory store created");
        Ok(store)
    }

    /// Initialize the database with schema and pragmas.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // Enable WAL mode for better concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::create_schema(&conn)?;

        Ok(())
    }

    /// Create the database schema.
    fn create_schema(conn: &Connection) -> Result<()> {
        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!("Schema up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating schema from version {} to {}",
            current_version, SCHEMA_VERSION
        );

        conn.execute_batch(
            r#"
            -- Memory records
            CREATE TABLE IF NOT EXISTS memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                memory_type TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(memory_type);
            CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at);

            -- Best-effort chat transcript log; never read back by the API
            CREATE TABLE IF NOT EXISTS chats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                message TEXT NOT NULL,
                reply TEXT NOT NULL,
                model TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| MemoryError::Migration(e.to_string()))?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory CRUD
// ─────────────────────────────────────────────────────────────────────────────

const MEMORY_COLUMNS: &str = "id, memory_type, title, content, date, created_at, updated_at";

impl MemoryStore {
    /// Create a new memory record.
    ///
    /// Fails with `Validation` if title or content is empty after trimming.
    /// Assigns the next rowid and sets `created_at == updated_at`.
    pub fn create(&self, draft: &MemoryDraft) -> Result<Memory> {
        validate_draft(draft)?;

        let now = Utc::now();
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO memories (memory_type, title, content, date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                draft.memory_type.as_str(),
                draft.title,
                draft.content,
                draft.date.map(|d| d.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Created memory {} ({})", id, draft.memory_type);

        Ok(Memory {
            id,
            memory_type: draft.memory_type,
            title: draft.title.clone(),
            content: draft.content.clone(),
            date: draft.date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a memory record by ID.
    ///
    /// Fails with `NotFound` if no record has that ID.
    pub fn get(&self, id: i64) -> Result<Memory> {
        let conn = self.conn.lock().unwrap();
        Self::fetch(&conn, id)?.ok_or_else(|| MemoryError::NotFound(format!("Memory {}", id)))
    }

    /// Overwrite the caller-supplied fields of an existing record.
    ///
    /// Fails with `NotFound` if the ID is absent (no upsert semantics) and
    /// with `Validation` on an empty title or content. `created_at` is
    /// preserved; `updated_at` is refreshed.
    pub fn update(&self, id: i64, draft: &MemoryDraft) -> Result<Memory> {
        validate_draft(draft)?;

        let now = Utc::now();
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute(
            r#"
            UPDATE memories
            SET memory_type = ?2, title = ?3, content = ?4, date = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
            params![
                id,
                draft.memory_type.as_str(),
                draft.title,
                draft.content,
                draft.date.map(|d| d.to_string()),
                now.to_rfc3339(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(MemoryError::NotFound(format!("Memory {}", id)));
        }

        debug!("Updated memory {}", id);
        Self::fetch(&conn, id)?.ok_or_else(|| MemoryError::NotFound(format!("Memory {}", id)))
    }

    /// Permanently delete a memory record.
    ///
    /// Fails with `NotFound` if the ID is absent; a repeated delete of the
    /// same ID is therefore `NotFound` again, not success.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute("DELETE FROM memories WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(MemoryError::NotFound(format!("Memory {}", id)));
        }

        debug!("Deleted memory {}", id);
        Ok(())
    }

    /// List memory records, newest-first by creation time.
    ///
    /// The filter's category and search term combine as an intersection;
    /// the search is a case-insensitive substring match against title and
    /// content. Results are capped at `filter.limit`.
    pub fn list(&self, filter: &MemoryFilter) -> Result<Vec<Memory>> {
        let conn = self.conn.lock().unwrap();

        let mut clauses: Vec<String> = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ty) = filter.memory_type {
            params_vec.push(Box::new(ty.as_str().to_string()));
            clauses.push(format!("memory_type = ?{}", params_vec.len()));
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            params_vec.push(Box::new(pattern));
            let n = params_vec.len();
            clauses.push(format!(
                "(LOWER(title) LIKE ?{n} OR LOWER(content) LIKE ?{n})"
            ));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        params_vec.push(Box::new(filter.limit as i64));
        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories {where_clause} \
             ORDER BY created_at DESC, id DESC LIMIT ?{}",
            params_vec.len()
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();
        let mut rows = stmt.query(params_refs.as_slice())?;

        let mut memories = Vec::new();
        while let Some(row) = rows.next()? {
            memories.push(Self::row_to_memory(row)?);
        }

        Ok(memories)
    }

    /// Aggregate counts: total plus one count per category, zero-filled.
    ///
    /// A single `GROUP BY` query; `total` is the sum of the per-category
    /// counts by construction.
    pub fn stats(&self) -> Result<MemoryStats> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT memory_type, COUNT(*) FROM memories GROUP BY memory_type")?;
        let mut rows = stmt.query([])?;

        let mut stats = MemoryStats::default();
        while let Some(row) = rows.next()? {
            let type_str: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let memory_type = MemoryType::parse(&type_str).ok_or_else(|| {
                MemoryError::InvalidData(format!("Unknown memory type: {}", type_str))
            })?;
            stats.record(memory_type, count as usize);
        }

        Ok(stats)
    }

    /// Fetch a single record by ID under an already-held lock.
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Memory>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_memory(row)?)),
            None => Ok(None),
        }
    }

    /// Convert a database row to a Memory struct.
    ///
    /// Expected column order: id, memory_type, title, content, date,
    /// created_at, updated_at.
    fn row_to_memory(row: &rusqlite::Row) -> Result<Memory> {
        let id: i64 = row.get(0)?;
        let type_str: String = row.get(1)?;
        let title: String = row.get(2)?;
        let content: String = row.get(3)?;
        let date_str: Option<String> = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        let memory_type = MemoryType::parse(&type_str)
            .ok_or_else(|| MemoryError::InvalidData(format!("Unknown memory type: {}", type_str)))?;
        let date = date_str
            .as_deref()
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|e| MemoryError::InvalidData(e.to_string()))
            })
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| MemoryError::InvalidData(e.to_string()))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| MemoryError::InvalidData(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Memory {
            id,
            memory_type,
            title,
            content,
            date,
            created_at,
            updated_at,
        })
    }
}

/// Reject drafts whose title or content is empty after trimming.
fn validate_draft(draft: &MemoryDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(MemoryError::Validation("Title is required".to_string()));
    }
    if draft.content.trim().is_empty() {
        return Err(MemoryError::Validation("Content is required".to_string()));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Log
// ─────────────────────────────────────────────────────────────────────────────

impl MemoryStore {
    /// Append one exchange to the chat transcript log.
    ///
    /// The log is a side artifact: callers are expected to treat a failure
    /// here as non-fatal.
    pub fn log_chat(&self, user_id: &str, message: &str, reply: &str, model: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO chats (user_id, message, reply, model, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![user_id, message, reply, model, Utc::now().to_rfc3339()],
        )?;

        debug!("Logged chat exchange for user {}", user_id);
        Ok(())
    }

    /// Number of logged chat exchanges.
    pub fn chat_log_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
