//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine and tools call store methods — they never execute SQL directly.

mod forecast;
mod history;
mod master;
mod scenario;

pub use history::VolumeSum;

use crate::{error::PlanResult, model::AuditEvent};
use rusqlite::{params, Connection};

pub struct PlanStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl PlanStore {
    pub fn open(path: &str) -> PlanResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PlanResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> PlanResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PlanResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Audit log ──────────────────────────────────────────────

    pub fn append_audit(&self, event: &AuditEvent) -> PlanResult<()> {
        self.conn.execute(
            "INSERT INTO audit_event (id, occurred_at, actor, action, summary, entity_type, entity_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id,
                event.occurred_at,
                event.actor,
                event.action,
                event.summary,
                event.entity_type.as_deref(),
                event.entity_id.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn recent_audit(&self, limit: u32) -> PlanResult<Vec<AuditEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, occurred_at, actor, action, summary, entity_type, entity_id
             FROM audit_event ORDER BY occurred_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(AuditEvent {
                id: row.get(0)?,
                occurred_at: row.get(1)?,
                actor: row.get(2)?,
                action: row.get(3)?,
                summary: row.get(4)?,
                entity_type: row.get(5)?,
                entity_id: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
