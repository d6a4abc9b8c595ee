//! Auto-save slot storage.
//!
//! # Responsibility
//! - Hold the single "last typed" form snapshot, separate from drafts.
//! - Offer an in-memory slot and a SQLite-backed slot behind one trait.
//!
//! # Invariants
//! - At most one snapshot exists; every write replaces the previous one.
//! - The slot has no identity and no history.

use crate::db::ensure_schema_ready;
use crate::model::knowledge::KnowledgeInput;
use crate::repo::input_columns::{input_values, parse_input_columns, INPUT_COLUMNS};
use crate::repo::RepoResult;
use rusqlite::{params, Connection};
use std::cell::RefCell;

/// Slot content: form state plus a diagnostics-only save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub input: KnowledgeInput,
    /// Unix epoch milliseconds.
    pub saved_at: i64,
}

/// Storage contract for the auto-save slot.
pub trait SnapshotSlot {
    fn write(&self, snapshot: &Snapshot) -> RepoResult<()>;
    fn read(&self) -> RepoResult<Option<Snapshot>>;
    fn clear(&self) -> RepoResult<()>;
}

/// Process-local slot. Content is lost when the value is dropped.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSlot {
    cell: RefCell<Option<Snapshot>>,
}

impl InMemorySnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSlot for InMemorySnapshotSlot {
    fn write(&self, snapshot: &Snapshot) -> RepoResult<()> {
        *self.cell.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn read(&self) -> RepoResult<Option<Snapshot>> {
        Ok(self.cell.borrow().clone())
    }

    fn clear(&self) -> RepoResult<()> {
        self.cell.borrow_mut().take();
        Ok(())
    }
}

/// Durable slot stored as the single row of `autosave_slot`.
pub struct SqliteSnapshotSlot<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotSlot<'conn> {
    /// Constructs a slot from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotSlot for SqliteSnapshotSlot<'_> {
    fn write(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let [title, category, severity, symptoms, procedure, notes, related_links, judgment] =
            input_values(&snapshot.input);

        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO autosave_slot (slot, {INPUT_COLUMNS}, saved_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);"
            ),
            params![
                title,
                category,
                severity,
                symptoms,
                procedure,
                notes,
                related_links,
                judgment,
                snapshot.saved_at,
            ],
        )?;
        Ok(())
    }

    fn read(&self) -> RepoResult<Option<Snapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INPUT_COLUMNS}, saved_at FROM autosave_slot WHERE slot = 1;"
        ))?;

        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Snapshot {
                input: parse_input_columns(row)?,
                saved_at: row.get("saved_at")?,
            }));
        }

        Ok(None)
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM autosave_slot;", [])?;
        Ok(())
    }
}
