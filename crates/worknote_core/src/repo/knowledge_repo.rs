//! Finalized record persistence.
//!
//! # Responsibility
//! - Define the commit contract (`KnowledgeStore`) that turns a validated
//!   record into a durable entry with a commit id and storage location.
//! - Provide a SQLite implementation that also stores the rendered page.
//!
//! # Invariants
//! - Only typed `KnowledgeRecord` values are accepted.
//! - Locations are unique; collisions get a numeric suffix.
//! - Store failures carry a message only; callers do not branch on subtype.

use crate::db::ensure_schema_ready;
use crate::export::markdown::{render_markdown, to_kebab_case};
use crate::model::draft::now_epoch_ms;
use crate::model::knowledge::KnowledgeRecord;
use crate::repo::{RepoError, RepoResult};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub commit_id: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

/// Message-carrying failure reported by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for StoreError {}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::new(value.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Persistence collaborator for finalized records.
pub trait KnowledgeStore {
    fn commit(&self, record: &KnowledgeRecord) -> Result<SaveReceipt, StoreError>;
}

/// Layout options for stored pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Directory prefix for locations, e.g. `docs/runbooks`.
    pub save_path: String,
    /// Author shown in frontmatter and revision history.
    pub author: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            save_path: "docs/runbooks".to_string(),
            author: None,
        }
    }
}

/// SQLite-backed record store.
pub struct SqliteKnowledgeStore<'conn> {
    conn: &'conn Connection,
    options: ExportOptions,
}

impl<'conn> SqliteKnowledgeStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection, options: ExportOptions) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn, options })
    }

    /// Returns the rendered page stored under `commit_id`.
    pub fn load_markdown(&self, commit_id: &str) -> RepoResult<Option<String>> {
        let markdown = self
            .conn
            .query_row(
                "SELECT markdown FROM knowledge_records WHERE commit_id = ?1;",
                [commit_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(markdown)
    }

    fn location_taken(&self, location: &str) -> RepoResult<bool> {
        let taken = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM knowledge_records WHERE location = ?1);",
            [location],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(taken == 1)
    }

    fn allocate_location(&self, record: &KnowledgeRecord) -> RepoResult<String> {
        let stem = to_kebab_case(&record.title)
            .unwrap_or_else(|| Local::now().format("%Y%m%d-%H%M%S").to_string());
        let directory = format!(
            "{}/{}",
            self.options.save_path.trim_end_matches('/'),
            record.category.as_str()
        );

        let mut location = format!("{directory}/{stem}.md");
        let mut suffix = 2u32;
        while self.location_taken(&location)? {
            location = format!("{directory}/{stem}-{suffix}.md");
            suffix += 1;
        }
        Ok(location)
    }
}

impl KnowledgeStore for SqliteKnowledgeStore<'_> {
    fn commit(&self, record: &KnowledgeRecord) -> Result<SaveReceipt, StoreError> {
        let commit_id = Uuid::new_v4().simple().to_string();
        let location = self.allocate_location(record)?;
        let markdown = render_markdown(
            record,
            self.options.author.as_deref(),
            Local::now().date_naive(),
        );

        self.conn.execute(
            "INSERT INTO knowledge_records (
                commit_id,
                location,
                title,
                category,
                severity,
                symptoms,
                procedure,
                notes,
                related_links,
                judgment,
                markdown,
                committed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                commit_id,
                location,
                record.title,
                record.category.as_str(),
                record.severity.as_str(),
                record.symptoms,
                record.procedure,
                record.notes,
                record.related_links,
                record.judgment,
                markdown,
                now_epoch_ms(),
            ],
        )?;

        Ok(SaveReceipt {
            commit_id,
            location,
            pr_url: None,
        })
    }
}
