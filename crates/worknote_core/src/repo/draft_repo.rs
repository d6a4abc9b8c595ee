//! Draft repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed CRUD over the `drafts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Draft::validate()` before SQL mutations.
//! - `insert_draft` never overwrites an existing id.
//! - Summaries are ordered by `updated_at DESC, id ASC`.

use crate::db::ensure_schema_ready;
use crate::model::draft::{Draft, DraftId, DraftSummary};
use crate::repo::input_columns::{input_values, parse_input_columns, INPUT_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for draft persistence.
pub trait DraftRepository {
    /// Inserts a new draft. Fails with `DuplicateId` when the id is taken.
    fn insert_draft(&self, draft: &Draft) -> RepoResult<()>;
    /// Replaces an existing draft. Fails with `NotFound` for unknown ids.
    fn update_draft(&self, draft: &Draft) -> RepoResult<()>;
    /// Writes the draft as given, inserting or overwriting.
    fn upsert_draft(&self, draft: &Draft) -> RepoResult<()>;
    fn get_draft(&self, id: DraftId) -> RepoResult<Option<Draft>>;
    fn list_drafts(&self) -> RepoResult<Vec<DraftSummary>>;
    /// Removes a draft. Returns whether a row was removed.
    fn delete_draft(&self, id: DraftId) -> RepoResult<bool>;
}

/// SQLite-backed draft repository.
pub struct SqliteDraftRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDraftRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DraftRepository for SqliteDraftRepository<'_> {
    fn insert_draft(&self, draft: &Draft) -> RepoResult<()> {
        draft.validate()?;
        let [title, category, severity, symptoms, procedure, notes, related_links, judgment] =
            input_values(&draft.data);

        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO drafts (id, {INPUT_COLUMNS}, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);"
            ),
            params![
                draft.id.to_string(),
                title,
                category,
                severity,
                symptoms,
                procedure,
                notes,
                related_links,
                judgment,
                draft.created_at,
                draft.updated_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_primary_key_conflict(&err) => Err(RepoError::DuplicateId(draft.id)),
            Err(err) => Err(err.into()),
        }
    }

    fn update_draft(&self, draft: &Draft) -> RepoResult<()> {
        draft.validate()?;
        let [title, category, severity, symptoms, procedure, notes, related_links, judgment] =
            input_values(&draft.data);

        let changed = self.conn.execute(
            "UPDATE drafts
             SET
                title = ?2,
                category = ?3,
                severity = ?4,
                symptoms = ?5,
                procedure = ?6,
                notes = ?7,
                related_links = ?8,
                judgment = ?9,
                updated_at = ?10
             WHERE id = ?1;",
            params![
                draft.id.to_string(),
                title,
                category,
                severity,
                symptoms,
                procedure,
                notes,
                related_links,
                judgment,
                draft.updated_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(draft.id));
        }

        Ok(())
    }

    fn upsert_draft(&self, draft: &Draft) -> RepoResult<()> {
        draft.validate()?;
        let [title, category, severity, symptoms, procedure, notes, related_links, judgment] =
            input_values(&draft.data);

        self.conn.execute(
            &format!(
                "INSERT INTO drafts (id, {INPUT_COLUMNS}, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    category = excluded.category,
                    severity = excluded.severity,
                    symptoms = excluded.symptoms,
                    procedure = excluded.procedure,
                    notes = excluded.notes,
                    related_links = excluded.related_links,
                    judgment = excluded.judgment,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at;"
            ),
            params![
                draft.id.to_string(),
                title,
                category,
                severity,
                symptoms,
                procedure,
                notes,
                related_links,
                judgment,
                draft.created_at,
                draft.updated_at,
            ],
        )?;

        Ok(())
    }

    fn get_draft(&self, id: DraftId) -> RepoResult<Option<Draft>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, {INPUT_COLUMNS}, created_at, updated_at
             FROM drafts
             WHERE id = ?1;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_draft_row(row)?));
        }

        Ok(None)
    }

    fn list_drafts(&self) -> RepoResult<Vec<DraftSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, category, updated_at
             FROM drafts
             ORDER BY updated_at DESC, id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(DraftSummary {
                id: parse_draft_id(row)?,
                title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
                category: row.get::<_, Option<String>>("category")?.unwrap_or_default(),
                updated_at: row.get("updated_at")?,
            });
        }

        Ok(summaries)
    }

    fn delete_draft(&self, id: DraftId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM drafts WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_draft_row(row: &Row<'_>) -> RepoResult<Draft> {
    let draft = Draft {
        id: parse_draft_id(row)?,
        data: parse_input_columns(row)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    draft.validate()?;
    Ok(draft)
}

fn parse_draft_id(row: &Row<'_>) -> RepoResult<DraftId> {
    let id_text: String = row.get("id")?;
    Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in drafts.id")))
}

/// Only a primary-key clash means the id is taken; CHECK and NOT NULL
/// failures stay database errors.
fn is_primary_key_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
