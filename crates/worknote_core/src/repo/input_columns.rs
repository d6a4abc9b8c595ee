//! Column mapping for `KnowledgeInput` fields shared by the drafts and
//! auto-save tables.

use crate::model::knowledge::KnowledgeInput;
use rusqlite::Row;

/// Column list in bind order, matching `input_values`.
pub(crate) const INPUT_COLUMNS: &str =
    "title, category, severity, symptoms, procedure, notes, related_links, judgment";

/// Field values in `INPUT_COLUMNS` order.
pub(crate) fn input_values(input: &KnowledgeInput) -> [Option<&str>; 8] {
    [
        input.title.as_deref(),
        input.category.as_deref(),
        input.severity.as_deref(),
        input.symptoms.as_deref(),
        input.procedure.as_deref(),
        input.notes.as_deref(),
        input.related_links.as_deref(),
        input.judgment.as_deref(),
    ]
}

pub(crate) fn parse_input_columns(row: &Row<'_>) -> rusqlite::Result<KnowledgeInput> {
    Ok(KnowledgeInput {
        title: row.get("title")?,
        category: row.get("category")?,
        severity: row.get("severity")?,
        symptoms: row.get("symptoms")?,
        procedure: row.get("procedure")?,
        notes: row.get("notes")?,
        related_links: row.get("related_links")?,
        judgment: row.get("judgment")?,
    })
}
