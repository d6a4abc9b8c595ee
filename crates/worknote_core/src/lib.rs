//! Core domain logic for WorkNote.
//! This crate is the single source of truth for validation rules and the
//! draft lifecycle.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::config::{Config, ConfigValidationError};
pub use model::draft::{Draft, DraftId, DraftSummary};
pub use model::knowledge::{Category, KnowledgeInput, KnowledgeRecord, Severity};
pub use repo::config_repo::{ConfigRepository, SqliteConfigRepository};
pub use repo::draft_repo::{DraftRepository, SqliteDraftRepository};
pub use repo::knowledge_repo::{
    ExportOptions, KnowledgeStore, SaveReceipt, SqliteKnowledgeStore, StoreError,
};
pub use repo::snapshot_repo::{InMemorySnapshotSlot, SnapshotSlot, SqliteSnapshotSlot};
pub use repo::{RepoError, RepoResult};
pub use service::autosave_service::AutoSave;
pub use service::draft_service::{DraftDeletion, DraftService, DraftServiceError};
pub use service::knowledge_service::{KnowledgeService, SubmitError, SubmitOutcome};
pub use validation::{
    validate_knowledge_input, FieldError, FieldErrorKind, KnowledgeField, ValidationResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
