//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for drafts, the
//!   auto-save slot, finalized records and app config.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate domain invariants before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use crate::model::config::ConfigValidationError;
use crate::model::draft::{DraftId, DraftValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod config_repo;
pub mod draft_repo;
mod input_columns;
pub mod knowledge_repo;
pub mod snapshot_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(DraftValidationError),
    Config(ConfigValidationError),
    Db(DbError),
    NotFound(DraftId),
    DuplicateId(DraftId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "draft not found: {id}"),
            Self::DuplicateId(id) => write!(f, "draft id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::DuplicateId(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DraftValidationError> for RepoError {
    fn from(value: DraftValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConfigValidationError> for RepoError {
    fn from(value: ConfigValidationError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
