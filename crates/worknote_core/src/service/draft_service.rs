//! Draft lifecycle service.
//!
//! # Responsibility
//! - Provide create/update/load/list/delete/save entry points for drafts.
//! - Allocate collision-free draft ids.
//! - Translate repository "not found" into a typed service outcome.
//!
//! # Invariants
//! - `create_draft` never overwrites an existing draft.
//! - `update_draft` strictly advances `updated_at`.
//! - `delete_draft` is idempotent.

use crate::model::draft::{Draft, DraftId, DraftSummary};
use crate::model::knowledge::KnowledgeInput;
use crate::repo::draft_repo::DraftRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 3;

/// Service error for draft use-cases.
#[derive(Debug)]
pub enum DraftServiceError {
    /// Referenced draft does not exist.
    DraftNotFound(DraftId),
    /// Every generated id collided with an existing draft.
    IdAllocationExhausted,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DraftServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DraftNotFound(id) => write!(f, "draft not found: {id}"),
            Self::IdAllocationExhausted => write!(
                f,
                "failed to allocate a unique draft id after {MAX_ID_ATTEMPTS} attempts"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DraftServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::DraftNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftDeletion {
    Removed,
    AlreadyAbsent,
}

/// Draft service facade over repository implementations.
pub struct DraftService<R: DraftRepository> {
    repo: R,
}

impl<R: DraftRepository> DraftService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores `data` as a new draft with a freshly allocated id.
    pub fn create_draft(&self, data: KnowledgeInput) -> Result<Draft, DraftServiceError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let draft = Draft::new(data.clone());
            match self.repo.insert_draft(&draft) {
                Ok(()) => {
                    info!(
                        "event=draft_create module=draft status=ok draft_id={}",
                        draft.id
                    );
                    return Ok(draft);
                }
                Err(RepoError::DuplicateId(id)) => {
                    warn!(
                        "event=draft_create module=draft status=retry attempt={} draft_id={}",
                        attempt, id
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(DraftServiceError::IdAllocationExhausted)
    }

    /// Replaces the data of an existing draft.
    pub fn update_draft(
        &self,
        id: DraftId,
        data: KnowledgeInput,
    ) -> Result<Draft, DraftServiceError> {
        let mut draft = self.load_draft(id)?;
        draft.update(data);
        self.repo.update_draft(&draft)?;
        info!(
            "event=draft_update module=draft status=ok draft_id={} updated_at={}",
            draft.id, draft.updated_at
        );
        Ok(draft)
    }

    /// Loads one draft by id.
    pub fn load_draft(&self, id: DraftId) -> Result<Draft, DraftServiceError> {
        self.repo
            .get_draft(id)?
            .ok_or(DraftServiceError::DraftNotFound(id))
    }

    /// Lists draft summaries, most recently updated first.
    pub fn list_drafts(&self) -> Result<Vec<DraftSummary>, DraftServiceError> {
        let summaries = self.repo.list_drafts()?;
        info!(
            "event=draft_list module=draft status=ok count={}",
            summaries.len()
        );
        Ok(summaries)
    }

    /// Deletes a draft. Deleting an absent id is not an error.
    pub fn delete_draft(&self, id: DraftId) -> Result<DraftDeletion, DraftServiceError> {
        if self.repo.delete_draft(id)? {
            info!("event=draft_delete module=draft status=ok draft_id={id}");
            Ok(DraftDeletion::Removed)
        } else {
            info!("event=draft_delete module=draft status=noop draft_id={id}");
            Ok(DraftDeletion::AlreadyAbsent)
        }
    }

    /// Persists a caller-held draft as a full overwrite.
    pub fn save_draft(&self, draft: &Draft) -> Result<(), DraftServiceError> {
        self.repo.upsert_draft(draft)?;
        info!(
            "event=draft_save module=draft status=ok draft_id={}",
            draft.id
        );
        Ok(())
    }
}
