//! Knowledge submission use-cases.
//!
//! # Responsibility
//! - Gate persistence behind validation.
//! - Hand typed records to the `KnowledgeStore` collaborator.
//! - Clean up the originating draft and the auto-save slot after a commit.
//!
//! # Invariants
//! - Rejected input never reaches the store.
//! - A store failure leaves drafts and the slot untouched.
//! - Cleanup failures are logged and never undo a successful commit.

use crate::model::draft::DraftId;
use crate::model::knowledge::{Category, KnowledgeInput, KnowledgeRecord, Severity};
use crate::repo::draft_repo::DraftRepository;
use crate::repo::knowledge_repo::{KnowledgeStore, SaveReceipt, StoreError};
use crate::repo::snapshot_repo::SnapshotSlot;
use crate::service::autosave_service::AutoSave;
use crate::validation::ValidationResult;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Body text used for sections skipped by quick save.
pub const QUICK_SAVE_PLACEHOLDER: &str = "(クイック保存のため未入力)";

/// Outcome of a submission that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Record stored.
    Committed(SaveReceipt),
    /// Input failed validation; nothing was persisted.
    Rejected(ValidationResult),
}

/// Submission failure after validation passed.
#[derive(Debug)]
pub enum SubmitError {
    Store(StoreError),
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "failed to store knowledge record: {err}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SubmitError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Submission facade over a store, the draft repository and the slot.
pub struct KnowledgeService<K, D, S>
where
    K: KnowledgeStore,
    D: DraftRepository,
    S: SnapshotSlot,
{
    store: K,
    drafts: D,
    autosave: AutoSave<S>,
}

impl<K, D, S> KnowledgeService<K, D, S>
where
    K: KnowledgeStore,
    D: DraftRepository,
    S: SnapshotSlot,
{
    pub fn new(store: K, drafts: D, autosave: AutoSave<S>) -> Self {
        Self {
            store,
            drafts,
            autosave,
        }
    }

    /// Validates and commits `input`.
    ///
    /// When `draft_id` is given, that draft is removed after a successful
    /// commit. The auto-save slot is cleared either way.
    pub fn submit(
        &self,
        input: &KnowledgeInput,
        draft_id: Option<DraftId>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let record = match KnowledgeRecord::try_from_input(input) {
            Ok(record) => record,
            Err(result) => {
                info!(
                    "event=knowledge_submit module=knowledge status=rejected error_count={}",
                    result.errors.len()
                );
                return Ok(SubmitOutcome::Rejected(result));
            }
        };

        let receipt = self.store.commit(&record).map_err(|err| {
            warn!("event=knowledge_submit module=knowledge status=error stage=commit");
            SubmitError::from(err)
        })?;
        info!(
            "event=knowledge_submit module=knowledge status=ok commit_id={} category={} severity={}",
            receipt.commit_id,
            record.category.as_str(),
            record.severity.as_str()
        );

        if let Some(id) = draft_id {
            if let Err(err) = self.drafts.delete_draft(id) {
                warn!(
                    "event=draft_cleanup module=knowledge status=error draft_id={} error={}",
                    id, err
                );
            }
        }
        self.autosave.clear_snapshot();

        Ok(SubmitOutcome::Committed(receipt))
    }

    /// Commits a record with only the header fields filled in.
    pub fn quick_save(
        &self,
        title: &str,
        category: Category,
        severity: Severity,
    ) -> Result<SubmitOutcome, SubmitError> {
        let input = quick_save_input(title, category, severity);
        self.submit(&input, None)
    }

    /// Exposes the auto-save wrapper shared with the form.
    pub fn autosave(&self) -> &AutoSave<S> {
        &self.autosave
    }
}

/// Builds the form input used by quick save.
pub fn quick_save_input(title: &str, category: Category, severity: Severity) -> KnowledgeInput {
    quick_save_raw_input(title, category.as_str(), severity.as_str())
}

/// Quick-save input from unparsed header values, for validating what the
/// quick-input form sent before its enums are known to be valid.
pub fn quick_save_raw_input(title: &str, category: &str, severity: &str) -> KnowledgeInput {
    KnowledgeInput {
        title: Some(title.to_string()),
        category: Some(category.to_string()),
        severity: Some(severity.to_string()),
        symptoms: Some(QUICK_SAVE_PLACEHOLDER.to_string()),
        procedure: Some(QUICK_SAVE_PLACEHOLDER.to_string()),
        ..KnowledgeInput::default()
    }
}
