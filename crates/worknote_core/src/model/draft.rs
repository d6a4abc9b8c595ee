//! Draft domain model.
//!
//! # Responsibility
//! - Define the identified, persisted in-progress record (`Draft`).
//! - Own timestamp rules for draft creation and mutation.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `created_at` is set once; `updated_at >= created_at`.
//! - Every mutation moves `updated_at` strictly forward.

use crate::model::knowledge::KnowledgeInput;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable draft identifier.
pub type DraftId = Uuid;

/// Persisted in-progress knowledge record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: DraftId,
    pub data: KnowledgeInput,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Draft {
    /// Creates a draft with a fresh id, stamped with the current time.
    pub fn new(data: KnowledgeInput) -> Self {
        Self::with_id(Uuid::new_v4(), data)
    }

    /// Creates a draft with a caller-provided id.
    ///
    /// Used when id allocation has to retry on collision.
    pub fn with_id(id: DraftId, data: KnowledgeInput) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces draft data and advances `updated_at`.
    pub fn update(&mut self, data: KnowledgeInput) {
        self.data = data;
        self.touch();
    }

    /// Advances `updated_at` to now, or one millisecond past the previous
    /// value when the clock has not moved.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms().max(self.updated_at.saturating_add(1));
    }

    /// Validates timestamp ordering before persistence.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.updated_at < self.created_at {
            return Err(DraftValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Summary projection for draft pickers.
    pub fn summary(&self) -> DraftSummary {
        DraftSummary::from(self)
    }
}

/// Draft list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub id: DraftId,
    pub title: String,
    pub category: String,
    pub updated_at: i64,
}

impl From<&Draft> for DraftSummary {
    fn from(draft: &Draft) -> Self {
        Self {
            id: draft.id,
            title: draft.data.title_or_empty().to_string(),
            category: draft.data.category_or_empty().to_string(),
            updated_at: draft.updated_at,
        }
    }
}

/// Draft invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "draft updated_at ({updated_at}) is earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for DraftValidationError {}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
