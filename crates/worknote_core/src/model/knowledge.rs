//! Knowledge record domain model.
//!
//! # Responsibility
//! - Define the in-progress form shape (`KnowledgeInput`) shared by drafts,
//!   the auto-save slot and validation.
//! - Define the finalized, typed record (`KnowledgeRecord`) that only exists
//!   after validation succeeded.
//!
//! # Invariants
//! - `Category` and `Severity` are closed sets; their wire strings are fixed.
//! - A `KnowledgeRecord` is never constructed from unvalidated input.
//!
//! # See also
//! - crate::validation

use crate::validation::{validate_knowledge_input, ValidationResult};
use serde::{Deserialize, Serialize};

/// Incident category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Alerts,
    Maintenance,
    Ops,
    Troubleshooting,
    Inquiry,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Alerts,
        Category::Maintenance,
        Category::Ops,
        Category::Troubleshooting,
        Category::Inquiry,
    ];

    /// Stable wire/storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alerts => "alerts",
            Self::Maintenance => "maintenance",
            Self::Ops => "ops",
            Self::Troubleshooting => "troubleshooting",
            Self::Inquiry => "inquiry",
        }
    }

    /// Parses an exact wire string. No trimming or case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

/// Incident severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities from lowest to highest.
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Stable wire/storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses an exact wire string. No trimming or case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|severity| severity.as_str() == value)
    }
}

/// In-progress form state.
///
/// Every field may be absent because the form is captured while the user is
/// still typing. Enum fields stay raw text here so that unknown values can be
/// reported by validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_links: Option<String>,
    /// JSON-encoded per-category judgment criteria. Not validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgment: Option<String>,
}

impl KnowledgeInput {
    /// Returns the title, or an empty string when absent.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Returns the raw category text, or an empty string when absent.
    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// Finalized knowledge record with typed enum fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRecord {
    pub title: String,
    pub category: Category,
    pub severity: Severity,
    pub symptoms: String,
    pub procedure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_links: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgment: Option<String>,
}

impl KnowledgeRecord {
    /// Converts form input into a typed record.
    ///
    /// Returns the full `ValidationResult` when any field fails, so callers
    /// can render every failing field at once.
    pub fn try_from_input(input: &KnowledgeInput) -> Result<Self, ValidationResult> {
        let result = validate_knowledge_input(input);
        if !result.valid {
            return Err(result);
        }

        // Validation guarantees both enum fields parse.
        match (
            Category::parse(input.category_or_empty()),
            Severity::parse(input.severity.as_deref().unwrap_or("")),
        ) {
            (Some(category), Some(severity)) => Ok(Self {
                title: input.title_or_empty().to_string(),
                category,
                severity,
                symptoms: input.symptoms.clone().unwrap_or_default(),
                procedure: input.procedure.clone().unwrap_or_default(),
                notes: input.notes.clone().filter(|value| !value.is_empty()),
                related_links: input.related_links.clone().filter(|value| !value.is_empty()),
                judgment: input.judgment.clone().filter(|value| !value.is_empty()),
            }),
            _ => Err(result),
        }
    }

    /// Projects this record back into form shape.
    pub fn to_input(&self) -> KnowledgeInput {
        KnowledgeInput {
            title: Some(self.title.clone()),
            category: Some(self.category.as_str().to_string()),
            severity: Some(self.severity.as_str().to_string()),
            symptoms: Some(self.symptoms.clone()),
            procedure: Some(self.procedure.clone()),
            notes: self.notes.clone(),
            related_links: self.related_links.clone(),
            judgment: self.judgment.clone(),
        }
    }
}
