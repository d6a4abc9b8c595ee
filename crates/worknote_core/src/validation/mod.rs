//! Knowledge form validation.
//!
//! # Responsibility
//! - Judge field-level and record-level validity of `KnowledgeInput`.
//! - Produce user-facing messages in fixed field order.
//!
//! # Invariants
//! - Every check is pure and deterministic; no I/O, no logging.
//! - Each field yields at most one error.
//! - Errors are reported in `KnowledgeField::ALL` order.
//! - "missing" is decided on the trimmed value; length on the raw value.
//! - Optional fields skip checks only when absent or `""`; whitespace still
//!   counts toward their bound.
//! - Length is counted in UTF-16 code units, matching the form UI.

use crate::model::knowledge::{Category, KnowledgeInput, Severity};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 100;
pub const SYMPTOMS_MAX_CHARS: usize = 5_000;
pub const PROCEDURE_MAX_CHARS: usize = 10_000;
pub const NOTES_MAX_CHARS: usize = 5_000;
pub const LINKS_MAX_CHARS: usize = 5_000;

const CATEGORY_VALUES: &[&str] = &["alerts", "maintenance", "ops", "troubleshooting", "inquiry"];
const SEVERITY_VALUES: &[&str] = &["low", "medium", "high", "critical"];

/// Form fields in error-reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnowledgeField {
    Title,
    Category,
    Severity,
    Symptoms,
    Procedure,
    Notes,
    RelatedLinks,
}

impl KnowledgeField {
    pub const ALL: [KnowledgeField; 7] = [
        KnowledgeField::Title,
        KnowledgeField::Category,
        KnowledgeField::Severity,
        KnowledgeField::Symptoms,
        KnowledgeField::Procedure,
        KnowledgeField::Notes,
        KnowledgeField::RelatedLinks,
    ];

    /// Wire name used by the form UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::Severity => "severity",
            Self::Symptoms => "symptoms",
            Self::Procedure => "procedure",
            Self::Notes => "notes",
            Self::RelatedLinks => "relatedLinks",
        }
    }

    /// Label used inside user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "タイトル",
            Self::Category => "カテゴリ",
            Self::Severity => "重要度",
            Self::Symptoms => "症状",
            Self::Procedure => "対応手順",
            Self::Notes => "注意点",
            Self::RelatedLinks => "関連リンク",
        }
    }

    fn value_in(self, input: &KnowledgeInput) -> Option<&str> {
        match self {
            Self::Title => input.title.as_deref(),
            Self::Category => input.category.as_deref(),
            Self::Severity => input.severity.as_deref(),
            Self::Symptoms => input.symptoms.as_deref(),
            Self::Procedure => input.procedure.as_deref(),
            Self::Notes => input.notes.as_deref(),
            Self::RelatedLinks => input.related_links.as_deref(),
        }
    }
}

impl Display for KnowledgeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for KnowledgeField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Machine-readable failure category for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Required value is empty or whitespace-only.
    MissingField,
    /// Value exceeds the field bound.
    FieldTooLong { max_chars: usize },
    /// Non-empty value outside the field's closed set.
    InvalidEnumValue,
}

/// One failing field with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: KnowledgeField,
    #[serde(skip)]
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(field: KnowledgeField, kind: FieldErrorKind) -> Self {
        let message = message_for(field, kind);
        Self {
            field,
            kind,
            message,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Aggregate validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns the error reported for `field`, if any.
    pub fn error_for(&self, field: KnowledgeField) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    field: KnowledgeField,
    required: bool,
    max_chars: Option<usize>,
    allowed: Option<&'static [&'static str]>,
}

impl FieldRule {
    fn check(&self, value: Option<&str>) -> Option<FieldError> {
        let value = value.unwrap_or("");

        if self.required && value.trim().is_empty() {
            return Some(FieldError::new(self.field, FieldErrorKind::MissingField));
        }
        if value.is_empty() {
            return None;
        }

        if let Some(max_chars) = self.max_chars {
            if utf16_len(value) > max_chars {
                return Some(FieldError::new(
                    self.field,
                    FieldErrorKind::FieldTooLong { max_chars },
                ));
            }
        }

        if let Some(allowed) = self.allowed {
            if !allowed.contains(&value) {
                return Some(FieldError::new(
                    self.field,
                    FieldErrorKind::InvalidEnumValue,
                ));
            }
        }

        None
    }
}

static RULES: [FieldRule; 7] = [
    FieldRule {
        field: KnowledgeField::Title,
        required: true,
        max_chars: Some(TITLE_MAX_CHARS),
        allowed: None,
    },
    FieldRule {
        field: KnowledgeField::Category,
        required: true,
        max_chars: None,
        allowed: Some(CATEGORY_VALUES),
    },
    FieldRule {
        field: KnowledgeField::Severity,
        required: true,
        max_chars: None,
        allowed: Some(SEVERITY_VALUES),
    },
    FieldRule {
        field: KnowledgeField::Symptoms,
        required: true,
        max_chars: Some(SYMPTOMS_MAX_CHARS),
        allowed: None,
    },
    FieldRule {
        field: KnowledgeField::Procedure,
        required: true,
        max_chars: Some(PROCEDURE_MAX_CHARS),
        allowed: None,
    },
    FieldRule {
        field: KnowledgeField::Notes,
        required: false,
        max_chars: Some(NOTES_MAX_CHARS),
        allowed: None,
    },
    FieldRule {
        field: KnowledgeField::RelatedLinks,
        required: false,
        max_chars: Some(LINKS_MAX_CHARS),
        allowed: None,
    },
];

/// Length as the form UI measures it (UTF-16 code units).
fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn rule_for(field: KnowledgeField) -> &'static FieldRule {
    // RULES is indexed in KnowledgeField::ALL order.
    &RULES[field as usize]
}

fn message_for(field: KnowledgeField, kind: FieldErrorKind) -> String {
    match (field, kind) {
        (KnowledgeField::Category | KnowledgeField::Severity, FieldErrorKind::MissingField) => {
            format!("{}を選択してください", field.label())
        }
        (_, FieldErrorKind::MissingField) => format!("{}は必須です", field.label()),
        (_, FieldErrorKind::FieldTooLong { max_chars }) => {
            format!("{}は{}文字以内で入力してください", field.label(), max_chars)
        }
        (_, FieldErrorKind::InvalidEnumValue) => format!("無効な{}です", field.label()),
    }
}

pub fn validate_title(title: &str) -> Option<FieldError> {
    rule_for(KnowledgeField::Title).check(Some(title))
}

pub fn validate_category(category: &str) -> Option<FieldError> {
    rule_for(KnowledgeField::Category).check(Some(category))
}

pub fn validate_severity(severity: &str) -> Option<FieldError> {
    rule_for(KnowledgeField::Severity).check(Some(severity))
}

pub fn validate_symptoms(symptoms: &str) -> Option<FieldError> {
    rule_for(KnowledgeField::Symptoms).check(Some(symptoms))
}

pub fn validate_procedure(procedure: &str) -> Option<FieldError> {
    rule_for(KnowledgeField::Procedure).check(Some(procedure))
}

pub fn validate_notes(notes: Option<&str>) -> Option<FieldError> {
    rule_for(KnowledgeField::Notes).check(notes)
}

pub fn validate_links(related_links: Option<&str>) -> Option<FieldError> {
    rule_for(KnowledgeField::RelatedLinks).check(related_links)
}

/// Validates a whole (possibly partial) form.
///
/// Absent fields are treated as empty. The result lists every failing field
/// in `KnowledgeField::ALL` order.
pub fn validate_knowledge_input(input: &KnowledgeInput) -> ValidationResult {
    let errors = RULES
        .iter()
        .filter_map(|rule| rule.check(rule.field.value_in(input)))
        .collect();
    ValidationResult::from_errors(errors)
}

/// Returns the closed category set accepted by validation.
pub fn allowed_categories() -> &'static [&'static str] {
    CATEGORY_VALUES
}

/// Returns the closed severity set accepted by validation.
pub fn allowed_severities() -> &'static [&'static str] {
    SEVERITY_VALUES
}

// Keep the string tables aligned with the typed enums.
const _: () = assert!(CATEGORY_VALUES.len() == Category::ALL.len());
const _: () = assert!(SEVERITY_VALUES.len() == Severity::ALL.len());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_follow_field_order() {
        for (index, field) in KnowledgeField::ALL.into_iter().enumerate() {
            assert_eq!(RULES[index].field, field);
        }
    }

    #[test]
    fn enum_tables_match_typed_enums() {
        for category in Category::ALL {
            assert!(allowed_categories().contains(&category.as_str()));
        }
        for severity in Severity::ALL {
            assert!(allowed_severities().contains(&severity.as_str()));
        }
    }

    #[test]
    fn compliant_values_pass_every_validator() {
        assert_eq!(validate_title("Disk full on db-01"), None);
        assert_eq!(validate_category("maintenance"), None);
        assert_eq!(validate_severity("critical"), None);
        assert_eq!(validate_symptoms("disk usage at 100%"), None);
        assert_eq!(validate_procedure("rotate logs"), None);
        assert_eq!(validate_notes(Some("check backups first")), None);
        assert_eq!(validate_links(Some("https://example.com")), None);
    }

    #[test]
    fn optional_fields_accept_absence_and_blank() {
        assert_eq!(validate_notes(None), None);
        assert_eq!(validate_notes(Some("")), None);
        assert_eq!(validate_links(None), None);
        assert_eq!(validate_links(Some("   ")), None);
    }

    #[test]
    fn whitespace_and_empty_required_values_are_missing() {
        for value in ["", "   ", "\n\t "] {
            let error = validate_title(value).expect("title should be missing");
            assert_eq!(error.kind, FieldErrorKind::MissingField);
            assert_eq!(error.message, "タイトルは必須です");

            let error = validate_symptoms(value).expect("symptoms should be missing");
            assert_eq!(error.message, "症状は必須です");

            let error = validate_procedure(value).expect("procedure should be missing");
            assert_eq!(error.message, "対応手順は必須です");
        }
    }

    #[test]
    fn bounds_accept_n_and_reject_n_plus_one() {
        let cases: [(fn(&str) -> Option<FieldError>, usize); 3] = [
            (validate_title, TITLE_MAX_CHARS),
            (validate_symptoms, SYMPTOMS_MAX_CHARS),
            (validate_procedure, PROCEDURE_MAX_CHARS),
        ];
        for (validator, bound) in cases {
            assert_eq!(validator(&"a".repeat(bound)), None);
            let error = validator(&"a".repeat(bound + 1)).expect("over bound");
            assert_eq!(error.kind, FieldErrorKind::FieldTooLong { max_chars: bound });
        }

        assert_eq!(validate_notes(Some(&"n".repeat(NOTES_MAX_CHARS))), None);
        let error = validate_notes(Some(&"n".repeat(NOTES_MAX_CHARS + 1))).expect("over bound");
        assert_eq!(error.message, "注意点は5000文字以内で入力してください");

        assert_eq!(validate_links(Some(&"l".repeat(LINKS_MAX_CHARS))), None);
        let error = validate_links(Some(&"l".repeat(LINKS_MAX_CHARS + 1))).expect("over bound");
        assert_eq!(error.field, KnowledgeField::RelatedLinks);
        assert_eq!(error.message, "関連リンクは5000文字以内で入力してください");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(validate_title(&"障".repeat(TITLE_MAX_CHARS)), None);
        let error = validate_title(&"障".repeat(TITLE_MAX_CHARS + 1)).expect("over bound");
        assert_eq!(error.message, "タイトルは100文字以内で入力してください");
    }

    #[test]
    fn length_counts_utf16_units() {
        // Each emoji is a surrogate pair.
        assert_eq!(validate_title(&"😀".repeat(TITLE_MAX_CHARS / 2)), None);
        let error = validate_title(&format!("{}a", "😀".repeat(TITLE_MAX_CHARS / 2)))
            .expect("101 units is over bound");
        assert_eq!(error.kind, FieldErrorKind::FieldTooLong { max_chars: TITLE_MAX_CHARS });
        assert!(validate_title(&"😀".repeat(60)).is_some());
    }

    #[test]
    fn whitespace_only_optional_values_are_length_checked() {
        let error = validate_notes(Some(&" ".repeat(NOTES_MAX_CHARS + 1)))
            .expect("blank notes over bound");
        assert_eq!(error.kind, FieldErrorKind::FieldTooLong { max_chars: NOTES_MAX_CHARS });
        let error = validate_links(Some(&"\n".repeat(LINKS_MAX_CHARS + 1)))
            .expect("blank links over bound");
        assert_eq!(error.field, KnowledgeField::RelatedLinks);
        assert_eq!(validate_notes(Some(&" ".repeat(NOTES_MAX_CHARS))), None);

        let result = validate_knowledge_input(&KnowledgeInput {
            title: Some("ok".to_string()),
            category: Some("alerts".to_string()),
            severity: Some("low".to_string()),
            symptoms: Some("s".to_string()),
            procedure: Some("p".to_string()),
            notes: Some(" ".repeat(NOTES_MAX_CHARS + 1)),
            ..KnowledgeInput::default()
        });
        assert!(!result.valid);
        assert!(result.error_for(KnowledgeField::Notes).is_some());
    }

    #[test]
    fn length_is_checked_on_untrimmed_value() {
        let padded = format!("{}  ", "a".repeat(TITLE_MAX_CHARS));
        let error = validate_title(&padded).expect("padding counts toward bound");
        assert!(matches!(error.kind, FieldErrorKind::FieldTooLong { .. }));
    }

    #[test]
    fn enum_missing_and_invalid_are_distinct() {
        let error = validate_category("bogus").expect("invalid category");
        assert_eq!(error.kind, FieldErrorKind::InvalidEnumValue);
        assert_eq!(error.message, "無効なカテゴリです");

        let error = validate_category("").expect("missing category");
        assert_eq!(error.kind, FieldErrorKind::MissingField);
        assert_eq!(error.message, "カテゴリを選択してください");

        let error = validate_severity("urgent").expect("invalid severity");
        assert_eq!(error.message, "無効な重要度です");

        let error = validate_severity("").expect("missing severity");
        assert_eq!(error.message, "重要度を選択してください");
    }

    #[test]
    fn enum_membership_is_exact() {
        assert!(validate_category("Alerts").is_some());
        assert!(validate_severity(" high").is_some());
        assert_eq!(validate_category("inquiry"), None);
        assert_eq!(validate_category("ops"), None);
    }

    #[test]
    fn empty_input_reports_required_fields_in_order() {
        let result = validate_knowledge_input(&KnowledgeInput::default());
        assert!(!result.valid);
        let fields: Vec<_> = result.errors.iter().map(|error| error.field).collect();
        assert_eq!(
            fields,
            vec![
                KnowledgeField::Title,
                KnowledgeField::Category,
                KnowledgeField::Severity,
                KnowledgeField::Symptoms,
                KnowledgeField::Procedure,
            ]
        );
        assert!(result
            .errors
            .iter()
            .all(|error| error.kind == FieldErrorKind::MissingField));
    }

    #[test]
    fn single_missing_title_yields_single_error() {
        let input = KnowledgeInput {
            title: Some(String::new()),
            category: Some("alerts".to_string()),
            severity: Some("high".to_string()),
            symptoms: Some("disk full".to_string()),
            procedure: Some("restart service".to_string()),
            ..KnowledgeInput::default()
        };

        let result = validate_knowledge_input(&input);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_str(), "title");
        assert_eq!(result.errors[0].message, "タイトルは必須です");
    }

    #[test]
    fn validation_is_repeatable() {
        let input = KnowledgeInput {
            category: Some("bogus".to_string()),
            notes: Some("x".repeat(NOTES_MAX_CHARS + 1)),
            ..KnowledgeInput::default()
        };
        assert_eq!(
            validate_knowledge_input(&input),
            validate_knowledge_input(&input)
        );
    }

    #[test]
    fn result_serializes_field_and_message_only() {
        let result = validate_knowledge_input(&KnowledgeInput {
            title: Some("ok".to_string()),
            category: Some("alerts".to_string()),
            severity: Some("low".to_string()),
            symptoms: Some("s".to_string()),
            procedure: Some("p".to_string()),
            related_links: Some("l".repeat(LINKS_MAX_CHARS + 1)),
            ..KnowledgeInput::default()
        });
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["field"], "relatedLinks");
        assert!(json["errors"][0].get("kind").is_none());
    }
}
