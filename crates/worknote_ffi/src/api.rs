//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose validation, draft, preview, auto-save, submission and config
//!   use-cases to Dart via FRB.
//! - Map every core failure to one `ErrorInfo { error_type, message }`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Validation failures travel as data, never as `ErrorInfo`.
//! - Each call opens its own connection; nothing is cached but the DB path.

use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;
use worknote_core::db::open_db;
use worknote_core::export::markdown::render_preview_today;
use worknote_core::service::knowledge_service::quick_save_raw_input;
use worknote_core::validation::{
    allowed_categories, allowed_severities, validate_category, validate_links, validate_notes,
    validate_procedure, validate_severity, validate_symptoms, validate_title,
};
use worknote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, validate_knowledge_input,
    AutoSave, Category, Config, ConfigRepository, Draft, DraftDeletion, DraftService,
    DraftServiceError, DraftSummary, ExportOptions, FieldError, KnowledgeInput, KnowledgeService,
    RepoError, SaveReceipt, Severity, SqliteConfigRepository, SqliteDraftRepository,
    SqliteKnowledgeStore, SqliteSnapshotSlot, SubmitOutcome, ValidationResult,
};

const DB_FILE_NAME: &str = "worknote.sqlite3";
const DB_PATH_ENV: &str = "WORKNOTE_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

const ERROR_VALIDATION: &str = "ValidationError";
const ERROR_DRAFT_NOT_FOUND: &str = "DraftNotFound";
const ERROR_FILE: &str = "FileError";
const ERROR_CONFIG: &str = "ConfigError";

/// Error payload shared by every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// One of `ValidationError|DraftNotFound|FileError|ConfigError`.
    pub error_type: String,
    pub message: String,
}

impl ErrorInfo {
    fn new(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.to_string(),
            message: message.into(),
        }
    }

    fn file(message: impl Into<String>) -> Self {
        Self::new(ERROR_FILE, message)
    }
}

impl From<DraftServiceError> for ErrorInfo {
    fn from(value: DraftServiceError) -> Self {
        match value {
            DraftServiceError::DraftNotFound(id) => {
                Self::new(ERROR_DRAFT_NOT_FOUND, format!("draft not found: {id}"))
            }
            other => Self::file(other.to_string()),
        }
    }
}

impl From<RepoError> for ErrorInfo {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Config(err) => Self::new(ERROR_CONFIG, err.to_string()),
            RepoError::NotFound(id) => {
                Self::new(ERROR_DRAFT_NOT_FOUND, format!("draft not found: {id}"))
            }
            other => Self::file(other.to_string()),
        }
    }
}

/// Form fields as sent by the UI. Absent means "not typed yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub symptoms: Option<String>,
    pub procedure: Option<String>,
    pub notes: Option<String>,
    pub related_links: Option<String>,
    pub judgment: Option<String>,
}

impl From<KnowledgeForm> for KnowledgeInput {
    fn from(form: KnowledgeForm) -> Self {
        Self {
            title: form.title,
            category: form.category,
            severity: form.severity,
            symptoms: form.symptoms,
            procedure: form.procedure,
            notes: form.notes,
            related_links: form.related_links,
            judgment: form.judgment,
        }
    }
}

impl From<KnowledgeInput> for KnowledgeForm {
    fn from(input: KnowledgeInput) -> Self {
        Self {
            title: input.title,
            category: input.category,
            severity: input.severity,
            symptoms: input.symptoms,
            procedure: input.procedure,
            notes: input.notes,
            related_links: input.related_links,
            judgment: input.judgment,
        }
    }
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorItem {
    /// Wire field name, e.g. `title` or `relatedLinks`.
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorItem {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field.as_str().to_string(),
            message: error.message,
        }
    }
}

/// Validation outcome for a whole form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<FieldErrorItem>,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        Self {
            valid: result.valid,
            errors: result.errors.into_iter().map(FieldErrorItem::from).collect(),
        }
    }
}

/// Draft as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    pub id: String,
    pub data: KnowledgeForm,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Draft> for DraftItem {
    fn from(draft: Draft) -> Self {
        Self {
            id: draft.id.to_string(),
            data: draft.data.into(),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }
}

/// Draft picker row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSummaryItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub updated_at: i64,
}

impl From<DraftSummary> for DraftSummaryItem {
    fn from(summary: DraftSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title,
            category: summary.category,
            updated_at: summary.updated_at,
        }
    }
}

/// Envelope for single-draft operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftResponse {
    pub ok: bool,
    pub draft: Option<DraftItem>,
    pub error: Option<ErrorInfo>,
}

impl DraftResponse {
    fn from_result(result: Result<Draft, ErrorInfo>) -> Self {
        match result {
            Ok(draft) => Self {
                ok: true,
                draft: Some(draft.into()),
                error: None,
            },
            Err(error) => Self {
                ok: false,
                draft: None,
                error: Some(error),
            },
        }
    }
}

/// Envelope for draft listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftListResponse {
    pub ok: bool,
    pub items: Vec<DraftSummaryItem>,
    pub error: Option<ErrorInfo>,
}

/// Envelope for draft deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDeleteResponse {
    pub ok: bool,
    /// `false` when the draft was already absent.
    pub removed: bool,
    pub error: Option<ErrorInfo>,
}

/// Commit receipt as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceiptItem {
    pub commit_id: String,
    pub location: String,
    pub pr_url: Option<String>,
}

impl From<SaveReceipt> for SaveReceiptItem {
    fn from(receipt: SaveReceipt) -> Self {
        Self {
            commit_id: receipt.commit_id,
            location: receipt.location,
            pr_url: receipt.pr_url,
        }
    }
}

/// Envelope for submission.
///
/// Exactly one of `receipt`, `validation` (with `valid == false`) or `error`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub ok: bool,
    pub receipt: Option<SaveReceiptItem>,
    pub validation: Option<ValidationResponse>,
    pub error: Option<ErrorInfo>,
}

impl SubmitResponse {
    fn failure(error: ErrorInfo) -> Self {
        Self {
            ok: false,
            receipt: None,
            validation: None,
            error: Some(error),
        }
    }
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Committed(receipt) => Self {
                ok: true,
                receipt: Some(receipt.into()),
                validation: None,
                error: None,
            },
            SubmitOutcome::Rejected(result) => Self {
                ok: false,
                receipt: None,
                validation: Some(result.into()),
                error: None,
            },
        }
    }
}

/// Envelope for config load/save. The config travels as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResponse {
    pub ok: bool,
    pub config_json: Option<String>,
    pub error: Option<ErrorInfo>,
}

impl ConfigResponse {
    fn from_result(result: Result<Config, ErrorInfo>) -> Self {
        let serialized = result.and_then(|config| {
            serde_json::to_string(&config)
                .map_err(|err| ErrorInfo::new(ERROR_CONFIG, format!("config encode failed: {err}")))
        });
        match serialized {
            Ok(json) => Self {
                ok: true,
                config_json: Some(json),
                error: None,
            },
            Err(error) => Self {
                ok: false,
                config_json: None,
                error: Some(error),
            },
        }
    }
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Category wire values in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn knowledge_categories() -> Vec<String> {
    allowed_categories().iter().map(|value| value.to_string()).collect()
}

/// Severity wire values from lowest to highest.
#[flutter_rust_bridge::frb(sync)]
pub fn knowledge_severities() -> Vec<String> {
    allowed_severities().iter().map(|value| value.to_string()).collect()
}

/// Validates a whole form.
///
/// # FFI contract
/// - Pure; no storage access.
/// - Errors are listed in fixed field order.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_knowledge(form: KnowledgeForm) -> ValidationResponse {
    validate_knowledge_input(&form.into()).into()
}

/// Validates one field for as-you-type feedback.
///
/// `field` uses wire names (`title`, `category`, `severity`, `symptoms`,
/// `procedure`, `notes`, `relatedLinks`). Returns `None` when the value passes.
/// Unknown field names always yield an error item.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_field(field: String, value: Option<String>) -> Option<FieldErrorItem> {
    let raw = value.as_deref();
    let text = raw.unwrap_or("");
    let error = match field.as_str() {
        "title" => validate_title(text),
        "category" => validate_category(text),
        "severity" => validate_severity(text),
        "symptoms" => validate_symptoms(text),
        "procedure" => validate_procedure(text),
        "notes" => validate_notes(raw),
        "relatedLinks" => validate_links(raw),
        _ => {
            let message = format!("unknown field `{field}`");
            return Some(FieldErrorItem { field, message });
        }
    };
    error.map(FieldErrorItem::from)
}

/// Creates a draft from the current form.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_create(form: KnowledgeForm) -> DraftResponse {
    DraftResponse::from_result(with_drafts(|service| {
        service.create_draft(form.into()).map_err(ErrorInfo::from)
    }))
}

/// Replaces the data of an existing draft.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_update(id: String, form: KnowledgeForm) -> DraftResponse {
    DraftResponse::from_result(parse_draft_id(&id).and_then(|id| {
        with_drafts(|service| service.update_draft(id, form.into()).map_err(ErrorInfo::from))
    }))
}

/// Loads one draft.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_load(id: String) -> DraftResponse {
    DraftResponse::from_result(parse_draft_id(&id).and_then(|id| {
        with_drafts(|service| service.load_draft(id).map_err(ErrorInfo::from))
    }))
}

/// Overwrites or inserts a draft exactly as the caller holds it.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_save(draft: DraftItem) -> DraftResponse {
    DraftResponse::from_result(parse_draft_id(&draft.id).and_then(|id| {
        let draft = Draft {
            id,
            data: draft.data.into(),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        };
        with_drafts(|service| service.save_draft(&draft).map_err(ErrorInfo::from))?;
        Ok(draft)
    }))
}

/// Lists drafts, most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_list() -> DraftListResponse {
    match with_drafts(|service| service.list_drafts().map_err(ErrorInfo::from)) {
        Ok(summaries) => DraftListResponse {
            ok: true,
            items: summaries.into_iter().map(DraftSummaryItem::from).collect(),
            error: None,
        },
        Err(error) => DraftListResponse {
            ok: false,
            items: Vec::new(),
            error: Some(error),
        },
    }
}

/// Deletes a draft. Deleting an absent draft succeeds with `removed=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_delete(id: String) -> DraftDeleteResponse {
    let deleted = parse_draft_id(&id).and_then(|id| {
        with_drafts(|service| service.delete_draft(id).map_err(ErrorInfo::from))
    });
    match deleted {
        Ok(deletion) => DraftDeleteResponse {
            ok: true,
            removed: deletion == DraftDeletion::Removed,
            error: None,
        },
        Err(error) => DraftDeleteResponse {
            ok: false,
            removed: false,
            error: Some(error),
        },
    }
}

/// Renders the form as it would be exported, dated today, without author.
#[flutter_rust_bridge::frb(sync)]
pub fn markdown_preview(form: KnowledgeForm) -> String {
    render_preview_today(&form.into())
}

/// Stores the form in the auto-save slot. Failures are logged only.
#[flutter_rust_bridge::frb(sync)]
pub fn autosave_save(form: KnowledgeForm) {
    with_autosave(|autosave| autosave.save_snapshot(&form.into()));
}

/// Returns the auto-saved form, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn autosave_load() -> Option<KnowledgeForm> {
    with_autosave(|autosave| autosave.load_snapshot())
        .flatten()
        .map(KnowledgeForm::from)
}

/// Empties the auto-save slot. Failures are logged only.
#[flutter_rust_bridge::frb(sync)]
pub fn autosave_clear() {
    with_autosave(|autosave| autosave.clear_snapshot());
}

/// Validates and commits the form, then removes `draft_id` and the slot.
#[flutter_rust_bridge::frb(sync)]
pub fn knowledge_submit(form: KnowledgeForm, draft_id: Option<String>) -> SubmitResponse {
    let draft_id = match draft_id.as_deref().map(parse_draft_id).transpose() {
        Ok(draft_id) => draft_id,
        Err(error) => return SubmitResponse::failure(error),
    };
    let input = KnowledgeInput::from(form);
    submit_with(|service| service.submit(&input, draft_id))
}

/// Commits a record with only title, category and severity filled in.
#[flutter_rust_bridge::frb(sync)]
pub fn knowledge_quick_save(title: String, category: String, severity: String) -> SubmitResponse {
    match (Category::parse(&category), Severity::parse(&severity)) {
        (Some(category), Some(severity)) => {
            submit_with(|service| service.quick_save(&title, category, severity))
        }
        _ => {
            let input = quick_save_raw_input(&title, &category, &severity);
            SubmitResponse::from(SubmitOutcome::Rejected(validate_knowledge_input(&input)))
        }
    }
}

/// Loads the stored app config, or defaults when none was saved.
#[flutter_rust_bridge::frb(sync)]
pub fn config_load() -> ConfigResponse {
    ConfigResponse::from_result(with_connection(|conn| {
        let repo = SqliteConfigRepository::try_new(conn)?;
        repo.load_config().map_err(ErrorInfo::from)
    }))
}

/// Validates and stores an app config given as camelCase JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn config_save(config_json: String) -> ConfigResponse {
    let config: Config = match serde_json::from_str(&config_json) {
        Ok(config) => config,
        Err(err) => {
            return ConfigResponse::from_result(Err(ErrorInfo::new(
                ERROR_CONFIG,
                format!("config decode failed: {err}"),
            )))
        }
    };
    ConfigResponse::from_result(with_connection(|conn| {
        let repo = SqliteConfigRepository::try_new(conn)?;
        repo.save_config(&config)?;
        Ok(config)
    }))
}

fn parse_draft_id(raw: &str) -> Result<Uuid, ErrorInfo> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ErrorInfo::new(ERROR_VALIDATION, format!("invalid draft id `{raw}`")))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_connection<T>(
    f: impl FnOnce(&Connection) -> Result<T, ErrorInfo>,
) -> Result<T, ErrorInfo> {
    let conn = open_db(resolve_db_path())
        .map_err(|err| ErrorInfo::file(format!("database open failed: {err}")))?;
    f(&conn)
}

fn with_drafts<T>(
    f: impl FnOnce(&DraftService<SqliteDraftRepository<'_>>) -> Result<T, ErrorInfo>,
) -> Result<T, ErrorInfo> {
    with_connection(|conn| {
        let service = DraftService::new(SqliteDraftRepository::try_new(conn)?);
        f(&service)
    })
}

fn with_autosave<T>(f: impl FnOnce(&AutoSave<SqliteSnapshotSlot<'_>>) -> T) -> Option<T> {
    let opened = with_connection(|conn| {
        let slot = SqliteSnapshotSlot::try_new(conn)?;
        Ok(f(&AutoSave::new(slot)))
    });
    match opened {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(
                "event=autosave_open module=ffi status=error error_type={} error={}",
                error.error_type, error.message
            );
            None
        }
    }
}

type SqliteKnowledgeService<'conn> = KnowledgeService<
    SqliteKnowledgeStore<'conn>,
    SqliteDraftRepository<'conn>,
    SqliteSnapshotSlot<'conn>,
>;

fn submit_with(
    f: impl FnOnce(&SqliteKnowledgeService<'_>) -> Result<SubmitOutcome, worknote_core::SubmitError>,
) -> SubmitResponse {
    let submitted = with_connection(|conn| {
        let config = SqliteConfigRepository::try_new(conn)?.load_config()?;
        let options = ExportOptions {
            save_path: config.git.save_path.clone(),
            author: config.author_name().map(str::to_string),
        };
        let service = KnowledgeService::new(
            SqliteKnowledgeStore::try_new(conn, options)?,
            SqliteDraftRepository::try_new(conn)?,
            AutoSave::new(SqliteSnapshotSlot::try_new(conn)?),
        );
        f(&service).map_err(|err| ErrorInfo::file(err.to_string()))
    });
    match submitted {
        Ok(outcome) => outcome.into(),
        Err(error) => SubmitResponse::failure(error),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        autosave_clear, autosave_load, autosave_save, config_load, config_save, core_version,
        draft_create, draft_delete, draft_list, draft_load, draft_save, draft_update,
        init_logging, knowledge_categories, knowledge_quick_save, knowledge_severities,
        knowledge_submit, markdown_preview, validate_field, validate_knowledge, DraftItem,
        KnowledgeForm,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    fn complete_form(title: &str) -> KnowledgeForm {
        KnowledgeForm {
            title: Some(title.to_string()),
            category: Some("alerts".to_string()),
            severity: Some("high".to_string()),
            symptoms: Some("disk full".to_string()),
            procedure: Some("restart service".to_string()),
            ..KnowledgeForm::default()
        }
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn enum_lists_are_fixed() {
        assert_eq!(
            knowledge_categories(),
            vec!["alerts", "maintenance", "ops", "troubleshooting", "inquiry"]
        );
        assert_eq!(knowledge_severities(), vec!["low", "medium", "high", "critical"]);
    }

    #[test]
    fn validate_knowledge_reports_fields_in_order() {
        let response = validate_knowledge(KnowledgeForm::default());
        assert!(!response.valid);
        let fields: Vec<&str> = response.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "category", "severity", "symptoms", "procedure"]
        );

        let mut form = complete_form("");
        form.related_links = Some("x".repeat(5_001));
        let response = validate_knowledge(form);
        let fields: Vec<&str> = response.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "relatedLinks"]);
        assert_eq!(response.errors[0].message, "タイトルは必須です");
    }

    #[test]
    fn validate_field_uses_wire_names() {
        assert_eq!(validate_field("title".to_string(), Some("ok".to_string())), None);
        let error = validate_field("category".to_string(), Some("bogus".to_string()))
            .expect("invalid category");
        assert_eq!(error.field, "category");
        assert_eq!(validate_field("notes".to_string(), None), None);
        assert!(validate_field("nope".to_string(), None).is_some());
    }

    #[test]
    fn draft_lifecycle_through_envelopes() {
        let title = unique_token("ffi-draft");
        let created = draft_create(KnowledgeForm {
            title: Some(title.clone()),
            ..KnowledgeForm::default()
        });
        assert!(created.ok, "{:?}", created.error);
        let draft = created.draft.expect("created draft");
        assert_eq!(draft.created_at, draft.updated_at);

        let updated = draft_update(draft.id.clone(), complete_form(&title));
        assert!(updated.ok, "{:?}", updated.error);
        let updated_draft = updated.draft.expect("updated draft");
        assert!(updated_draft.updated_at > draft.updated_at);

        let loaded = draft_load(draft.id.clone());
        assert_eq!(loaded.draft, Some(updated_draft.clone()));
        assert!(draft_list().items.iter().any(|item| item.id == draft.id));

        let held = DraftItem {
            data: KnowledgeForm {
                notes: Some("held by caller".to_string()),
                ..updated_draft.data.clone()
            },
            updated_at: updated_draft.updated_at + 1,
            ..updated_draft
        };
        let saved = draft_save(held.clone());
        assert!(saved.ok, "{:?}", saved.error);
        assert_eq!(saved.draft.as_ref(), Some(&held));
        assert_eq!(draft_load(draft.id.clone()).draft, Some(held));

        let reversed = draft_save(DraftItem {
            id: draft.id.clone(),
            data: KnowledgeForm::default(),
            created_at: 10,
            updated_at: 5,
        });
        assert!(!reversed.ok);
        let bad_id = draft_save(DraftItem {
            id: "not-a-uuid".to_string(),
            data: KnowledgeForm::default(),
            created_at: 1,
            updated_at: 1,
        });
        assert_eq!(
            bad_id.error.expect("error info").error_type,
            "ValidationError"
        );

        let deleted = draft_delete(draft.id.clone());
        assert!(deleted.ok && deleted.removed);
        let repeated = draft_delete(draft.id.clone());
        assert!(repeated.ok && !repeated.removed);

        let missing = draft_load(draft.id);
        assert!(!missing.ok);
        assert_eq!(
            missing.error.expect("error info").error_type,
            "DraftNotFound"
        );
    }

    #[test]
    fn malformed_draft_id_is_validation_error() {
        let response = draft_load("not-a-uuid".to_string());
        assert!(!response.ok);
        assert_eq!(
            response.error.expect("error info").error_type,
            "ValidationError"
        );
    }

    // The slot is process-wide state in the shared database, so every
    // slot-touching step runs inside this one test.
    #[test]
    fn autosave_and_submit_share_slot_lifecycle() {
        autosave_save(KnowledgeForm {
            title: Some("x".to_string()),
            ..KnowledgeForm::default()
        });
        assert_eq!(
            autosave_load().and_then(|form| form.title),
            Some("x".to_string())
        );
        autosave_clear();
        assert_eq!(autosave_load(), None);

        let rejected = knowledge_submit(complete_form(""), None);
        assert!(!rejected.ok);
        assert!(rejected.error.is_none());
        assert_eq!(rejected.validation.expect("validation").errors.len(), 1);

        let title = unique_token("ffi-submit");
        let draft = draft_create(complete_form(&title)).draft.expect("draft");
        autosave_save(complete_form(&title));

        let submitted = knowledge_submit(complete_form(&title), Some(draft.id.clone()));
        assert!(submitted.ok, "{:?}", submitted.error);
        let receipt = submitted.receipt.expect("receipt");
        assert_eq!(receipt.commit_id.len(), 32);
        assert!(receipt.location.ends_with(".md"));
        assert_eq!(autosave_load(), None);
        assert!(!draft_load(draft.id).ok);

        let quick = knowledge_quick_save(
            unique_token("ffi-quick"),
            "ops".to_string(),
            "low".to_string(),
        );
        assert!(quick.ok, "{:?}", quick.error);

        let bad_quick =
            knowledge_quick_save("t".to_string(), "bogus".to_string(), "low".to_string());
        assert!(!bad_quick.ok);
        let errors: Vec<(String, String)> = bad_quick
            .validation
            .expect("validation")
            .errors
            .into_iter()
            .map(|error| (error.field, error.message))
            .collect();
        assert_eq!(
            errors,
            vec![("category".to_string(), "無効なカテゴリです".to_string())]
        );
    }

    #[test]
    fn markdown_preview_renders_unfinished_form() {
        let preview = markdown_preview(KnowledgeForm {
            title: Some("書きかけ".to_string()),
            category: Some("ops".to_string()),
            ..KnowledgeForm::default()
        });
        assert!(preview.starts_with("---\ntitle: \"書きかけ\"\ncategory: ops\n"));
        assert!(preview.contains("# 書きかけ\n\n## 概要"));
        assert!(!preview.contains("author:"));
        assert!(!preview.contains("## 対応履歴"));
    }

    #[test]
    fn config_roundtrip_and_rejection() {
        let loaded = config_load();
        assert!(loaded.ok, "{:?}", loaded.error);

        let rejected = config_save(r#"{"git":{"repositoryPath":""}}"#.to_string());
        assert!(!rejected.ok);
        assert_eq!(rejected.error.expect("error info").error_type, "ConfigError");

        let malformed = config_save("{".to_string());
        assert_eq!(malformed.error.expect("error info").error_type, "ConfigError");

        let saved = config_save(r#"{"git":{"repositoryPath":"/srv/runbooks"}}"#.to_string());
        assert!(saved.ok, "{:?}", saved.error);
        let json = saved.config_json.expect("config json");
        assert!(json.contains("\"repositoryPath\":\"/srv/runbooks\""));
        assert!(json.contains("\"savePath\":\"docs/runbooks\""));
    }
}
