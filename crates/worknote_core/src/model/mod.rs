//! Domain model for knowledge capture.
//!
//! # Responsibility
//! - Define the form, record, draft and config shapes used by core logic.
//! - Keep wire naming (camelCase) stable for the UI shell.
//!
//! # Invariants
//! - Drafts are identified by a stable `DraftId`.
//! - Typed `KnowledgeRecord` values only exist after validation.

pub mod config;
pub mod draft;
pub mod knowledge;
