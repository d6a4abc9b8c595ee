//! Markdown rendering for finalized knowledge records.
//!
//! # Responsibility
//! - Render a `KnowledgeRecord` as a runbook page with YAML frontmatter.
//! - Preview unfinished form input in the same layout, without author data.
//! - Derive filesystem-safe file stems from record titles.
//!
//! # Invariants
//! - Rendering is pure: the calendar date is an input, not read from a clock.
//!   `render_preview_today` is the one clock-reading wrapper.
//! - Frontmatter string values are double-quoted and escaped.

use crate::model::knowledge::{KnowledgeInput, KnowledgeRecord};
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static HYPHEN_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen regex"));

/// Escapes a value for a double-quoted YAML scalar.
pub fn escape_yaml_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Converts a title into a lowercase, hyphen-separated ASCII stem.
///
/// Non-ASCII characters are dropped. Returns `None` when nothing usable
/// remains, so callers can pick their own fallback stem.
pub fn to_kebab_case(title: &str) -> Option<String> {
    let replaced: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c.is_ascii_punctuation() {
                Some('-')
            } else {
                None
            }
        })
        .collect();

    let collapsed = HYPHEN_RUN_RE.replace_all(&replaced, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fields of one runbook page, borrowed from a record or a live form.
struct Page<'a> {
    title: &'a str,
    category: &'a str,
    severity: &'a str,
    symptoms: &'a str,
    procedure: &'a str,
    notes: Option<&'a str>,
    related_links: Option<&'a str>,
    judgment: Option<&'a str>,
}

/// Renders the runbook page for `record`.
///
/// `author` adds an `author` frontmatter key and a revision history table.
pub fn render_markdown(record: &KnowledgeRecord, author: Option<&str>, date: NaiveDate) -> String {
    let page = Page {
        title: &record.title,
        category: record.category.as_str(),
        severity: record.severity.as_str(),
        symptoms: &record.symptoms,
        procedure: &record.procedure,
        notes: record.notes.as_deref(),
        related_links: record.related_links.as_deref(),
        judgment: record.judgment.as_deref(),
    };
    render_page(&page, author, date)
}

/// Renders an in-progress form the way it would be exported.
///
/// Works on unvalidated input: absent text renders as empty, and the
/// category and severity are written as typed. Never carries an author.
pub fn render_preview(input: &KnowledgeInput, date: NaiveDate) -> String {
    let page = Page {
        title: input.title.as_deref().unwrap_or(""),
        category: input.category.as_deref().unwrap_or("").trim(),
        severity: input.severity.as_deref().unwrap_or("").trim(),
        symptoms: input.symptoms.as_deref().unwrap_or(""),
        procedure: input.procedure.as_deref().unwrap_or(""),
        notes: input.notes.as_deref(),
        related_links: input.related_links.as_deref(),
        judgment: input.judgment.as_deref(),
    };
    render_page(&page, None, date)
}

/// `render_preview` dated with the local calendar day.
pub fn render_preview_today(input: &KnowledgeInput) -> String {
    render_preview(input, Local::now().date_naive())
}

fn render_page(page: &Page<'_>, author: Option<&str>, date: NaiveDate) -> String {
    let today = date.format("%Y-%m-%d").to_string();
    let mut content = String::new();

    content.push_str("---\n");
    let _ = writeln!(content, "title: \"{}\"", escape_yaml_string(page.title));
    let _ = writeln!(content, "category: {}", page.category);
    let _ = writeln!(content, "severity: {}", page.severity);
    content.push_str("symptoms:\n");
    let _ = writeln!(content, "  - \"{}\"", escape_yaml_string(page.symptoms));
    content.push_str("related_alerts: []\n");
    let _ = writeln!(content, "last_updated: {today}");
    if let Some(author) = author {
        let _ = writeln!(content, "author: \"{}\"", escape_yaml_string(author));
    }
    content.push_str("---\n\n");

    let _ = write!(content, "# {}\n\n", page.title);
    push_section(&mut content, "概要", Some(page.symptoms));
    push_section(&mut content, "症状・検知条件", Some(page.symptoms));
    push_section(&mut content, "対応手順", Some(page.procedure));
    push_section(&mut content, "注意点・落とし穴", page.notes);
    push_section(&mut content, "関連リンク", page.related_links);

    if let Some(judgment) = page.judgment.filter(|value| !value.is_empty()) {
        push_section(&mut content, "判断基準・判断軸", Some(judgment));
    }

    if let Some(author) = author {
        content.push_str("## 対応履歴\n\n");
        content.push_str("| 日付 | 対応者 | 備考 |\n");
        content.push_str("|------|--------|------|\n");
        let _ = writeln!(content, "| {today} | {author} | 初版作成 |");
    }

    content
}

fn push_section(content: &mut String, heading: &str, body: Option<&str>) {
    let _ = write!(content, "## {heading}\n\n");
    match body {
        Some(body) => {
            let _ = write!(content, "{body}\n\n");
        }
        None => content.push('\n'),
    }
}
