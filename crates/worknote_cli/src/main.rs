//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `worknote_core` linkage without the UI shell.
//! - Validate one form payload read as JSON from stdin.
//!
//! Exit codes: 0 valid, 1 invalid form, 2 unreadable input.

use std::io::Read;
use std::process::ExitCode;
use worknote_core::{core_version, validate_knowledge_input, KnowledgeInput};

fn main() -> ExitCode {
    if std::env::args().nth(1).as_deref() == Some("--version") {
        println!("worknote_core version={}", core_version());
        return ExitCode::SUCCESS;
    }

    let mut raw = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut raw) {
        eprintln!("failed to read stdin: {err}");
        return ExitCode::from(2);
    }

    let input: KnowledgeInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("invalid form JSON: {err}");
            return ExitCode::from(2);
        }
    };

    let result = validate_knowledge_input(&input);
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode result: {err}");
            return ExitCode::from(2);
        }
    }

    if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
