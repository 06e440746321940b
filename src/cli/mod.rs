//! Command line front end over the intake engine.
//!
//! Dispatch is a plain `env::args` match: a handful of subcommands, a usage
//! dump on anything unrecognized, and global `--plain` / `--quiet` flags that
//! feed the output preferences.

pub mod driver;
pub mod output;
pub mod prompts;
pub mod range_widget;
pub mod test_mode;

use std::collections::BTreeMap;
use std::env;
use std::fs;

use thiserror::Error;

use crate::config::ConfigManager;
use crate::errors::IntakeError;
use crate::restore::{FileStore, SessionKey, SessionStore};
use crate::schema::catalog;
use crate::schema::FieldValue;
use crate::submit::{evaluate, normalize_price_range, rules_for};
use output::OutputPreferences;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("unknown form id `{0}`")]
    UnknownForm(String),
    #[error("{0}")]
    Usage(String),
    #[error("validation failed with {0} problem(s)")]
    ValidationFailed(usize),
}

pub fn run_cli() -> Result<(), CliError> {
    let mut prefs = OutputPreferences::default();
    let mut positionals: Vec<String> = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--plain" => prefs.plain_mode = true,
            "--quiet" => prefs.quiet_mode = true,
            flag if flag.starts_with("--") => {
                print_usage();
                return Err(CliError::Usage(format!("unrecognized flag `{flag}`")));
            }
            _ => positionals.push(arg),
        }
    }
    output::set_preferences(prefs);

    let Some(command) = positionals.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "fill" => driver::run_wizard(positionals.get(1).map(String::as_str)),
        "forms" => cmd_forms(),
        "validate" => {
            let Some(file) = positionals.get(1) else {
                print_usage();
                return Err(CliError::Usage("validate needs a JSON file".into()));
            };
            cmd_validate(file, positionals.get(2).map(String::as_str))
        }
        "restore-peek" => cmd_restore_peek(),
        "prune" => cmd_prune(positionals.get(1).map(String::as_str)),
        "version" => {
            println!("intake {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" => {
            print_usage();
            Ok(())
        }
        other => {
            suggest_command(other);
            print_usage();
            Err(CliError::Usage(format!("unrecognized command `{other}`")))
        }
    }
}

const COMMANDS: [&str; 7] = [
    "fill",
    "forms",
    "validate",
    "restore-peek",
    "prune",
    "version",
    "help",
];

fn suggest_command(input: &str) {
    let mut suggestions: Vec<_> = COMMANDS
        .iter()
        .map(|name| (strsim::levenshtein(name, input), *name))
        .collect();
    suggestions.sort_by_key(|(distance, _)| *distance);

    if let Some((distance, best)) = suggestions.first() {
        if *distance <= 3 {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }
}

fn cmd_forms() -> Result<(), CliError> {
    output::section("Available forms");
    for form in catalog::all_forms() {
        output::info(format!(
            "{:<18} {:<22} {} step(s)  {}",
            form.id,
            form.title,
            form.sections.len(),
            form.canonical_path
        ));
    }
    Ok(())
}

/// Runs a JSON value map through the same rule chains a posted submission
/// gets, printing one line per failed rule.
fn cmd_validate(file: &str, form_id: Option<&str>) -> Result<(), CliError> {
    let form_id = form_id.unwrap_or(catalog::DEFAULT_FORM_ID);
    let rules = rules_for(form_id).ok_or_else(|| CliError::UnknownForm(form_id.to_string()))?;
    let text = fs::read_to_string(file)?;
    let mut values: BTreeMap<String, FieldValue> =
        serde_json::from_str(&text).map_err(IntakeError::from)?;
    normalize_price_range(&mut values);
    let problems = evaluate(&rules, &values);
    if problems.is_empty() {
        output::success("All checks passed.");
        return Ok(());
    }
    for problem in &problems {
        match &problem.field {
            Some(field) => output::warning(format!("{field}: {}", problem.message)),
            None => output::warning(&problem.message),
        }
    }
    Err(CliError::ValidationFailed(problems.len()))
}

fn cmd_restore_peek() -> Result<(), CliError> {
    let config = ConfigManager::new()?.load_or_create()?;
    let store = FileStore::new();
    let key = SessionKey::from_uuid(config.session_key);
    match store.peek(&key)? {
        Some(payload) => {
            let rendered = serde_json::to_string_pretty(&payload).map_err(IntakeError::from)?;
            println!("{rendered}");
        }
        None => output::info("No stashed draft for this session."),
    }
    Ok(())
}

fn cmd_prune(hours: Option<&str>) -> Result<(), CliError> {
    let hours: i64 = match hours {
        Some(raw) => raw
            .parse()
            .map_err(|_| CliError::Usage(format!("prune wants an hour count, got `{raw}`")))?,
        None => 24,
    };
    let store = FileStore::new();
    let removed = store.prune(chrono::Duration::hours(hours))?;
    output::success(format!("Removed {removed} stale draft(s)."));
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Usage: intake [--plain] [--quiet] <command>\n\
         Commands:\n  \
         fill [form-id]            run the interactive wizard (default: {default})\n  \
         forms                     list the form catalog\n  \
         validate <file> [form-id] check a JSON value map against the server rules\n  \
         restore-peek              show the draft stashed for this session\n  \
         prune [hours]             drop stashed drafts older than N hours (default: 24)\n  \
         version                   print the version\n  \
         help                      show this message",
        default = catalog::DEFAULT_FORM_ID
    );
}
