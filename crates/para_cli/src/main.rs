//! `para` command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `para_core` services and print their results.
//!
//! # Invariants
//! - Single-file operations exit non-zero on any fatal error for that file.
//! - `batch` and `actions` exit zero once the run completes, even when
//!   individual files failed; failures are part of the report.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use log::info;
use para_core::{
    default_log_level, find_actions, init_logging, parse_edits, ActionQuery, BatchOptions,
    BatchProcessor, EngineConfig, NoteService, NoteUpdater, ParseMode,
};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    start_logging(&cli, &config);

    match cli.command {
        Command::Parse { path, strict, json } => {
            let mode = if strict { ParseMode::Strict } else { ParseMode::Graceful };
            let note = NoteService::new(&config).parse_file(&path, mode)?;
            if json {
                print_json(&note)?;
            } else {
                print!("{}", output::note(&note));
            }
        }
        Command::Batch {
            dir,
            walk,
            summary_only,
            strict,
            json,
        } => {
            let options = BatchOptions {
                mode: if strict { ParseMode::Strict } else { ParseMode::Graceful },
                recursive: walk.recursive_override(),
            };
            let report =
                BatchProcessor::new(&config).process(&dir, walk.pattern.as_deref(), options)?;
            match (json, summary_only) {
                (true, true) => print_json(&report.summary)?,
                (true, false) => print_json(&report)?,
                (false, _) => print!("{}", output::batch(&report, summary_only)),
            }
        }
        Command::Actions {
            dir,
            walk,
            orphaned,
            assignee,
            mine,
            include_completed,
            today,
            json,
        } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let mut query = ActionQuery::new(today).with_completed(include_completed);
            if orphaned {
                query = query.orphaned();
            }
            if let Some(handle) = assignee {
                query = query.assigned_to(handle);
            }
            if mine {
                query = query.mine(&config)?;
            }
            let options = BatchOptions {
                mode: ParseMode::Graceful,
                recursive: walk.recursive_override(),
            };
            let report =
                BatchProcessor::new(&config).process(&dir, walk.pattern.as_deref(), options)?;
            for failure in &report.failures {
                eprintln!("skipped {}: {}", failure.path.display(), failure.error);
            }
            let hits = find_actions(&report.notes, &query);
            if json {
                print_json(&hits)?;
            } else {
                print!("{}", output::action_hits(&hits));
            }
        }
        Command::Update { path, edits, root } => {
            let edits = parse_edits(&edits)?;
            let updater = NoteUpdater::new(document_root(&path, root), &config);
            let outcome = updater.update(&path, edits)?;
            println!(
                "updated {} ({}); backup: {}",
                outcome.path.display(),
                outcome.changed_keys.join(", "),
                outcome.backup_path.display()
            );
        }
        Command::Categorize {
            path,
            write,
            root,
            json,
        } => {
            if write {
                let updater = NoteUpdater::new(document_root(&path, root), &config);
                let (category, outcome) = updater.persist_category(&path)?;
                println!(
                    "{category} written to {}; backup: {}",
                    outcome.path.display(),
                    outcome.backup_path.display()
                );
            } else {
                let note = NoteService::new(&config).parse_file(&path, ParseMode::Graceful)?;
                if json {
                    print_json(&note.categorization)?;
                } else {
                    println!("{}", output::categorization(&note.categorization));
                }
            }
        }
    }
    Ok(())
}

/// Logging starts only when a directory is known; failures are reported but
/// never stop the command.
fn start_logging(cli: &Cli, config: &EngineConfig) {
    let Some(dir) = cli.log_dir.as_ref().or(config.log_dir.as_ref()) else {
        return;
    };
    match init_logging(log_level(cli, config), dir) {
        Ok(()) => info!(
            "event=app_start module=cli status=ok version={}",
            env!("CARGO_PKG_VERSION")
        ),
        Err(err) => eprintln!("warning: logging disabled: {err}"),
    }
}

/// `--log-level`, then the configured level, then the engine default.
fn log_level<'a>(cli: &'a Cli, config: &'a EngineConfig) -> &'a str {
    cli.log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or(default_log_level())
}

fn document_root(path: &Path, root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
