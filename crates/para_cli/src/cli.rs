//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "para")]
#[command(about = "Parse, categorize and update PARA Markdown notes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML engine configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error); needs a log directory
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse one note and print everything extracted from it
    Parse {
        path: PathBuf,
        /// Fail on malformed metadata instead of warning
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },

    /// Process every matching note under a directory
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
        /// Print only the aggregate summary
        #[arg(long)]
        summary_only: bool,
        /// Treat malformed metadata as a per-file failure
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },

    /// Search action items across notes
    Actions {
        dir: PathBuf,
        #[command(flatten)]
        walk: WalkArgs,
        /// Open, unassigned, and undated or past due
        #[arg(long)]
        orphaned: bool,
        /// Only items assigned to this handle
        #[arg(long, conflicts_with = "mine")]
        assignee: Option<String>,
        /// Only items assigned to the configured user_name
        #[arg(long)]
        mine: bool,
        /// Include completed items
        #[arg(long)]
        include_completed: bool,
        /// Reference date for due checks (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },

    /// Set metadata fields, keeping a backup of the previous file
    Update {
        path: PathBuf,
        /// Edits as key=value; values are read as YAML scalars or flow values
        #[arg(required = true, num_args = 1..)]
        edits: Vec<String>,
        /// Document root holding the backup directory (defaults to the file's directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Suggest a category for one note
    Categorize {
        path: PathBuf,
        /// Store the suggestion in the note's `category` field
        #[arg(long)]
        write: bool,
        /// Document root holding the backup directory (defaults to the file's directory)
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct WalkArgs {
    /// File-name glob; a pattern containing `/` matches the relative path
    #[arg(long)]
    pub pattern: Option<String>,
    /// Only the top-level directory
    #[arg(long, conflicts_with = "recursive")]
    pub no_recursive: bool,
    /// Descend into subdirectories
    #[arg(long)]
    pub recursive: bool,
}

impl WalkArgs {
    pub fn recursive_override(&self) -> Option<bool> {
        match (self.recursive, self.no_recursive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_collects_repeated_edits() {
        let cli = Cli::parse_from(["para", "update", "note.md", "status=done", "tags=[a, b]"]);
        match cli.command {
            Command::Update { edits, .. } => assert_eq!(edits, vec!["status=done", "tags=[a, b]"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn walk_flags_map_to_override() {
        let cli = Cli::parse_from(["para", "batch", "notes", "--no-recursive"]);
        match cli.command {
            Command::Batch { walk, .. } => assert_eq!(walk.recursive_override(), Some(false)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
