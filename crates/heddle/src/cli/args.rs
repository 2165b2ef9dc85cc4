//! Argument structs for each command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::{IssueStatusArg, IssueTypeArg};
use super::validators::{validate_comment, validate_issue_id, validate_prefix, validate_title};
use crate::domain::{DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Issue ID prefix (2-20 alphanumeric characters)
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments for the `create` command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Issue title (maximum 200 characters)
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Detailed description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Read the description from a file, or from stdin with `-`.
    /// Takes precedence over --description
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub description_file: Option<PathBuf>,

    /// Priority (0=critical, 1=high, 2=medium, 3=low, 4=backlog)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_PRIORITY)..=i64::from(MAX_PRIORITY)),
        default_value_t = DEFAULT_PRIORITY
    )]
    pub priority: u8,

    /// Issue type
    #[arg(short = 't', long = "type", value_enum, default_value = "task")]
    pub issue_type: IssueTypeArg,

    /// Labels (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Issues that block this one (comma-separated IDs)
    #[arg(short, long, value_delimiter = ',', value_parser = validate_issue_id)]
    pub blocked_by: Vec<String>,

    /// Parent issue ID
    #[arg(long, value_parser = validate_issue_id)]
    pub parent: Option<String>,

    /// Design notes
    #[arg(long)]
    pub design: Option<String>,

    /// Acceptance criterion (repeatable)
    #[arg(long = "accept")]
    pub acceptance_criteria: Vec<String>,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Only issues with this status
    #[arg(short, long, value_enum)]
    pub status: Option<IssueStatusArg>,

    /// Only issues of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub issue_type: Option<IssueTypeArg>,

    /// Only issues with any of these labels (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Include closed issues when no status is given
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Maximum number of issues to display (0 for no limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Only issues with any of these labels (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Only issues of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub issue_type: Option<IssueTypeArg>,

    /// Maximum number of issues to display (0 for no limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// Print every transitive blocker first, deepest first, with its content
    #[arg(long)]
    pub fetch_deps: bool,
}

/// Arguments for commands that take a single issue ID
#[derive(Parser, Debug, Clone)]
pub struct IssueIdArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,
}

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// New status
    #[arg(value_enum)]
    pub status: IssueStatusArg,
}

/// Arguments for the `comment` command
#[derive(Parser, Debug, Clone)]
pub struct CommentArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub issue_id: String,

    /// Comment text
    #[arg(value_parser = validate_comment)]
    pub text: String,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Make ISSUE wait on BLOCKER
    Add {
        /// The issue that becomes blocked
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// The issue that must be closed first
        #[arg(value_parser = validate_issue_id)]
        blocker_id: String,
    },

    /// Stop ISSUE waiting on BLOCKER
    Remove {
        /// The blocked issue
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,

        /// The blocker to drop
        #[arg(value_parser = validate_issue_id)]
        blocker_id: String,
    },

    /// Show direct blockers and dependents of an issue
    List {
        /// Issue ID
        #[arg(value_parser = validate_issue_id)]
        issue_id: String,
    },
}
