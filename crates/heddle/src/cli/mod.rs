//! Command-line interface.
//!
//! # Commands
//!
//! - `init`: create `.heddle/` in the current directory
//! - `info`: repository summary
//! - `create`, `show`, `list`, `ready`
//! - `start`, `status`, `close`, `comment`
//! - `dep add|remove|list`: manage blocking relationships
//!
//! `--json` switches every command to JSON output.
//!
//! ```bash
//! heddle create "Design schema" -p 1
//! heddle create "Build API" --blocked-by hd-a3f8
//! heddle ready
//! heddle close hd-a3f8
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    CommentArgs, CreateArgs, DepAction, DepArgs, InfoArgs, InitArgs, IssueIdArgs, ListArgs,
    ReadyArgs, ShowArgs, StatusArgs,
};
pub use types::{IssueStatusArg, IssueTypeArg};
pub use validators::{validate_comment, validate_issue_id, validate_prefix, validate_title};

/// Heddle - dependency-aware issue tracking
///
/// Issues live in `.heddle/issues.jsonl`. An issue is ready when it is open
/// and every issue blocking it is closed.
#[derive(Parser, Debug)]
#[command(name = "heddle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new heddle repository
    Init(InitArgs),

    /// Show repository information and graph health
    Info(InfoArgs),

    /// Create a new issue
    Create(CreateArgs),

    /// Show an issue with its blockers and dependents
    Show(ShowArgs),

    /// List issues with optional filters
    List(ListArgs),

    /// Show issues ready to work on
    Ready(ReadyArgs),

    /// Mark an issue as in progress
    Start(IssueIdArgs),

    /// Set an issue's status
    Status(StatusArgs),

    /// Close an issue and report what it unblocked
    Close(IssueIdArgs),

    /// Add a comment to an issue
    Comment(CommentArgs),

    /// Manage blocking relationships
    Dep(DepArgs),
}

impl Cli {
    /// Parse CLI arguments from the command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid input.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the parsed command against the repository found from the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns any error from locating the repository or running the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let cwd = std::env::current_dir()?;
        if let Commands::Init(args) = &self.command {
            return execute::execute_init(&cwd, args, mode).await;
        }

        let mut app = App::from_directory(&cwd).await?;
        for warning in app.load_warnings() {
            eprintln!("warning: {warning}");
        }

        match &self.command {
            // handled above
            Commands::Init(_) => Ok(()),
            Commands::Info(args) => execute::execute_info(&mut app, args, mode).await,
            Commands::Create(args) => execute::execute_create(&mut app, args, mode).await,
            Commands::Show(args) => execute::execute_show(&mut app, args, mode).await,
            Commands::List(args) => execute::execute_list(&app, args, mode).await,
            Commands::Ready(args) => execute::execute_ready(&mut app, args, mode).await,
            Commands::Start(args) => execute::execute_start(&mut app, args, mode).await,
            Commands::Status(args) => execute::execute_status(&mut app, args, mode).await,
            Commands::Close(args) => execute::execute_close(&mut app, args, mode).await,
            Commands::Comment(args) => execute::execute_comment(&mut app, args, mode).await,
            Commands::Dep(args) => execute::execute_dep(&mut app, args, mode).await,
        }
    }
}
