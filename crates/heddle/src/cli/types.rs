//! CLI value enums and their domain conversions.

use clap::ValueEnum;

use crate::domain::{IssueStatus, IssueType};

/// Issue type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueTypeArg {
    /// General task
    Task,
    /// Bug fix
    Bug,
    /// New feature
    Feature,
    /// Epic (parent issue)
    Epic,
    /// Maintenance/chore
    Chore,
}

impl From<IssueTypeArg> for IssueType {
    fn from(arg: IssueTypeArg) -> Self {
        match arg {
            IssueTypeArg::Task => Self::Task,
            IssueTypeArg::Bug => Self::Bug,
            IssueTypeArg::Feature => Self::Feature,
            IssueTypeArg::Epic => Self::Epic,
            IssueTypeArg::Chore => Self::Chore,
        }
    }
}

/// Issue status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatusArg {
    /// Waiting to be picked up
    Open,
    /// Currently being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Manually held; never ready
    Blocked,
    /// Completed
    Closed,
}

impl From<IssueStatusArg> for IssueStatus {
    fn from(arg: IssueStatusArg) -> Self {
        match arg {
            IssueStatusArg::Open => Self::Open,
            IssueStatusArg::InProgress => Self::InProgress,
            IssueStatusArg::Blocked => Self::Blocked,
            IssueStatusArg::Closed => Self::Closed,
        }
    }
}
