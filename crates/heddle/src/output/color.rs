//! Color and styling helpers for CLI output.
//!
//! Semantic colors:
//!   - green:   closed, success messages
//!   - yellow:  in progress, P1, warnings
//!   - red:     blocked, P0
//!   - cyan:    issue IDs
//!   - magenta: labels
//!   - dimmed:  field labels

use crate::domain::IssueStatus;
use colored::Colorize;

use super::OutputConfig;

/// Green text for completed actions.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Yellow text for warnings.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

pub(crate) fn colorize_status(status: IssueStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        IssueStatus::Open => text.white().to_string(),
        IssueStatus::InProgress => text.yellow().to_string(),
        IssueStatus::Blocked => text.red().to_string(),
        IssueStatus::Closed => text.green().to_string(),
    }
}

pub(crate) fn colorize_priority(priority: u8, config: &OutputConfig) -> String {
    let text = format!("P{priority}");
    if !config.use_colors {
        return text;
    }
    match priority {
        0 => text.red().bold().to_string(),
        1 => text.yellow().to_string(),
        _ => text,
    }
}

pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

pub(crate) fn colorize_labels(labels: &[String], config: &OutputConfig) -> String {
    let text = labels.join(", ");
    if !config.use_colors {
        return text;
    }
    text.magenta().to_string()
}

/// Single-character status marker.
pub(crate) fn status_icon(status: IssueStatus, config: &OutputConfig) -> String {
    let icon = match status {
        IssueStatus::Open => "○",
        IssueStatus::InProgress => "▶",
        IssueStatus::Blocked => "✗",
        IssueStatus::Closed => "✓",
    };
    if !config.use_colors {
        return icon.to_string();
    }
    match status {
        IssueStatus::Open => icon.white().to_string(),
        IssueStatus::InProgress => icon.yellow().to_string(),
        IssueStatus::Blocked => icon.red().to_string(),
        IssueStatus::Closed => icon.green().to_string(),
    }
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
