//! Output formatting for CLI commands.
//!
//! Every printer takes an [`OutputMode`]: human-readable text, or pretty JSON
//! for scripts. Text rendering writes to any `io::Write` so it can be tested
//! against a buffer.

pub mod color;

use crate::domain::{Issue, IssueId};
use crate::service::{CloseOutcome, IssueWithDependencies};
use color::{bold, colorize_id, colorize_labels, colorize_priority, colorize_status, dimmed, status_icon};
use serde::Serialize;
use std::borrow::Cow;
use std::env;
use std::io::{self, Write};

pub use color::{success, warning};

const DEFAULT_TERMINAL_WIDTH: usize = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;
const MAX_DEPENDENCY_WORDS: usize = 200;
const SEPARATOR_WIDTH: usize = 60;

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings controlling text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for wrapped sections
    pub max_width: usize,
    /// Whether to emit ANSI colors
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a config with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_colors: bool) -> Self {
        Self {
            max_width,
            use_colors,
        }
    }

    /// Read settings from the environment.
    ///
    /// - `HEDDLE_MAX_WIDTH`: content width (default 80)
    /// - `NO_COLOR`: any value disables colors
    /// - `HEDDLE_COLOR`: `0` or `false` disables colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("HEDDLE_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "HEDDLE_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_colors = env::var_os("NO_COLOR").is_none()
            && env::var("HEDDLE_COLOR").map_or(true, |v| {
                v != "0" && !v.eq_ignore_ascii_case("false")
            });

        Self {
            max_width,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTENT_WIDTH, true)
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size().map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| usize::from(w.0))
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(1))
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

/// Keep the first `max_words` whitespace-separated words of `text`.
///
/// Returns the text unchanged when it is short enough; otherwise the kept
/// words joined by single spaces with `...` appended, and `true`.
fn truncate_words(text: &str, max_words: usize) -> (Cow<'_, str>, bool) {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();
    if words.next().is_none() {
        return (Cow::Borrowed(text), false);
    }
    (Cow::Owned(format!("{}...", kept.join(" "))), true)
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print any serializable value as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(io::stdout().lock(), "{json}")
}

/// Print a plain line.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_message(msg: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{msg}")
}

/// Print a one-issue summary, e.g. after create or a status change.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issue(issue: &Issue, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(issue),
        OutputMode::Text => {
            write_issue_line(&mut io::stdout().lock(), issue, &OutputConfig::from_env())
        }
    }
}

/// Print a list of issues.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issues(issues: &[Issue], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&issues),
        OutputMode::Text => {
            write_issues_text(&mut io::stdout().lock(), issues, &OutputConfig::from_env())
        }
    }
}

/// Print an issue with its direct links.
///
/// With `fetch_deps`, text output first prints every transitive blocker,
/// deepest first, with its description and design notes. JSON output always
/// carries the full blocker chain.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issue_details(
    details: &IssueWithDependencies,
    blockers: &[IssueId],
    dependents: &[IssueId],
    fetch_deps: bool,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "issue": details.issue,
            "content_hash": details.issue.content_hash(),
            "blocked_by": blockers,
            "blocks": dependents,
            "dependencies": details.dependencies,
        })),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = terminal_width().min(config.max_width);
            let mut out = io::stdout().lock();
            if fetch_deps {
                write_dependencies_text(&mut out, &details.dependencies, width, &config)?;
            }
            write_details_text(&mut out, details, blockers, dependents, width, &config)
        }
    }
}

/// Print the result of closing an issue.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_close_outcome(outcome: &CloseOutcome, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(outcome),
        OutputMode::Text => {
            write_close_text(&mut io::stdout().lock(), outcome, &OutputConfig::from_env())
        }
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_issue_line<W: Write>(w: &mut W, issue: &Issue, config: &OutputConfig) -> io::Result<()> {
    write!(
        w,
        "{} {}  {}  {}  {}",
        status_icon(issue.status, config),
        colorize_id(issue.id.as_str(), config),
        colorize_priority(issue.priority, config),
        issue.issue_type,
        issue.title
    )?;
    if !issue.labels.is_empty() {
        write!(w, "  [{}]", colorize_labels(&issue.labels, config))?;
    }
    writeln!(w)
}

fn write_issues_text<W: Write>(
    w: &mut W,
    issues: &[Issue],
    config: &OutputConfig,
) -> io::Result<()> {
    if issues.is_empty() {
        return writeln!(w, "No issues found.");
    }

    writeln!(w, "Found {} issue(s):", issues.len())?;
    writeln!(w)?;
    for issue in issues {
        write_issue_line(w, issue, config)?;
    }
    Ok(())
}

fn write_section<W: Write>(
    w: &mut W,
    title: &str,
    content: &str,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if content.trim().is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{}:", bold(title, config))?;
    for line in wrap_text(content, width.saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

fn write_id_list<W: Write>(
    w: &mut W,
    title: &str,
    ids: &[IssueId],
    config: &OutputConfig,
) -> io::Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), ids.len())?;
    for id in ids {
        writeln!(w, "  → {}", colorize_id(id.as_str(), config))?;
    }
    Ok(())
}

fn write_details_text<W: Write>(
    w: &mut W,
    details: &IssueWithDependencies,
    blockers: &[IssueId],
    dependents: &[IssueId],
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    let issue = &details.issue;

    writeln!(
        w,
        "{} {}: {}",
        status_icon(issue.status, config),
        colorize_id(issue.id.as_str(), config),
        issue.title
    )?;
    writeln!(
        w,
        "{} {}    {} {}    {} {}",
        dimmed("Type:", config),
        issue.issue_type,
        dimmed("Status:", config),
        colorize_status(issue.status, config),
        dimmed("Priority:", config),
        colorize_priority(issue.priority, config)
    )?;

    if !issue.labels.is_empty() {
        writeln!(
            w,
            "{} {}",
            dimmed("Labels:", config),
            colorize_labels(&issue.labels, config)
        )?;
    }
    if let Some(parent) = &issue.parent {
        writeln!(w, "{} {}", dimmed("Parent:", config), colorize_id(parent.as_str(), config))?;
    }

    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        issue.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        issue.updated_at.format("%Y-%m-%d %H:%M")
    )?;
    if let Some(closed_at) = issue.closed_at {
        writeln!(w, "{} {}", dimmed("Closed:", config), closed_at.format("%Y-%m-%d %H:%M"))?;
    }

    write_section(w, "Description", &issue.description, width, config)?;
    write_section(w, "Design Notes", &issue.design_notes, width, config)?;
    if !issue.acceptance_criteria.is_empty() {
        let checklist: Vec<String> = issue
            .acceptance_criteria
            .iter()
            .map(|c| format!("- [ ] {c}"))
            .collect();
        write_section(w, "Acceptance Criteria", &checklist.join("\n"), width, config)?;
    }

    write_id_list(w, "Blocked by", blockers, config)?;
    write_id_list(w, "Blocks", dependents, config)?;

    if !issue.comments.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Comments", config), issue.comments.len())?;
        for comment in &issue.comments {
            writeln!(
                w,
                "  {}",
                dimmed(&comment.timestamp.format("%Y-%m-%d %H:%M").to_string(), config)
            )?;
            for line in wrap_text(&comment.text, width.saturating_sub(4)) {
                writeln!(w, "    {line}")?;
            }
        }
    }

    Ok(())
}

fn write_dependency_block<W: Write>(
    w: &mut W,
    dep: &Issue,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {}",
        status_icon(dep.status, config),
        colorize_id(dep.id.as_str(), config),
        dep.title
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Status:", config),
        colorize_status(dep.status, config),
        dimmed("Priority:", config),
        colorize_priority(dep.priority, config)
    )?;

    let content = match (dep.description.trim().is_empty(), dep.design_notes.trim().is_empty()) {
        (_, true) => Cow::Borrowed(dep.description.as_str()),
        (true, false) => Cow::Borrowed(dep.design_notes.as_str()),
        (false, false) => Cow::Owned(format!("{}\n\n{}", dep.description, dep.design_notes)),
    };
    if !content.trim().is_empty() {
        let (text, truncated) = truncate_words(&content, MAX_DEPENDENCY_WORDS);
        writeln!(w)?;
        for line in wrap_text(&text, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
        if truncated {
            writeln!(w)?;
            let hint = format!("Use 'heddle show {}' to see complete content", dep.id);
            writeln!(w, "  {}", dimmed(&hint, config))?;
        }
    }

    writeln!(w, "{}", "─".repeat(width.clamp(1, SEPARATOR_WIDTH)))?;
    writeln!(w)
}

/// Transitive blockers, deepest first, followed by a heading for the main
/// issue. Prints nothing when there are no blockers.
fn write_dependencies_text<W: Write>(
    w: &mut W,
    dependencies: &[Issue],
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if dependencies.is_empty() {
        return Ok(());
    }

    writeln!(w, "{}", bold("Dependencies (deepest first):", config))?;
    writeln!(w)?;
    for dep in dependencies {
        write_dependency_block(w, dep, width, config)?;
    }
    writeln!(w, "{}", bold("Main issue:", config))?;
    writeln!(w)
}

fn write_close_text<W: Write>(
    w: &mut W,
    outcome: &CloseOutcome,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        success("Closed", config),
        colorize_id(outcome.issue.id.as_str(), config)
    )?;
    if outcome.unblocked.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "Now ready ({}):", outcome.unblocked.len())?;
    for issue in &outcome.unblocked {
        write!(w, "  ")?;
        write_issue_line(w, issue, config)?;
    }
    Ok(())
}
