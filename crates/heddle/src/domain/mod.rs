//! Domain types for issue tracking.
//!
//! This module contains the issue entity, its lifecycle status, and the
//! request/filter types consumed by the lifecycle service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Highest urgency priority.
pub const MIN_PRIORITY: u8 = 0;

/// Lowest urgency priority.
pub const MAX_PRIORITY: u8 = 4;

/// Priority assigned when none is given.
pub const DEFAULT_PRIORITY: u8 = 2;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Number of hex characters kept from the content hash.
const CONTENT_HASH_LENGTH: usize = 12;

/// Unique identifier for an issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl IssueId {
    /// Create a new issue ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Issue is open and waiting to be picked up
    Open,

    /// Issue is currently being worked on
    InProgress,

    /// Issue was manually marked as blocked; never ready regardless of blockers
    Blocked,

    /// Issue has been completed
    Closed,
}

impl IssueStatus {
    /// Whether this status counts as open (anything but closed).
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Type of issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// General task
    #[default]
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

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Epic => "epic",
            Self::Chore => "chore",
        };
        f.write_str(s)
    }
}

/// A timestamped note attached to an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body
    pub text: String,

    /// When the comment was added
    pub timestamp: DateTime<Utc>,
}

/// Represents an issue in the tracking system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier for the issue
    pub id: IssueId,

    /// Issue title
    pub title: String,

    /// Current status
    pub status: IssueStatus,

    /// Priority level (0 = highest, 4 = lowest)
    pub priority: u8,

    /// Issue type
    #[serde(default, rename = "type")]
    pub issue_type: IssueType,

    /// Issue description
    #[serde(default)]
    pub description: String,

    /// Design notes
    #[serde(default)]
    pub design_notes: String,

    /// Acceptance criteria checklist
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,

    /// Labels
    #[serde(default)]
    pub labels: Vec<String>,

    /// IDs of issues that must close before this one is ready
    #[serde(default)]
    pub blocked_by: Vec<IssueId>,

    /// Parent issue, if any
    #[serde(default)]
    pub parent: Option<IssueId>,

    /// Comments in the order they were added
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Timestamp of the first close
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Whether the issue is open (open, in progress or blocked).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Short SHA-256 digest of title, description and design notes.
    ///
    /// Two issues with the same digest are likely duplicates.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let content = format!("{}|{}|{}", self.title, self.description, self.design_notes);
        let digest = Sha256::digest(content.as_bytes());
        let mut hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        hex.truncate(CONTENT_HASH_LENGTH);
        hex
    }

    /// Whether the issue carries at least one of `labels`.
    ///
    /// An empty `labels` slice matches every issue.
    #[must_use]
    pub fn has_any_label(&self, labels: &[String]) -> bool {
        labels.is_empty() || labels.iter().any(|l| self.labels.contains(l))
    }

    /// Set the status, stamping `closed_at` on the first close.
    ///
    /// Reopening keeps the original `closed_at`.
    pub fn set_status(&mut self, status: IssueStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == IssueStatus::Closed && self.closed_at.is_none() {
            self.closed_at = Some(now);
        }
        self.updated_at = now;
    }
}

/// Ordering used by listings and the ready queue: priority, then age, then ID.
pub fn sort_by_priority(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

/// Check a title is non-blank and within [`MAX_TITLE_LENGTH`].
///
/// # Errors
///
/// Returns a message describing the violation.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Check a priority is within `MIN_PRIORITY..=MAX_PRIORITY`.
///
/// # Errors
///
/// Returns a message describing the violation.
pub fn validate_priority(priority: u8) -> Result<(), String> {
    if priority > MAX_PRIORITY {
        return Err(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        ));
    }
    Ok(())
}

/// Data for creating a new issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title
    pub title: String,

    /// Priority level (0-4)
    pub priority: u8,

    /// Issue type
    pub issue_type: IssueType,

    /// Issue description
    pub description: String,

    /// Design notes
    pub design_notes: String,

    /// Acceptance criteria checklist
    pub acceptance_criteria: Vec<String>,

    /// Labels
    pub labels: Vec<String>,

    /// Blockers; each must already exist
    pub blocked_by: Vec<IssueId>,

    /// Parent issue; must already exist
    pub parent: Option<IssueId>,
}

impl NewIssue {
    /// A new task with the given title and default priority.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: DEFAULT_PRIORITY,
            issue_type: IssueType::Task,
            description: String::new(),
            design_notes: String::new(),
            acceptance_criteria: Vec::new(),
            labels: Vec::new(),
            blocked_by: Vec::new(),
            parent: None,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the blockers.
    #[must_use]
    pub fn blocked_by<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = IssueId>,
    {
        self.blocked_by = ids.into_iter().collect();
        self
    }

    /// Set the parent.
    #[must_use]
    pub fn with_parent(mut self, parent: IssueId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Validate title and priority.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_priority(self.priority)
    }
}

/// Filter for listing issues
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Only issues with this status. Naming a status, closed included,
    /// overrides `include_closed`.
    pub status: Option<IssueStatus>,

    /// Keep closed issues when no status is given
    pub include_closed: bool,

    /// Only issues carrying at least one of these labels
    pub labels: Vec<String>,

    /// Only issues of this type
    pub issue_type: Option<IssueType>,

    /// Maximum number of results; 0 means no limit
    pub limit: Option<usize>,
}

impl IssueFilter {
    /// Whether `issue` passes the status, label and type criteria.
    ///
    /// Without a status, closed issues only pass when `include_closed` is set.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        let status_ok = match self.status {
            Some(status) => issue.status == status,
            None => self.include_closed || issue.is_open(),
        };
        status_ok
            && issue.has_any_label(&self.labels)
            && self.issue_type.is_none_or(|t| issue.issue_type == t)
    }
}

/// Filter for the ready queue
#[derive(Debug, Clone, Default)]
pub struct ReadyFilter {
    /// Only issues carrying at least one of these labels
    pub labels: Vec<String>,

    /// Only issues of this type
    pub issue_type: Option<IssueType>,

    /// Maximum number of results; 0 means no limit
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(title: &str) -> Issue {
        let now = Utc::now();
        Issue {
            id: IssueId::new("hd-test"),
            title: title.to_string(),
            status: IssueStatus::Open,
            priority: DEFAULT_PRIORITY,
            issue_type: IssueType::Task,
            description: String::new(),
            design_notes: String::new(),
            acceptance_criteria: vec![],
            labels: vec!["backend".to_string()],
            blocked_by: vec![],
            parent: None,
            comments: vec![],
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    #[test]
    fn test_is_open_covers_all_non_closed_statuses() {
        assert!(IssueStatus::Open.is_open());
        assert!(IssueStatus::InProgress.is_open());
        assert!(IssueStatus::Blocked.is_open());
        assert!(!IssueStatus::Closed.is_open());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&IssueStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(IssueStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_content_hash_is_stable_and_short() {
        let a = issue("Same");
        let mut b = issue("Same");
        b.id = IssueId::new("hd-other");
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 12);
        assert_ne!(a.content_hash(), issue("Different").content_hash());
    }

    #[test]
    fn test_set_status_keeps_first_close_time() {
        let mut i = issue("Close me");
        let first = Utc::now();
        i.set_status(IssueStatus::Closed, first);
        i.set_status(IssueStatus::Open, first + chrono::Duration::seconds(5));
        i.set_status(IssueStatus::Closed, first + chrono::Duration::seconds(10));
        assert_eq!(i.closed_at, Some(first));
    }

    #[test]
    fn test_has_any_label() {
        let i = issue("Labelled");
        assert!(i.has_any_label(&[]));
        assert!(i.has_any_label(&["frontend".to_string(), "backend".to_string()]));
        assert!(!i.has_any_label(&["frontend".to_string()]));
    }

    #[test]
    fn test_validate_title_and_priority() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title("ok").is_ok());
        assert!(validate_priority(MAX_PRIORITY).is_ok());
        assert!(validate_priority(MAX_PRIORITY + 1).is_err());
    }

    #[test]
    fn test_issue_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "hd-ab12",
            "title": "Minimal",
            "status": "open",
            "priority": 1,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.issue_type, IssueType::Task);
        assert!(issue.blocked_by.is_empty());
        assert!(issue.closed_at.is_none());
    }

    #[test]
    fn test_filter_hides_closed_unless_asked() {
        let open = issue("Open");
        let mut closed = issue("Closed");
        closed.set_status(IssueStatus::Closed, Utc::now());

        let default = IssueFilter::default();
        assert!(default.matches(&open));
        assert!(!default.matches(&closed));

        let everything = IssueFilter {
            include_closed: true,
            ..Default::default()
        };
        assert!(everything.matches(&closed));

        let only_closed = IssueFilter {
            status: Some(IssueStatus::Closed),
            ..Default::default()
        };
        assert!(only_closed.matches(&closed));
        assert!(!only_closed.matches(&open));
    }
}
