//! JSONL-backed repository.
//!
//! The file is read once on open into an in-memory map. Every
//! [`IssueRepository::write_issue`] updates the map and atomically rewrites
//! the whole file, so a write is on disk before the call returns. If the
//! rewrite fails the map change is rolled back.

use super::IssueRepository;
use crate::domain::{Issue, IssueId};
use crate::error::Result;
use async_trait::async_trait;
use heddle_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning as JsonlWarning};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Non-fatal problems found while loading an issues file.
///
/// Loading continues past these; the affected data is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be parsed as an issue and was skipped.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A line was not valid UTF-8 and was skipped.
    InvalidUtf8 {
        /// 1-based line number
        line_number: usize,
    },

    /// The same ID appeared more than once; the last occurrence wins.
    DuplicateId {
        /// The repeated ID
        issue_id: IssueId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "skipped malformed issue at line {line_number}: {error}")
            }
            Self::InvalidUtf8 { line_number } => {
                write!(f, "skipped undecodable issue at line {line_number}: not valid UTF-8")
            }
            Self::DuplicateId { issue_id } => {
                write!(f, "duplicate issue {issue_id}; kept the last occurrence")
            }
        }
    }
}

impl From<JsonlWarning> for LoadWarning {
    fn from(warning: JsonlWarning) -> Self {
        match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                Self::MalformedJson { line_number, error }
            }
            JsonlWarning::InvalidUtf8 { line_number } => Self::InvalidUtf8 { line_number },
        }
    }
}

/// Issue repository persisted as a JSON Lines file.
#[derive(Debug)]
pub struct JsonlRepository {
    path: PathBuf,
    issues: Mutex<BTreeMap<IssueId, Issue>>,
}

impl JsonlRepository {
    /// Load the repository from `path`. A missing file loads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<(Self, Vec<LoadWarning>)> {
        let path = path.into();
        let (loaded, jsonl_warnings) = read_jsonl_resilient::<Issue, _>(&path).await?;

        let mut warnings: Vec<LoadWarning> = jsonl_warnings.into_iter().map(Into::into).collect();
        let mut issues = BTreeMap::new();
        for issue in loaded {
            if let Some(previous) = issues.insert(issue.id.clone(), issue) {
                warnings.push(LoadWarning::DuplicateId {
                    issue_id: previous.id,
                });
            }
        }

        tracing::debug!(
            path = %path.display(),
            count = issues.len(),
            warnings = warnings.len(),
            "Loaded issues"
        );

        Ok((
            Self {
                path,
                issues: Mutex::new(issues),
            },
            warnings,
        ))
    }
}

#[async_trait]
impl IssueRepository for JsonlRepository {
    async fn read_all_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.issues.lock().await.values().cloned().collect())
    }

    async fn read_issue(&self, id: &IssueId) -> Result<Option<Issue>> {
        Ok(self.issues.lock().await.get(id).cloned())
    }

    async fn write_issue(&self, issue: &Issue) -> Result<()> {
        let mut issues = self.issues.lock().await;
        let previous = issues.insert(issue.id.clone(), issue.clone());

        if let Err(e) = write_jsonl_atomic(&self.path, issues.values()).await {
            match previous {
                Some(old) => issues.insert(old.id.clone(), old),
                None => issues.remove(&issue.id),
            };
            return Err(e.into());
        }
        Ok(())
    }

    async fn exists(&self, id: &IssueId) -> Result<bool> {
        Ok(self.issues.lock().await.contains_key(id))
    }
}
