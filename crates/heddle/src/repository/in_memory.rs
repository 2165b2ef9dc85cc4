//! In-memory repository.
//!
//! Data lives in a `BTreeMap` behind `Arc<Mutex<_>>` and is lost when the
//! process exits. Cloning the repository shares the same map, which lets a
//! test keep a handle while the service owns a boxed copy.

use super::IssueRepository;
use crate::domain::{Issue, IssueId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory issue store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    issues: Arc<Mutex<BTreeMap<IssueId, Issue>>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `issues`.
    ///
    /// No validation is applied, which makes this the way to load snapshots
    /// that contain dangling references or cycles.
    #[must_use]
    pub fn with_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let map = issues
            .into_iter()
            .map(|issue| (issue.id.clone(), issue))
            .collect();
        Self {
            issues: Arc::new(Mutex::new(map)),
        }
    }
}

#[async_trait]
impl IssueRepository for InMemoryRepository {
    async fn read_all_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.issues.lock().await.values().cloned().collect())
    }

    async fn read_issue(&self, id: &IssueId) -> Result<Option<Issue>> {
        Ok(self.issues.lock().await.get(id).cloned())
    }

    async fn write_issue(&self, issue: &Issue) -> Result<()> {
        self.issues
            .lock()
            .await
            .insert(issue.id.clone(), issue.clone());
        Ok(())
    }

    async fn exists(&self, id: &IssueId) -> Result<bool> {
        Ok(self.issues.lock().await.contains_key(id))
    }
}
