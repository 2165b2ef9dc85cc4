//! Issue lifecycle service.
//!
//! [`IssueService`] owns every mutation of issues and enforces the invariants
//! the dependency graph itself does not: blocker and parent references must
//! exist, and a new blocking edge must not close a cycle.
//!
//! # Graph Cache
//!
//! The service keeps at most one [`DependencyGraph`], built lazily from a full
//! repository snapshot on first use. Every successful write drops it, so the
//! next query rebuilds from current data. There is no incremental update.
//!
//! # Example
//!
//! ```
//! use heddle::domain::NewIssue;
//! use heddle::repository::InMemoryRepository;
//! use heddle::service::IssueService;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut service = IssueService::new(Box::new(InMemoryRepository::new()), "hd");
//!
//!     let schema = service.create_issue(NewIssue::new("Design schema")).await?;
//!     let api = service
//!         .create_issue(NewIssue::new("Build API").blocked_by([schema.id.clone()]))
//!         .await?;
//!
//!     let ready = service.get_ready_issues(&Default::default()).await?;
//!     assert_eq!(ready.len(), 1);
//!
//!     let outcome = service.close_issue(&schema.id).await?;
//!     assert_eq!(outcome.unblocked[0].id, api.id);
//!     Ok(())
//! }
//! ```

use crate::domain::{
    sort_by_priority, Comment, Issue, IssueFilter, IssueId, IssueStatus, NewIssue, ReadyFilter,
    MAX_PRIORITY,
};
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::id_generation::IdGenerator;
use crate::repository::IssueRepository;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of closing an issue.
#[derive(Debug, Clone, Serialize)]
pub struct CloseOutcome {
    /// The issue after closing
    pub issue: Issue,

    /// Issues that became ready because of this close, by priority
    pub unblocked: Vec<Issue>,
}

/// An issue together with everything it transitively waits on.
#[derive(Debug, Clone, Serialize)]
pub struct IssueWithDependencies {
    /// The requested issue
    pub issue: Issue,

    /// Transitive blockers, each before anything it blocks
    pub dependencies: Vec<Issue>,
}

/// Counts describing the repository and its graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// All issues
    pub total: usize,
    /// Status `open`
    pub open: usize,
    /// Status `in_progress`
    pub in_progress: usize,
    /// Status `blocked` (manual)
    pub blocked: usize,
    /// Status `closed`
    pub closed: usize,
    /// Issues currently in the ready queue
    pub ready: usize,
    /// Blocking edges
    pub dependencies: usize,
    /// `blocked_by` entries naming an issue that doesn't exist
    pub dangling_references: usize,
    /// Whether the stored edges form a DAG
    pub acyclic: bool,
}

/// Lifecycle operations over an issue repository.
pub struct IssueService {
    repository: Box<dyn IssueRepository>,

    /// Valid until the next write; `None` means rebuild on next access.
    graph: Option<DependencyGraph>,

    /// Prefix for generated issue IDs
    id_prefix: String,
}

impl std::fmt::Debug for IssueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueService")
            .field("repository", &"<dyn IssueRepository>")
            .field("graph_cached", &self.graph.is_some())
            .field("id_prefix", &self.id_prefix)
            .finish()
    }
}

impl IssueService {
    /// Create a service over `repository`, generating IDs with `id_prefix`.
    pub fn new(repository: Box<dyn IssueRepository>, id_prefix: impl Into<String>) -> Self {
        Self {
            repository,
            graph: None,
            id_prefix: id_prefix.into(),
        }
    }

    /// Drop the cached graph so the next query rebuilds it.
    pub fn invalidate_graph(&mut self) {
        if self.graph.take().is_some() {
            debug!("Invalidated dependency graph");
        }
    }

    #[cfg(test)]
    fn is_graph_cached(&self) -> bool {
        self.graph.is_some()
    }

    /// The cached graph, building it from a fresh snapshot if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn graph(&mut self) -> Result<&DependencyGraph> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => {
                let issues = self.repository.read_all_issues().await?;
                let graph = DependencyGraph::build(&issues);
                debug!(
                    issues = graph.len(),
                    edges = graph.edge_count(),
                    "Built dependency graph"
                );
                graph
            }
        };
        let graph: &DependencyGraph = self.graph.insert(graph);
        Ok(graph)
    }

    async fn require_issue(&self, id: &IssueId) -> Result<Issue> {
        self.repository
            .read_issue(id)
            .await?
            .ok_or_else(|| Error::IssueNotFound(id.clone()))
    }

    /// Write `issue` and drop the cached graph.
    async fn persist(&mut self, issue: &Issue) -> Result<()> {
        self.repository.write_issue(issue).await?;
        self.invalidate_graph();
        Ok(())
    }

    // ========== Creation and Lookup ==========

    /// Create a new issue with status open.
    ///
    /// Repeated blocker IDs and labels are collapsed. No cycle check is
    /// needed: nothing can already point at a brand new ID.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidPriority` if priority is above 4
    /// - `Error::Validation` if the title is blank or too long
    /// - `Error::Dependency` if a blocker or the parent does not exist
    pub async fn create_issue(&mut self, new_issue: NewIssue) -> Result<Issue> {
        // === Phase 1: validation (no mutations) ===
        if new_issue.priority > MAX_PRIORITY {
            return Err(Error::InvalidPriority(new_issue.priority));
        }
        new_issue.validate().map_err(Error::Validation)?;

        for blocker_id in &new_issue.blocked_by {
            if !self.repository.exists(blocker_id).await? {
                return Err(Error::Dependency(format!(
                    "Cannot block by non-existent issue: {blocker_id}"
                )));
            }
        }
        if let Some(parent) = &new_issue.parent {
            if !self.repository.exists(parent).await? {
                return Err(Error::Dependency(format!("Parent issue not found: {parent}")));
            }
        }

        // === Phase 2: ID generation ===
        let existing = self.repository.read_all_issues().await?;
        let mut generator = IdGenerator::new(
            self.id_prefix.clone(),
            existing.into_iter().map(|issue| issue.id.0),
        );
        let id = IssueId::new(generator.generate(&new_issue.title, &new_issue.description)?);

        // === Phase 3: persist ===
        let now = Utc::now();
        let issue = Issue {
            id,
            title: new_issue.title,
            status: IssueStatus::Open,
            priority: new_issue.priority,
            issue_type: new_issue.issue_type,
            description: new_issue.description,
            design_notes: new_issue.design_notes,
            acceptance_criteria: new_issue.acceptance_criteria,
            labels: dedup_preserving_order(new_issue.labels),
            blocked_by: dedup_preserving_order(new_issue.blocked_by),
            parent: new_issue.parent,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
            closed_at: None,
        };

        self.persist(&issue).await?;
        info!(id = %issue.id, blockers = issue.blocked_by.len(), "Created issue");
        Ok(issue)
    }

    /// Look up an issue. Returns `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn get_issue(&self, id: &IssueId) -> Result<Option<Issue>> {
        self.repository.read_issue(id).await
    }

    // ========== Status Changes ==========

    /// Mark an issue as in progress.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn start_issue(&mut self, id: &IssueId) -> Result<Issue> {
        self.update_issue_status(id, IssueStatus::InProgress).await
    }

    /// Set an issue's status.
    ///
    /// Closing stamps `closed_at` only if it was never set. Reopening a
    /// closed issue keeps its original `closed_at`.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn update_issue_status(&mut self, id: &IssueId, status: IssueStatus) -> Result<Issue> {
        let mut issue = self.require_issue(id).await?;
        let previous = issue.status;
        issue.set_status(status, Utc::now());
        self.persist(&issue).await?;
        info!(id = %id, from = %previous, to = %status, "Updated issue status");
        Ok(issue)
    }

    /// Close an issue and report which issues it unblocked.
    ///
    /// An issue counts as unblocked when it lists `id` as a blocker, was not
    /// ready before the close, and is ready after it: all its other blockers
    /// are closed and it is not itself manually blocked or closed.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn close_issue(&mut self, id: &IssueId) -> Result<CloseOutcome> {
        let mut issue = self.require_issue(id).await?;

        let open_before: Vec<Issue> = self
            .repository
            .read_all_issues()
            .await?
            .into_iter()
            .filter(Issue::is_open)
            .collect();
        let open_after: Vec<Issue> = open_before
            .iter()
            .filter(|other| other.id != *id)
            .cloned()
            .collect();

        let graph = self.graph().await?;
        let dependents = graph.get_blocked_by_this(id);
        let ready_before: HashSet<&IssueId> = graph
            .get_unblocked(&open_before)
            .into_iter()
            .map(|ready| &ready.id)
            .collect();
        let mut unblocked: Vec<Issue> = graph
            .get_unblocked(&open_after)
            .into_iter()
            .filter(|ready| dependents.contains(&ready.id) && !ready_before.contains(&ready.id))
            .cloned()
            .collect();
        sort_by_priority(&mut unblocked);

        issue.set_status(IssueStatus::Closed, Utc::now());
        self.persist(&issue).await?;
        info!(id = %id, unblocked = unblocked.len(), "Closed issue");

        Ok(CloseOutcome { issue, unblocked })
    }

    // ========== Dependency Management ==========

    /// Make `issue_id` blocked by `blocked_by_id`.
    ///
    /// Adding a pair that already exists succeeds without writing.
    ///
    /// # Errors
    ///
    /// - `Error::IssueNotFound` if either issue doesn't exist
    /// - `Error::Dependency` if the edge would create a cycle (nothing is written)
    pub async fn add_dependency(&mut self, issue_id: &IssueId, blocked_by_id: &IssueId) -> Result<()> {
        let mut issue = self.require_issue(issue_id).await?;
        if !self.repository.exists(blocked_by_id).await? {
            return Err(Error::IssueNotFound(blocked_by_id.clone()));
        }

        if self.graph().await?.detect_cycle(issue_id, blocked_by_id) {
            return Err(Error::Dependency(format!(
                "Cannot add dependency: {issue_id} -> {blocked_by_id} would create a cycle"
            )));
        }

        if issue.blocked_by.contains(blocked_by_id) {
            debug!(id = %issue_id, blocker = %blocked_by_id, "Dependency already present");
            return Ok(());
        }

        issue.blocked_by.push(blocked_by_id.clone());
        issue.updated_at = Utc::now();
        self.persist(&issue).await?;
        info!(id = %issue_id, blocker = %blocked_by_id, "Added dependency");
        Ok(())
    }

    /// Stop `issue_id` from being blocked by `blocked_by_id`.
    ///
    /// Removing a blocker that isn't listed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if `issue_id` doesn't exist.
    pub async fn remove_dependency(
        &mut self,
        issue_id: &IssueId,
        blocked_by_id: &IssueId,
    ) -> Result<()> {
        let mut issue = self.require_issue(issue_id).await?;

        let before = issue.blocked_by.len();
        issue.blocked_by.retain(|id| id != blocked_by_id);
        if issue.blocked_by.len() == before {
            debug!(id = %issue_id, blocker = %blocked_by_id, "Dependency not present");
            return Ok(());
        }

        issue.updated_at = Utc::now();
        self.persist(&issue).await?;
        info!(id = %issue_id, blocker = %blocked_by_id, "Removed dependency");
        Ok(())
    }

    /// Direct blockers of an issue, in ID order.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn get_blockers(&mut self, id: &IssueId) -> Result<Vec<IssueId>> {
        self.require_issue(id).await?;
        Ok(self.graph().await?.get_blockers(id).into_iter().collect())
    }

    /// Issues directly blocked by an issue, in ID order.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn get_blocked_by_this(&mut self, id: &IssueId) -> Result<Vec<IssueId>> {
        self.require_issue(id).await?;
        Ok(self.graph().await?.get_blocked_by_this(id).into_iter().collect())
    }

    // ========== Comments ==========

    /// Append a timestamped comment.
    ///
    /// # Errors
    ///
    /// - `Error::IssueNotFound` if the issue doesn't exist
    /// - `Error::Validation` if the text is blank
    pub async fn add_comment(&mut self, id: &IssueId, text: &str) -> Result<Issue> {
        let mut issue = self.require_issue(id).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Comment cannot be empty".to_string()));
        }

        let now = Utc::now();
        issue.comments.push(Comment {
            text: text.to_string(),
            timestamp: now,
        });
        issue.updated_at = now;
        self.persist(&issue).await?;
        info!(id = %id, comments = issue.comments.len(), "Added comment");
        Ok(issue)
    }

    // ========== Queries ==========

    /// Issues matching `filter`, by priority then age.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .repository
            .read_all_issues()
            .await?
            .into_iter()
            .filter(|issue| filter.matches(issue))
            .collect();
        sort_by_priority(&mut issues);
        if let Some(limit) = filter.limit.filter(|&n| n > 0) {
            issues.truncate(limit);
        }
        Ok(issues)
    }

    /// Issues ready to work on, by priority then age.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn get_ready_issues(&mut self, filter: &ReadyFilter) -> Result<Vec<Issue>> {
        let open: Vec<Issue> = self
            .repository
            .read_all_issues()
            .await?
            .into_iter()
            .filter(Issue::is_open)
            .collect();

        let mut ready: Vec<Issue> = self
            .graph()
            .await?
            .get_unblocked(&open)
            .into_iter()
            .filter(|issue| issue.has_any_label(&filter.labels))
            .filter(|issue| filter.issue_type.is_none_or(|t| issue.issue_type == t))
            .cloned()
            .collect();

        sort_by_priority(&mut ready);
        if let Some(limit) = filter.limit.filter(|&n| n > 0) {
            ready.truncate(limit);
        }
        Ok(ready)
    }

    /// An issue plus its transitive blockers, deepest first.
    ///
    /// Blocker IDs that no longer resolve to a stored issue are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue doesn't exist.
    pub async fn get_issue_with_dependencies(&mut self, id: &IssueId) -> Result<IssueWithDependencies> {
        let issue = self.require_issue(id).await?;
        let order = self.graph().await?.get_transitive_blockers(id);

        let mut dependencies = Vec::with_capacity(order.len());
        for blocker_id in &order {
            match self.repository.read_issue(blocker_id).await? {
                Some(blocker) => dependencies.push(blocker),
                None => warn!(id = %id, blocker = %blocker_id, "Skipping missing blocker"),
            }
        }

        Ok(IssueWithDependencies {
            issue,
            dependencies,
        })
    }

    /// Status counts plus graph health.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn summary(&mut self) -> Result<Summary> {
        let issues = self.repository.read_all_issues().await?;

        let mut summary = issues.iter().fold(Summary::default(), |mut s, issue| {
            s.total += 1;
            match issue.status {
                IssueStatus::Open => s.open += 1,
                IssueStatus::InProgress => s.in_progress += 1,
                IssueStatus::Blocked => s.blocked += 1,
                IssueStatus::Closed => s.closed += 1,
            }
            s
        });

        let open: Vec<Issue> = issues.into_iter().filter(Issue::is_open).collect();
        let graph = self.graph().await?;
        summary.ready = graph.get_unblocked(&open).len();
        summary.dependencies = graph.edge_count();
        summary.dangling_references = graph.dangling_references().len();
        summary.acyclic = graph.is_acyclic();
        Ok(summary)
    }
}

fn dedup_preserving_order<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn service() -> IssueService {
        IssueService::new(Box::new(InMemoryRepository::new()), "hd")
    }

    #[test]
    fn test_dedup_preserving_order() {
        let deduped = dedup_preserving_order(vec!["b", "a", "b", "c", "a"]);
        assert_eq!(deduped, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_graph_is_cached_until_write() {
        let mut service = service();
        let a = service.create_issue(NewIssue::new("A")).await.unwrap();
        assert!(!service.is_graph_cached());

        service.get_ready_issues(&ReadyFilter::default()).await.unwrap();
        assert!(service.is_graph_cached());

        service.start_issue(&a.id).await.unwrap();
        assert!(!service.is_graph_cached());
    }

    #[tokio::test]
    async fn test_noop_operations_keep_cache() {
        let mut service = service();
        let a = service.create_issue(NewIssue::new("A")).await.unwrap();
        let b = service
            .create_issue(NewIssue::new("B").blocked_by([a.id.clone()]))
            .await
            .unwrap();

        service.graph().await.unwrap();
        service.add_dependency(&b.id, &a.id).await.unwrap();
        assert!(service.is_graph_cached());

        service
            .remove_dependency(&a.id, &IssueId::new("hd-none"))
            .await
            .unwrap();
        assert!(service.is_graph_cached());
    }

    #[tokio::test]
    async fn test_rebuilt_graph_sees_new_edge() {
        let mut service = service();
        let a = service.create_issue(NewIssue::new("A")).await.unwrap();
        let b = service.create_issue(NewIssue::new("B")).await.unwrap();

        assert!(service.graph().await.unwrap().get_blockers(&b.id).is_empty());
        service.add_dependency(&b.id, &a.id).await.unwrap();
        assert!(service.graph().await.unwrap().get_blockers(&b.id).contains(&a.id));
    }

    #[tokio::test]
    async fn test_create_collapses_duplicate_blockers() {
        let mut service = service();
        let a = service.create_issue(NewIssue::new("A")).await.unwrap();
        let b = service
            .create_issue(
                NewIssue::new("B")
                    .blocked_by([a.id.clone(), a.id.clone()])
                    .with_labels(["x", "x", "y"]),
            )
            .await
            .unwrap();
        assert_eq!(b.blocked_by, vec![a.id]);
        assert_eq!(b.labels, vec!["x".to_string(), "y".to_string()]);
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let mut service = service();
        let a = service.create_issue(NewIssue::new("A")).await.unwrap();
        let b = service
            .create_issue(NewIssue::new("B").blocked_by([a.id.clone()]))
            .await
            .unwrap();
        let c = service.create_issue(NewIssue::new("C")).await.unwrap();
        service.update_issue_status(&c.id, IssueStatus::Blocked).await.unwrap();
        service.start_issue(&b.id).await.unwrap();

        let summary = service.summary().await.unwrap();
        assert_eq!(
            summary,
            Summary {
                total: 3,
                open: 1,
                in_progress: 1,
                blocked: 1,
                closed: 0,
                ready: 1,
                dependencies: 1,
                dangling_references: 0,
                acyclic: true,
            }
        );
    }
}
