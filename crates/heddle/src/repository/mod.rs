//! Issue repository abstraction.
//!
//! The lifecycle service reads a complete issue snapshot from a repository,
//! builds the dependency graph from it, and writes individual issues back.
//! Two backends are provided:
//!
//! - **In-memory**: ephemeral, for tests and throwaway sessions
//! - **JSONL**: one issue per line in `.heddle/issues.jsonl`, rewritten
//!   atomically on every write
//!
//! # Architecture
//!
//! The trait is async so file-backed implementations can use tokio I/O; it is
//! object-safe, and the service holds a `Box<dyn IssueRepository>`.
//!
//! # Example
//!
//! ```
//! use heddle::repository::{open_repository, IssueRepository, RepositoryBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let (repo, warnings) = open_repository(RepositoryBackend::InMemory).await?;
//!     assert!(warnings.is_empty());
//!     assert!(repo.read_all_issues().await?.is_empty());
//!     Ok(())
//! }
//! ```

use crate::domain::{Issue, IssueId};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryRepository;
pub use jsonl::{JsonlRepository, LoadWarning};

/// Storage contract consumed by the lifecycle service.
///
/// # Method Categories
///
/// - **Reads**: `read_all_issues`, `read_issue`, `exists`
/// - **Writes**: `write_issue` (upsert by ID)
///
/// # Durability
///
/// `write_issue` must not return until the write is durable for the backend
/// in question. Validation of issue contents and references is the caller's
/// job; repositories store what they are given.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Full snapshot of stored issues. Order is not significant.
    async fn read_all_issues(&self) -> Result<Vec<Issue>>;

    /// Look up one issue. Returns `None` if it doesn't exist.
    async fn read_issue(&self, id: &IssueId) -> Result<Option<Issue>>;

    /// Insert or replace the issue with `issue.id`.
    async fn write_issue(&self, issue: &Issue) -> Result<()>;

    /// Whether an issue with `id` is stored.
    async fn exists(&self, id: &IssueId) -> Result<bool> {
        Ok(self.read_issue(id).await?.is_some())
    }
}

/// Repository backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl RepositoryBackend {
    /// Returns the data file path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            Self::Jsonl(path) => Some(path),
            Self::InMemory => None,
        }
    }
}

/// Open a repository for the given backend.
///
/// Returns the repository together with any non-fatal problems found while
/// loading existing data.
///
/// # Errors
///
/// Returns an error if the backing file exists but cannot be read.
pub async fn open_repository(
    backend: RepositoryBackend,
) -> Result<(Box<dyn IssueRepository>, Vec<LoadWarning>)> {
    match backend {
        RepositoryBackend::InMemory => Ok((Box::new(InMemoryRepository::new()), Vec::new())),
        RepositoryBackend::Jsonl(path) => {
            let (repo, warnings) = JsonlRepository::open(path).await?;
            Ok((Box::new(repo), warnings))
        }
    }
}
