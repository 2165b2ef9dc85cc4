//! Application context for CLI command execution.
//!
//! ```no_run
//! use heddle::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = App::from_directory(Path::new(".")).await?;
//!     let ready = app.service_mut().get_ready_issues(&Default::default()).await?;
//!     println!("{} ready", ready.len());
//!     Ok(())
//! }
//! ```

use crate::config::{find_heddle_root, HeddleConfig, CONFIG_FILE_NAME, HEDDLE_DIR_NAME};
use crate::error::{ConfigError, Result};
use crate::repository::{open_repository, LoadWarning, RepositoryBackend};
use crate::service::IssueService;
use std::path::{Path, PathBuf};

/// A loaded repository ready to run commands against.
#[derive(Debug)]
pub struct App {
    service: IssueService,
    heddle_dir: PathBuf,
    backend: RepositoryBackend,
    prefix: String,
    load_warnings: Vec<LoadWarning>,
}

impl App {
    /// Locate `.heddle/` at or above `working_dir`, load its configuration
    /// and open the configured repository.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no repository is found
    /// - any error from loading configuration or opening storage
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_heddle_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let heddle_dir = root_dir.join(HEDDLE_DIR_NAME);

        let config = HeddleConfig::load(&heddle_dir.join(CONFIG_FILE_NAME)).await?;
        let backend = config.storage.to_backend(&root_dir)?;
        tracing::debug!(root = %root_dir.display(), ?backend, "Opening repository");

        let (repository, load_warnings) = open_repository(backend.clone()).await?;

        Ok(Self {
            service: IssueService::new(repository, config.issue_prefix.clone()),
            heddle_dir,
            backend,
            prefix: config.issue_prefix,
            load_warnings,
        })
    }

    /// The lifecycle service.
    #[must_use]
    pub fn service(&self) -> &IssueService {
        &self.service
    }

    /// The lifecycle service, for mutations and graph queries.
    pub fn service_mut(&mut self) -> &mut IssueService {
        &mut self.service
    }

    /// Issue ID prefix from configuration.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of the `.heddle` directory.
    #[must_use]
    pub fn heddle_dir(&self) -> &Path {
        &self.heddle_dir
    }

    /// The storage backend resolved from configuration.
    #[must_use]
    pub fn backend(&self) -> &RepositoryBackend {
        &self.backend
    }

    /// Problems found while loading the data file.
    #[must_use]
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }
}
