//! Repository configuration and initialization.
//!
//! A heddle repository is a directory containing `.heddle/`, which holds
//! `config.yaml`, the `issues.jsonl` data file, and a `.gitignore`.

use crate::error::{ConfigError, Result};
use crate::repository::RepositoryBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Issue prefix used when `init` is given none
pub const DEFAULT_PREFIX: &str = "hd";

/// Name of the heddle directory
pub const HEDDLE_DIR_NAME: &str = ".heddle";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the issues data file
pub const ISSUES_FILE_NAME: &str = "issues.jsonl";

/// Name of the gitignore file within `.heddle`
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// How many parent directories to check when looking for `.heddle/`
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.heddle/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeddleConfig {
    /// Issue ID prefix (e.g. "hd" for "hd-a3f8")
    #[serde(rename = "issue-prefix")]
    pub issue_prefix: String,

    /// Storage section
    pub storage: StorageConfig,
}

/// `storage:` section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend name: `jsonl` or `memory`
    pub backend: String,

    /// Data file, relative to the repository root
    pub data_file: String,
}

impl StorageConfig {
    /// Resolve this section into a backend rooted at `root_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognised name.
    pub fn to_backend(&self, root_dir: &Path) -> Result<RepositoryBackend> {
        match self.backend.as_str() {
            "jsonl" => Ok(RepositoryBackend::Jsonl(root_dir.join(&self.data_file))),
            "memory" => Ok(RepositoryBackend::InMemory),
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl HeddleConfig {
    /// Configuration for a fresh repository using `prefix`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            issue_prefix: prefix.to_string(),
            storage: StorageConfig {
                backend: "jsonl".to_string(),
                data_file: format!("{HEDDLE_DIR_NAME}/{ISSUES_FILE_NAME}"),
            },
        }
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid YAML, or if
    /// the stored prefix is invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_prefix(&config.issue_prefix)?;
        Ok(config)
    }

    /// Write configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for HeddleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Paths created by [`init`]
#[derive(Debug)]
pub struct InitResult {
    /// The `.heddle` directory
    pub heddle_dir: PathBuf,
    /// `config.yaml`
    pub config_file: PathBuf,
    /// `issues.jsonl`
    pub issues_file: PathBuf,
    /// The prefix written to the configuration
    pub prefix: String,
}

/// Check an issue ID prefix: 2-20 ASCII letters or digits.
///
/// Input is expected to be trimmed already.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPrefix` describing the first violated rule.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "must be at least {MIN_PREFIX_LENGTH} characters"
        ))
        .into());
    }
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "cannot exceed {MAX_PREFIX_LENGTH} characters"
        ))
        .into());
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPrefix(
            "must contain only alphanumeric characters".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Create `.heddle/` in `base_dir`.
///
/// # Errors
///
/// Returns an error if `.heddle/` already exists, the prefix is invalid, or
/// a file can't be written.
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let heddle_dir = base_dir.join(HEDDLE_DIR_NAME);
    if heddle_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(HEDDLE_DIR_NAME.to_string()).into());
    }
    fs::create_dir_all(&heddle_dir).await?;

    let config_file = heddle_dir.join(CONFIG_FILE_NAME);
    HeddleConfig::new(prefix).save(&config_file).await?;

    let issues_file = heddle_dir.join(ISSUES_FILE_NAME);
    fs::write(&issues_file, "").await?;

    // Leftover temp files from interrupted atomic writes
    fs::write(heddle_dir.join(GITIGNORE_FILE_NAME), "*.tmp\n").await?;

    tracing::info!(path = %heddle_dir.display(), prefix, "Initialized repository");

    Ok(InitResult {
        heddle_dir,
        config_file,
        issues_file,
        prefix: prefix.to_string(),
    })
}

/// Walk up from `start_dir` to the nearest directory containing `.heddle/`.
///
/// Gives up at the filesystem root or after [`MAX_TRAVERSAL_DEPTH`] parents.
#[must_use]
pub fn find_heddle_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    for _ in 0..=MAX_TRAVERSAL_DEPTH {
        if current.join(HEDDLE_DIR_NAME).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
    None
}
