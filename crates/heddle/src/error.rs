//! Error types for heddle operations.

use crate::domain::IssueId;
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for heddle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced issue does not exist.
    #[error("Issue not found: {0}")]
    IssueNotFound(IssueId),

    /// A dependency or parent reference is invalid, or would create a cycle.
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Issue fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Priority outside 0-4.
    #[error("Invalid priority {0}: must be between 0 and 4")]
    InvalidPriority(u8),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSONL encoding or file error.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] heddle_jsonl::Error),

    /// ID generation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while locating or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.heddle/` directory found walking up from the working directory.
    #[error("Not a heddle repository (or any parent up to the filesystem root). Run 'heddle init' first")]
    NotInitialized,

    /// `.heddle/` already exists.
    #[error("Heddle is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// The configuration file could not be parsed or written.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Unknown storage backend name in the configuration.
    #[error("Unknown storage backend '{0}'. Valid backends: memory, jsonl")]
    UnknownBackend(String),

    /// Issue prefix does not meet format requirements.
    #[error("Invalid issue prefix: {0}")]
    InvalidPrefix(String),
}

/// A specialized Result type for heddle operations.
pub type Result<T> = std::result::Result<T, Error>;
