//! Unified error types for git-branch-status

use thiserror::Error;

/// Unified error type for all git-branch-status operations
#[derive(Error, Debug)]
pub enum BranchStatusError {
    // Repository provider errors
    #[error("Git command failed: {0}")]
    Git(String),

    #[error("Cannot open Git repository: {0}")]
    RepositoryOpen(String),

    #[error("Cannot get head")]
    HeadUnavailable,

    // Terminal session errors
    #[error("Session error: {0}")]
    Session(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using BranchStatusError
pub type Result<T> = std::result::Result<T, BranchStatusError>;
