//! Daemon error types.

use auspex_domain::DomainError;
use auspex_exec::{ClassifyError, ExecError, FeedError};
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Execution error
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// Classifier error
    #[error("Classifier error: {0}")]
    Classify(#[from] ClassifyError),

    /// Message feed error
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operator console I/O error
    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
