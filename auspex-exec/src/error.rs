//! Execution layer error types.

use auspex_domain::ExposureKey;
use thiserror::Error;

/// Errors that can occur during browser-driven execution operations.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// Browser control request failed (transport, protocol)
    #[error("Browser error: {0}")]
    Browser(String),

    /// A required element could not be located on the page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Timed out waiting for a page element or navigation
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A surface is already registered under this exposure key (bootstrap bug)
    #[error("Duplicate exposure key: {0}")]
    DuplicateKey(ExposureKey),

    /// No surface was provisioned for this exposure key
    #[error("Unknown exposure key: {0}")]
    UnknownKey(ExposureKey),
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors surfaced by the inbound message feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Failed to connect to the messaging platform
    #[error("Feed connection failed: {0}")]
    Connect(String),

    /// Authorization (login code / password) failed
    #[error("Feed authorization failed: {0}")]
    Auth(String),

    /// Transport-level error on the subscription
    #[error("Feed transport error: {0}")]
    Transport(String),

    /// Session file could not be loaded or saved
    #[error("Session persistence failed: {0}")]
    Session(String),

    /// Operator prompt failed
    #[error("Login prompt failed: {0}")]
    Prompt(String),
}

/// Errors surfaced by the classifier service.
///
/// These are never retried by the gateway; the router decides whether to
/// alert and drop the message.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// Transport-level failure reaching the service
    #[error("Classifier transport error: {0}")]
    Transport(String),

    /// The service answered with an error (auth, rate limit, bad request)
    #[error("Classifier service error: HTTP {status}: {message}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Error message from the service response body
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),
}
