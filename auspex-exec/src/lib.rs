//! Auspex Execution Layer
//!
//! Signal-to-action plumbing between the router and the external systems.
//!
//! # Architecture
//!
//! ```text
//! Router → ClassifierGateway → CompletionPort (LLM)
//!        → SurfaceRegistry → ExecutionSurface → BrowserPort (trade click)
//!                                 ↑
//!                          PopupSuppressor (background, bounded)
//! ```
//!
//! # Components
//!
//! - **Ports**: Traits defining interfaces for the browser control surface,
//!   the classifier service, the operator alert channel, and the operator
//!   console prompts
//! - **Classifier Gateway**: Deterministic single-token instruction + output
//!   normalization around the completion port
//! - **Execution Surface / Registry**: One pre-authenticated page per
//!   exposure key, resolved read-only after bootstrap
//! - **Popup Suppressor**: Supervised bounded-lifetime overlay dismissal
//! - **Stub**: Test implementations for development

#![warn(clippy::all)]

pub mod classifier;
pub mod error;
pub mod ports;
pub mod registry;
pub mod stub;
pub mod suppressor;
pub mod surface;

// Re-exports for convenience
pub use classifier::ClassifierGateway;
pub use error::{ClassifyError, ExecError, ExecResult, FeedError};
pub use ports::{
    AlertPort, BrowserPort, CompletionPort, CompletionRequest, FeedPort, Locator, OperatorPrompt,
    PageHandle, PageOptions, SessionCookie,
};
pub use registry::SurfaceRegistry;
pub use stub::{RecordedClick, ScriptedCompletion, ScriptedFeed, ScriptedPrompt, StubBrowser};
pub use suppressor::PopupSuppressor;
pub use surface::ExecutionSurface;
