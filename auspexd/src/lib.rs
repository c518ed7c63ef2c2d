//! Auspex Daemon Library
//!
//! Runtime orchestrator for the signal-to-action pipeline.
//!
//! # Architecture
//!
//! ```text
//! Telegram Feed → Dispatcher → Signal Router → Classifier Gateway → LLM
//!                                    ↓
//!                            Surface Registry → Execution Surface → Browser
//!                                    ↑
//!                  Bootstrap (one-time login + provisioning)
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator (feed loop, reconnect, shutdown)
//! - **Signal Router**: Per-message state machine to a terminal disposition
//! - **Bootstrap**: One-time authentication and surface provisioning
//! - **Config**: Environment-based configuration
//! - **Alert / Console**: Operator-facing side channels
//!
//! # Example
//!
//! ```rust,ignore
//! use auspexd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     // ... bootstrap, then:
//!     // daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod alert;
pub mod bootstrap;
pub mod config;
pub mod console;
pub mod daemon;
pub mod error;
pub mod router;

// Re-exports for convenience
pub use alert::SoundAlerter;
pub use bootstrap::{provision, ProvisionedSurfaces};
pub use config::{AlertConfig, BrowserConfig, ClassifierConfig, Config, SignalConfig, TelegramConfig};
pub use console::StdinPrompt;
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use router::{SignalDisposition, SignalRouter};
