//! Auspex Connectors
//!
//! Real adapters for the external collaborators:
//! - `WebDriverBrowser` - browser control over the W3C WebDriver REST protocol
//! - `OpenAiClient` - classifier service over the chat completions API
//! - `TelegramFeed` - inbound message stream over an MTProto user session

#![warn(clippy::all)]

pub mod openai;
pub mod telegram;
pub mod webdriver;

// Re-exports for convenience
pub use openai::OpenAiClient;
pub use telegram::{normalize_channel_id, TelegramCredentials, TelegramFeed};
pub use webdriver::{WebDriverBrowser, WebDriverError};
