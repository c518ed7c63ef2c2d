//! Execution layer port definitions.
//!
//! Ports define the interfaces for external collaborators (browser control,
//! classifier service, operator alert, operator console). Adapters implement
//! these ports for specific services (WebDriver, OpenAI, stubs).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

use auspex_domain::InboundMessage;

use crate::error::{ClassifyError, ExecResult, FeedError};

// =============================================================================
// Browser Port
// =============================================================================

/// Opaque handle to one browser page.
///
/// Each page owns an isolated, freshly created browser context: cookies added
/// to one page are never visible to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageHandle(String);

impl PageHandle {
    /// Wrap an adapter-assigned page id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The adapter-assigned page id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How to locate an element on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector (selector lists allowed)
    Css(String),
    /// Exact visible text match
    Text(String),
}

impl Locator {
    /// CSS selector locator.
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// Visible-text locator.
    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::Text(text) => write!(f, "text={}", text),
        }
    }
}

/// Options applied when a new page (context) is created.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Auto-dismiss native dialogs (alerts, prompts) on this page
    pub dismiss_dialogs: bool,
    /// Viewport size as (width, height); adapter default when `None`
    pub viewport: Option<(u32, u32)>,
}

/// A browser session cookie, in WebDriver wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Path the cookie applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Secure flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// HttpOnly flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// Expiry as unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

/// Port for the browser control surface.
///
/// Implementations:
/// - `StubBrowser` - For testing (records every operation)
/// - `WebDriverBrowser` - Real browser over the WebDriver REST protocol
///   (auspex-connectors)
#[async_trait]
pub trait BrowserPort: Send + Sync {
    /// Open a fresh page in a new, isolated browser context.
    async fn open_page(&self, options: PageOptions) -> ExecResult<PageHandle>;

    /// Navigate a page to a URL.
    async fn goto(&self, page: &PageHandle, url: &str) -> ExecResult<()>;

    /// Add cookies to a page's context.
    ///
    /// The page should already be on the cookie domain's origin.
    async fn add_cookies(&self, page: &PageHandle, cookies: &[SessionCookie]) -> ExecResult<()>;

    /// Read all cookies visible to a page.
    async fn cookies(&self, page: &PageHandle) -> ExecResult<Vec<SessionCookie>>;

    /// Fill a form field located by CSS selector.
    async fn fill(&self, page: &PageHandle, selector: &str, value: &str) -> ExecResult<()>;

    /// Wait for an element to be present.
    ///
    /// Returns `Ok(false)` when the element did not appear within the
    /// timeout; `Err` is reserved for transport failures.
    async fn wait_for(
        &self,
        page: &PageHandle,
        locator: &Locator,
        timeout: Duration,
    ) -> ExecResult<bool>;

    /// Click an element.
    ///
    /// With `force`, the click is dispatched directly to the element even if
    /// another element would intercept it (overlay dismissal needs this).
    async fn click(&self, page: &PageHandle, locator: &Locator, force: bool) -> ExecResult<()>;

    /// Close a page and release its context.
    async fn close_page(&self, page: &PageHandle) -> ExecResult<()>;
}

// =============================================================================
// Completion Port
// =============================================================================

/// A single text-in/text-out request to the classifier service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Disable sampling (temperature 0)
    pub deterministic: bool,
    /// Maximum output length in tokens
    pub max_tokens: u32,
}

/// Port for the text classification service.
///
/// The response is treated as opaque text; all interpretation happens in the
/// classifier gateway.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Execute one completion request.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ClassifyError>;
}

// =============================================================================
// Feed Port
// =============================================================================

/// Port for the inbound message stream.
///
/// Implementations:
/// - `ScriptedFeed` - For testing (emits canned sessions)
/// - `TelegramFeed` - Real channel subscription over an MTProto user session
///   (auspex-connectors)
#[async_trait]
pub trait FeedPort: Send + Sync {
    /// Pump subscribed-channel messages into `sender` until the transport
    /// drops.
    ///
    /// Returns `Ok(())` only when the receiving side has shut down; transport
    /// errors are returned so the caller can apply its reconnect policy.
    async fn run(&self, sender: mpsc::Sender<InboundMessage>) -> Result<(), FeedError>;
}

// =============================================================================
// Operator Ports
// =============================================================================

/// Port for the operator-facing alert channel.
///
/// Best-effort by contract: implementations must swallow their own failures.
pub trait AlertPort: Send + Sync {
    /// Fire an alert so a human operator notices.
    fn alert(&self, reason: &str);
}

/// Port for interactive operator console prompts (login code, second factor,
/// manual browser login pause).
pub trait OperatorPrompt: Send + Sync {
    /// Show a message and read one line of operator input.
    fn read_line(&self, message: &str) -> std::io::Result<String>;
}

// =============================================================================
// Tests
// =============================================================================
