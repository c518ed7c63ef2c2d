//! Stub implementations for testing.
//!
//! These implementations simulate the browser control surface, the
//! classifier service, the message feed, and the operator console without
//! touching any real external system. Every operation is recorded so tests
//! can assert on the exact sequence of side effects.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

use auspex_domain::InboundMessage;

use crate::error::{ClassifyError, ExecError, ExecResult, FeedError};
use crate::ports::{
    BrowserPort, CompletionPort, CompletionRequest, FeedPort, Locator, OperatorPrompt, PageHandle,
    PageOptions, SessionCookie,
};

// =============================================================================
// Stub Browser
// =============================================================================

/// A click recorded by the stub browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClick {
    /// Page the click was dispatched to
    pub page: PageHandle,
    /// Locator, in `Locator`'s display form ("text=..." / "css=...")
    pub locator: String,
    /// Whether forced click mode was requested
    pub force: bool,
}

/// Stub browser that records every operation.
///
/// Element presence for `wait_for` is configured with [`StubBrowser::set_present`];
/// everything else succeeds unless a failure is injected with
/// [`StubBrowser::set_fail_next`].
#[derive(Debug)]
pub struct StubBrowser {
    /// Page counter for generating handles
    page_counter: RwLock<u64>,
    /// Pages opened (in order)
    opened: RwLock<Vec<PageHandle>>,
    /// Page options passed at open time
    open_options: RwLock<Vec<PageOptions>>,
    /// Pages closed (in order)
    closed: RwLock<Vec<PageHandle>>,
    /// Navigations performed
    navigations: RwLock<Vec<(PageHandle, String)>>,
    /// Form fills performed (page, selector, value)
    fills: RwLock<Vec<(PageHandle, String, String)>>,
    /// Clicks performed
    clicks: RwLock<Vec<RecordedClick>>,
    /// Cookie batches injected per page
    cookies_added: RwLock<Vec<(PageHandle, Vec<SessionCookie>)>>,
    /// Cookies returned by `cookies()`
    stored_cookies: RwLock<Vec<SessionCookie>>,
    /// Locators `wait_for` reports as present
    present: RwLock<HashSet<String>>,
    /// Whether to simulate a failure on the next operation
    fail_next: RwLock<bool>,
}

impl StubBrowser {
    /// Create a new stub browser.
    pub fn new() -> Self {
        Self {
            page_counter: RwLock::new(0),
            opened: RwLock::new(Vec::new()),
            open_options: RwLock::new(Vec::new()),
            closed: RwLock::new(Vec::new()),
            navigations: RwLock::new(Vec::new()),
            fills: RwLock::new(Vec::new()),
            clicks: RwLock::new(Vec::new()),
            cookies_added: RwLock::new(Vec::new()),
            stored_cookies: RwLock::new(Vec::new()),
            present: RwLock::new(HashSet::new()),
            fail_next: RwLock::new(false),
        }
    }

    /// Mark a locator as present for `wait_for`.
    pub fn set_present(&self, locator: &Locator) {
        self.present.write().unwrap().insert(locator.to_string());
    }

    /// Remove a locator from the present set.
    pub fn clear_present(&self, locator: &Locator) {
        self.present.write().unwrap().remove(&locator.to_string());
    }

    /// Configure the cookies `cookies()` returns.
    pub fn set_cookies(&self, cookies: Vec<SessionCookie>) {
        *self.stored_cookies.write().unwrap() = cookies;
    }

    /// Configure the next operation to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    /// All recorded clicks, in order.
    pub fn clicks(&self) -> Vec<RecordedClick> {
        self.clicks.read().unwrap().clone()
    }

    /// Number of clicks dispatched to one page.
    pub fn click_count_on(&self, page: &PageHandle) -> usize {
        self.clicks
            .read()
            .unwrap()
            .iter()
            .filter(|c| &c.page == page)
            .count()
    }

    /// All recorded fills, in order.
    pub fn fills(&self) -> Vec<(PageHandle, String, String)> {
        self.fills.read().unwrap().clone()
    }

    /// All recorded navigations, in order.
    pub fn navigations(&self) -> Vec<(PageHandle, String)> {
        self.navigations.read().unwrap().clone()
    }

    /// Pages opened so far, in order.
    pub fn opened_pages(&self) -> Vec<PageHandle> {
        self.opened.read().unwrap().clone()
    }

    /// Options passed to `open_page`, in order.
    pub fn open_options(&self) -> Vec<PageOptions> {
        self.open_options.read().unwrap().clone()
    }

    /// Pages closed so far, in order.
    pub fn closed_pages(&self) -> Vec<PageHandle> {
        self.closed.read().unwrap().clone()
    }

    /// Cookie batches injected so far.
    pub fn cookies_added(&self) -> Vec<(PageHandle, Vec<SessionCookie>)> {
        self.cookies_added.read().unwrap().clone()
    }

    /// Check if we should fail the next operation.
    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }
}

impl Default for StubBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserPort for StubBrowser {
    async fn open_page(&self, options: PageOptions) -> ExecResult<PageHandle> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated open failure".to_string()));
        }

        let mut counter = self.page_counter.write().unwrap();
        *counter += 1;
        let page = PageHandle::new(format!("stub-page-{}", *counter));

        self.opened.write().unwrap().push(page.clone());
        self.open_options.write().unwrap().push(options);
        Ok(page)
    }

    async fn goto(&self, page: &PageHandle, url: &str) -> ExecResult<()> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated navigation failure".to_string()));
        }
        self.navigations
            .write()
            .unwrap()
            .push((page.clone(), url.to_string()));
        Ok(())
    }

    async fn add_cookies(&self, page: &PageHandle, cookies: &[SessionCookie]) -> ExecResult<()> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated cookie failure".to_string()));
        }
        self.cookies_added
            .write()
            .unwrap()
            .push((page.clone(), cookies.to_vec()));
        Ok(())
    }

    async fn cookies(&self, _page: &PageHandle) -> ExecResult<Vec<SessionCookie>> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated cookie failure".to_string()));
        }
        Ok(self.stored_cookies.read().unwrap().clone())
    }

    async fn fill(&self, page: &PageHandle, selector: &str, value: &str) -> ExecResult<()> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated fill failure".to_string()));
        }
        self.fills
            .write()
            .unwrap()
            .push((page.clone(), selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn wait_for(
        &self,
        _page: &PageHandle,
        locator: &Locator,
        _timeout: Duration,
    ) -> ExecResult<bool> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated wait failure".to_string()));
        }
        Ok(self.present.read().unwrap().contains(&locator.to_string()))
    }

    async fn click(&self, page: &PageHandle, locator: &Locator, force: bool) -> ExecResult<()> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated click failure".to_string()));
        }
        self.clicks.write().unwrap().push(RecordedClick {
            page: page.clone(),
            locator: locator.to_string(),
            force,
        });
        Ok(())
    }

    async fn close_page(&self, page: &PageHandle) -> ExecResult<()> {
        if self.should_fail() {
            return Err(ExecError::Browser("Simulated close failure".to_string()));
        }
        self.closed.write().unwrap().push(page.clone());
        Ok(())
    }
}

// =============================================================================
// Scripted Completion
// =============================================================================

/// Stub classifier service answering from a scripted queue.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, ClassifyError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    /// Create an empty scripted completion service.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a raw response.
    pub fn push_response(&self, raw: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(raw.to_string()));
    }

    /// Queue an error.
    pub fn push_error(&self, error: ClassifyError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for ScriptedCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionPort for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ClassifyError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClassifyError::Transport(
                    "No scripted response queued".to_string(),
                ))
            })
    }
}

// =============================================================================
// Scripted Feed
// =============================================================================

/// Stub message feed replaying scripted sessions.
///
/// Each call to `run` consumes one session: its messages are forwarded into
/// the pipeline, then the session ends with its scripted result. With no
/// sessions left, `run` reports the consumer as gone.
pub struct ScriptedFeed {
    sessions: Mutex<VecDeque<(Vec<InboundMessage>, Result<(), FeedError>)>>,
}

impl ScriptedFeed {
    /// Create a feed with no scripted sessions.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a session: emit `messages`, then finish with `result`.
    pub fn push_session(&self, messages: Vec<InboundMessage>, result: Result<(), FeedError>) {
        self.sessions.lock().unwrap().push_back((messages, result));
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedPort for ScriptedFeed {
    async fn run(&self, sender: mpsc::Sender<InboundMessage>) -> Result<(), FeedError> {
        let session = self.sessions.lock().unwrap().pop_front();
        let Some((messages, result)) = session else {
            return Ok(());
        };

        for message in messages {
            if sender.send(message).await.is_err() {
                return Ok(());
            }
        }
        result
    }
}

// =============================================================================
// Scripted Prompt
// =============================================================================

/// Stub operator console answering prompts from a scripted queue.
pub struct ScriptedPrompt {
    lines: Mutex<VecDeque<String>>,
    messages: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Create a console with pre-scripted answers.
    pub fn new(lines: Vec<&str>) -> Self {
        Self {
            lines: Mutex::new(lines.into_iter().map(str::to_string).collect()),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Messages shown to the operator so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn read_line(&self, message: &str) -> std::io::Result<String> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(self.lines.lock().unwrap().pop_front().unwrap_or_default())
    }
}

// =============================================================================
// Tests
// =============================================================================
