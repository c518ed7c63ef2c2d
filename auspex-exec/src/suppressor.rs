//! Popup Suppressor
//!
//! Trading pages show a transient reminder overlay shortly after they open;
//! if it is up when a trade click fires, the click can be swallowed. The
//! suppressor is a per-surface background task that, for a bounded window
//! after setup, periodically dismisses the overlay if present.
//!
//! The task is supervised: its handle is kept so shutdown can abort and join
//! it instead of leaking a detached task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ExecResult;
use crate::ports::{BrowserPort, Locator, PageHandle};

/// Visible text of the reminder overlay's opt-out control.
pub const REMINDER_TEXT: &str = "No more reminders for today";

/// Selector for the modal close button.
pub const MODAL_CLOSE_SELECTOR: &str = "button[aria-label=\"Close\"], .ant-modal-close";

/// Default suppression window after surface setup.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(20);

/// Default interval between dismiss attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How long one attempt waits for the overlay to be present.
const OVERLAY_WAIT: Duration = Duration::from_secs(3);

/// How long one attempt waits for the close button after opting out.
const CLOSE_WAIT: Duration = Duration::from_secs(2);

/// Pause between opting out and closing the modal.
const SETTLE: Duration = Duration::from_millis(300);

/// A running popup suppressor for one surface.
#[derive(Debug)]
pub struct PopupSuppressor {
    handle: JoinHandle<()>,
}

impl PopupSuppressor {
    /// Spawn a suppressor for a page.
    ///
    /// Runs one dismiss attempt per `interval` until `window` has elapsed,
    /// then terminates on its own. Attempts are idempotent: when no overlay
    /// is present the attempt is a no-op. Errors are logged and never
    /// propagate; the next tick simply tries again.
    pub fn spawn<B: BrowserPort + 'static>(
        browser: Arc<B>,
        page: PageHandle,
        window: Duration,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let deadline = Instant::now() + window;
            while Instant::now() < deadline {
                if let Err(e) = dismiss_overlay(browser.as_ref(), &page).await {
                    debug!(page = %page, error = %e, "Popup dismiss attempt failed");
                }
                tokio::time::sleep(interval).await;
            }
            debug!(page = %page, "Popup suppression window elapsed");
        });

        Self { handle }
    }

    /// Whether the suppression window has elapsed and the task exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task (if still running) and wait for it to settle.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// One dismiss attempt: opt out of the reminder, then close the modal.
async fn dismiss_overlay<B: BrowserPort>(browser: &B, page: &PageHandle) -> ExecResult<()> {
    let reminder = Locator::text(REMINDER_TEXT);
    if !browser.wait_for(page, &reminder, OVERLAY_WAIT).await? {
        // No overlay up, nothing to do
        return Ok(());
    }

    browser.click(page, &reminder, true).await?;
    info!(page = %page, "Dismissed reminder overlay");
    tokio::time::sleep(SETTLE).await;

    let close = Locator::css(MODAL_CLOSE_SELECTOR);
    if browser.wait_for(page, &close, CLOSE_WAIT).await? {
        // Best-effort: the overlay may already be gone
        let _ = browser.click(page, &close, true).await;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PageOptions;
    use crate::stub::StubBrowser;

    #[tokio::test]
    async fn test_noop_when_no_overlay_present() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(PageOptions::default()).await.unwrap();

        dismiss_overlay(browser.as_ref(), &page).await.unwrap();

        assert!(browser.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_dismisses_overlay_when_present() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(PageOptions::default()).await.unwrap();
        browser.set_present(&Locator::text(REMINDER_TEXT));
        browser.set_present(&Locator::css(MODAL_CLOSE_SELECTOR));

        dismiss_overlay(browser.as_ref(), &page).await.unwrap();

        let clicks = browser.clicks();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].locator, format!("text={}", REMINDER_TEXT));
        assert!(clicks[0].force);
        assert_eq!(clicks[1].locator, format!("css={}", MODAL_CLOSE_SELECTOR));
    }

    #[tokio::test]
    async fn test_suppressor_terminates_after_window() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(PageOptions::default()).await.unwrap();

        let suppressor = PopupSuppressor::spawn(
            browser,
            page,
            Duration::from_millis(30),
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(suppressor.is_finished());
        suppressor.shutdown().await;
    }

    #[tokio::test]
    async fn test_suppressor_shutdown_aborts_running_task() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(PageOptions::default()).await.unwrap();

        let suppressor =
            PopupSuppressor::spawn(browser, page, Duration::from_secs(60), Duration::from_millis(10));

        assert!(!suppressor.is_finished());
        suppressor.shutdown().await;
    }
}
