//! Execution Surface
//!
//! A pre-authenticated, pre-filled browser page bound to exactly one
//! exposure key, capable of performing a single action: trigger the trade
//! in its direction.

use std::sync::Arc;

use tracing::debug;

use auspex_domain::{Direction, ExposureKey};

use crate::error::ExecResult;
use crate::ports::{BrowserPort, Locator, PageHandle};

/// Trade button label for the long side.
const OPEN_LONG_LABEL: &str = "Open Long";
/// Trade button label for the short side.
const OPEN_SHORT_LABEL: &str = "Open Short";

/// A live execution surface.
///
/// Created during bootstrap, owned by the registry for the process lifetime,
/// never reassigned to a different exposure key. The trade fires with the
/// quantity that was pre-filled into the page's order form at provisioning
/// time.
#[derive(Debug)]
pub struct ExecutionSurface<B: BrowserPort> {
    /// Exposure key this surface is bound to
    key: ExposureKey,
    /// Browser control surface
    browser: Arc<B>,
    /// The page holding the pre-filled order form
    page: PageHandle,
}

impl<B: BrowserPort> ExecutionSurface<B> {
    /// Bind a page to an exposure key.
    pub fn new(key: ExposureKey, browser: Arc<B>, page: PageHandle) -> Self {
        Self { key, browser, page }
    }

    /// The exposure key this surface serves.
    pub fn key(&self) -> &ExposureKey {
        &self.key
    }

    /// The underlying page handle.
    pub fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Perform the trade action for this surface's direction.
    ///
    /// The side effect is external and irreversible: a real order fires.
    /// Failures are reported to the caller; the surface itself stays usable
    /// for future signals.
    pub async fn trigger(&self) -> ExecResult<()> {
        let label = match self.key.direction {
            Direction::Long => OPEN_LONG_LABEL,
            Direction::Short => OPEN_SHORT_LABEL,
        };

        debug!(key = %self.key, page = %self.page, label, "Clicking trade action");
        self.browser
            .click(&self.page, &Locator::text(label), false)
            .await
    }

    /// Close the page and release its browser context.
    pub async fn close(&self) -> ExecResult<()> {
        self.browser.close_page(&self.page).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubBrowser;
    use auspex_domain::Instrument;

    fn key(direction: Direction) -> ExposureKey {
        ExposureKey::new(Instrument::new("ADA").unwrap(), direction)
    }

    #[tokio::test]
    async fn test_trigger_clicks_direction_label() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(Default::default()).await.unwrap();
        let surface = ExecutionSurface::new(key(Direction::Long), browser.clone(), page.clone());

        surface.trigger().await.unwrap();

        let clicks = browser.clicks();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].page, page);
        assert_eq!(clicks[0].locator, "text=Open Long");
        assert!(!clicks[0].force);
    }

    #[tokio::test]
    async fn test_trigger_short_uses_short_label() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(Default::default()).await.unwrap();
        let surface = ExecutionSurface::new(key(Direction::Short), browser.clone(), page);

        surface.trigger().await.unwrap();

        assert_eq!(browser.clicks()[0].locator, "text=Open Short");
    }

    #[tokio::test]
    async fn test_trigger_failure_is_reported() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(Default::default()).await.unwrap();
        let surface = ExecutionSurface::new(key(Direction::Long), browser.clone(), page);

        browser.set_fail_next(true);
        assert!(surface.trigger().await.is_err());

        // Surface remains usable afterwards
        assert!(surface.trigger().await.is_ok());
    }

    #[tokio::test]
    async fn test_close_releases_page() {
        let browser = Arc::new(StubBrowser::new());
        let page = browser.open_page(Default::default()).await.unwrap();
        let surface = ExecutionSurface::new(key(Direction::Long), browser.clone(), page.clone());

        surface.close().await.unwrap();

        assert_eq!(browser.closed_pages(), vec![page]);
    }
}
