//! Session Bootstrapper.
//!
//! One-time startup sequence, run before the router consumes any message:
//! authenticate interactively against the trading origin, capture the
//! session cookies, and provision one pre-filled execution surface per
//! configured exposure key. Any failure here is fatal — the process must
//! never start consuming messages with a partially provisioned registry.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use auspex_domain::ExposureKey;
use auspex_exec::{
    suppressor, BrowserPort, ExecutionSurface, OperatorPrompt, PageOptions, PopupSuppressor,
    SessionCookie, SurfaceRegistry,
};

use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Constants
// =============================================================================

/// CSS selector of the order form's quantity input.
const QUANTITY_SELECTOR: &str = "#mexc_contract_v_open_position input.ant-input";

/// Viewport for trade pages.
const TRADE_VIEWPORT: (u32, u32) = (960, 540);

/// Settle delay after navigation before touching the order form.
const NAVIGATION_SETTLE: Duration = Duration::from_secs(1);

// =============================================================================
// Provisioning
// =============================================================================

/// Everything bootstrap hands over to the daemon.
#[derive(Debug)]
pub struct ProvisionedSurfaces<B: BrowserPort> {
    /// Fully populated surface registry
    pub registry: SurfaceRegistry<B>,
    /// One popup suppressor per surface, already running
    pub suppressors: Vec<PopupSuppressor>,
}

/// Authenticate and provision every configured execution surface.
pub async fn provision<B: BrowserPort + 'static>(
    browser: &Arc<B>,
    config: &Config,
    prompt: &dyn OperatorPrompt,
) -> DaemonResult<ProvisionedSurfaces<B>> {
    // 1. Interactive login on the trading origin, capture session cookies
    let cookies = capture_session_cookies(browser.as_ref(), config, prompt).await?;

    // 2. One pre-filled page per exposure key
    let mut registry = SurfaceRegistry::new();
    let mut suppressors = Vec::new();

    for key in config.signal.exposure_keys() {
        let (surface, suppressor) =
            match provision_surface(browser, config, &cookies, &key).await {
                Ok(provisioned) => provisioned,
                Err(e) => {
                    abandon(&registry, suppressors).await;
                    return Err(e);
                }
            };

        suppressors.push(suppressor);
        if let Err(e) = registry.register(surface.clone()) {
            let _ = surface.close().await;
            abandon(&registry, suppressors).await;
            return Err(e.into());
        }
    }

    info!(surfaces = registry.len(), "Execution surfaces provisioned");
    Ok(ProvisionedSurfaces {
        registry,
        suppressors,
    })
}

/// Open a page on the trading origin, let the operator log in manually, and
/// capture the resulting session cookies.
async fn capture_session_cookies<B: BrowserPort>(
    browser: &B,
    config: &Config,
    prompt: &dyn OperatorPrompt,
) -> DaemonResult<Vec<SessionCookie>> {
    let page = browser.open_page(PageOptions::default()).await?;

    let result = async {
        let instrument = config.signal.instruments.first().ok_or_else(|| {
            DaemonError::Config("At least one instrument must be configured".to_string())
        })?;
        browser
            .goto(&page, &config.browser.trade_url(instrument))
            .await?;
        prompt.read_line("Log in to the trading platform in the opened browser, then press ENTER… ")?;

        let cookies = browser.cookies(&page).await?;
        info!(cookies = cookies.len(), "Captured trading session cookies");
        Ok::<_, DaemonError>(cookies)
    }
    .await;

    // The login page is only needed for cookie capture
    let _ = browser.close_page(&page).await;
    result
}

/// Open, authenticate, and pre-fill one trade page; start its suppressor.
async fn provision_surface<B: BrowserPort + 'static>(
    browser: &Arc<B>,
    config: &Config,
    cookies: &[SessionCookie],
    key: &ExposureKey,
) -> DaemonResult<(Arc<ExecutionSurface<B>>, PopupSuppressor)> {
    let quantity = config
        .signal
        .quantities
        .get(key)
        .ok_or_else(|| DaemonError::Config(format!("No quantity configured for {}", key)))?;

    let page = browser
        .open_page(PageOptions {
            dismiss_dialogs: true,
            viewport: Some(TRADE_VIEWPORT),
        })
        .await?;

    let result = async {
        let url = config.browser.trade_url(&key.instrument);
        // Cookies can only land once the page is on the trading origin;
        // reload afterwards so the session is actually applied.
        browser.goto(&page, &url).await?;
        browser.add_cookies(&page, cookies).await?;
        browser.goto(&page, &url).await?;
        tokio::time::sleep(NAVIGATION_SETTLE).await;

        browser
            .fill(&page, QUANTITY_SELECTOR, &quantity.to_string())
            .await?;
        Ok::<_, DaemonError>(())
    }
    .await;

    if let Err(e) = result {
        let _ = browser.close_page(&page).await;
        return Err(e);
    }

    let suppressor = PopupSuppressor::spawn(
        browser.clone(),
        page.clone(),
        suppressor::DEFAULT_WINDOW,
        suppressor::DEFAULT_INTERVAL,
    );
    let surface = Arc::new(ExecutionSurface::new(key.clone(), browser.clone(), page));

    info!(key = %key, quantity = %quantity, "Provisioned execution surface");
    Ok((surface, suppressor))
}

/// Roll back a partial provision run: stop suppressors, close every page.
async fn abandon<B: BrowserPort>(
    registry: &SurfaceRegistry<B>,
    suppressors: Vec<PopupSuppressor>,
) {
    for suppressor in suppressors {
        suppressor.shutdown().await;
    }
    for surface in registry.surfaces() {
        let _ = surface.close().await;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use auspex_domain::{Direction, Instrument};
    use auspex_exec::{ScriptedPrompt, SessionCookie, StubBrowser};

    fn session_cookie() -> SessionCookie {
        SessionCookie {
            name: "uc_token".to_string(),
            value: "abc".to_string(),
            domain: Some(".mexc.com".to_string()),
            path: None,
            secure: None,
            http_only: None,
            expiry: None,
        }
    }

    #[tokio::test]
    async fn test_provision_builds_full_registry() {
        let browser = Arc::new(StubBrowser::new());
        browser.set_cookies(vec![session_cookie()]);
        let config = Config::test();
        let prompt = ScriptedPrompt::new(vec![""]);

        let provisioned = provision(&browser, &config, &prompt).await.unwrap();

        // Both exposure keys are live before the router would start
        assert_eq!(provisioned.registry.len(), 2);
        assert_eq!(provisioned.suppressors.len(), 2);
        let ada = Instrument::new("ADA").unwrap();
        for direction in Direction::all() {
            let key = ExposureKey::new(ada.clone(), direction);
            provisioned.registry.resolve(&key).unwrap();
        }

        // The operator was paused exactly once for the manual login
        assert_eq!(prompt.messages().len(), 1);

        // The login capture page was closed; trade pages stay open
        assert_eq!(browser.opened_pages().len(), 3);
        assert_eq!(browser.closed_pages().len(), 1);

        for suppressor in provisioned.suppressors {
            suppressor.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_provision_prefills_quantities() {
        let browser = Arc::new(StubBrowser::new());
        browser.set_cookies(vec![session_cookie()]);
        let config = Config::test();
        let prompt = ScriptedPrompt::new(vec![""]);

        let provisioned = provision(&browser, &config, &prompt).await.unwrap();

        let fills = browser.fills();
        assert_eq!(fills.len(), 2);
        assert!(fills.iter().all(|(_, selector, _)| selector == QUANTITY_SELECTOR));
        let values: Vec<&str> = fills.iter().map(|(_, _, value)| value.as_str()).collect();
        assert!(values.contains(&"10"));
        assert!(values.contains(&"20"));

        // Captured cookies were injected into both trade pages
        assert_eq!(browser.cookies_added().len(), 2);

        // Trade pages are created with dialog dismissal and the fixed viewport
        let trade_options = &browser.open_options()[1..];
        assert!(trade_options.iter().all(|o| o.dismiss_dialogs));
        assert!(trade_options.iter().all(|o| o.viewport == Some(TRADE_VIEWPORT)));

        for suppressor in provisioned.suppressors {
            suppressor.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_duplicate_instrument_is_fatal_and_cleans_up() {
        let browser = Arc::new(StubBrowser::new());
        browser.set_cookies(vec![session_cookie()]);
        let mut config = Config::test();
        let ada = Instrument::new("ADA").unwrap();
        config.signal.instruments.push(ada);
        let prompt = ScriptedPrompt::new(vec![""]);

        let err = provision(&browser, &config, &prompt).await.unwrap_err();

        assert!(matches!(
            err,
            DaemonError::Exec(auspex_exec::ExecError::DuplicateKey(_))
        ));
        // Every page opened during the failed run was closed again
        assert_eq!(browser.opened_pages().len(), browser.closed_pages().len());
    }

    #[tokio::test]
    async fn test_failed_navigation_is_fatal() {
        let browser = Arc::new(StubBrowser::new());
        let config = Config::test();
        let prompt = ScriptedPrompt::new(vec![""]);

        // Fail the very first browser operation of the run
        browser.set_fail_next(true);
        let result = provision(&browser, &config, &prompt).await;

        assert!(result.is_err());
        // Nothing is left open
        assert_eq!(browser.opened_pages().len(), browser.closed_pages().len());
    }
}
