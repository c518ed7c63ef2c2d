//! WebDriver Browser Control Client
//!
//! Drives a chromedriver (or any W3C WebDriver endpoint) over its REST
//! protocol. Only the narrow slice of the protocol the pipeline consumes is
//! implemented: session lifecycle, navigation, cookies, element lookup,
//! form fill, and clicks (including a forced JS click for overlay
//! dismissal).
//!
//! Each `PageHandle` maps to one WebDriver session, which gives every page
//! an isolated browser context with its own cookie jar.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

use auspex_exec::{
    BrowserPort, ExecError, ExecResult, Locator, PageHandle, PageOptions, SessionCookie,
};

// =============================================================================
// Constants
// =============================================================================

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Poll interval while waiting for an element
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// W3C element id key in element responses
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur in the WebDriver client.
#[derive(Debug, Clone, Error)]
pub enum WebDriverError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// WebDriver endpoint returned an error
    #[error("WebDriver error: {error}: {message}")]
    Api {
        /// W3C error code (e.g. "no such element")
        error: String,
        /// Human-readable message
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl From<WebDriverError> for ExecError {
    fn from(e: WebDriverError) -> Self {
        match e {
            WebDriverError::Api { ref error, ref message } if error == "no such element" => {
                ExecError::ElementNotFound(message.clone())
            }
            WebDriverError::Timeout => ExecError::Timeout("WebDriver request".to_string()),
            other => ExecError::Browser(other.to_string()),
        }
    }
}

// =============================================================================
// WebDriver Client
// =============================================================================

/// Browser control adapter over a WebDriver endpoint.
pub struct WebDriverBrowser {
    /// HTTP client
    client: Client,
    /// WebDriver endpoint base URL (e.g. <http://127.0.0.1:9515>)
    base_url: String,
}

impl WebDriverBrowser {
    /// Create a client for a WebDriver endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send a request and unwrap the W3C `value` envelope.
    async fn execute(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), request.send())
            .await
            .map_err(|_| WebDriverError::Timeout)?
            .map_err(|e| WebDriverError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WebDriverError::ParseError(e.to_string()))?;

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| WebDriverError::ParseError(format!("{}: {}", e, text)))?;

        if !status.is_success() {
            return Err(parse_error_value(&parsed["value"]));
        }

        Ok(parsed["value"].clone())
    }

    async fn get(&self, path: &str) -> Result<Value, WebDriverError> {
        self.execute(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, WebDriverError> {
        self.execute(reqwest::Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, WebDriverError> {
        self.execute(reqwest::Method::DELETE, path, None).await
    }

    /// Create a new WebDriver session (one isolated browser context).
    async fn new_session(&self, options: &PageOptions) -> Result<String, WebDriverError> {
        let value = self
            .post("/session", build_capabilities(options))
            .await?;

        value["sessionId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                WebDriverError::ParseError("Session response missing sessionId".to_string())
            })
    }

    /// Look up a single element; `Ok(None)` when it is not on the page.
    async fn find_element(
        &self,
        session: &str,
        locator: &Locator,
    ) -> Result<Option<String>, WebDriverError> {
        let (using, value) = locator_strategy(locator);
        let result = self
            .post(
                &format!("/session/{}/element", session),
                json!({ "using": using, "value": value }),
            )
            .await;

        match result {
            Ok(found) => Ok(element_id(&found)),
            Err(WebDriverError::Api { ref error, .. }) if error == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Dispatch a click straight to the element via script, bypassing
    /// overlay hit-testing.
    async fn force_click(&self, session: &str, element: &str) -> Result<(), WebDriverError> {
        self.post(
            &format!("/session/{}/execute/sync", session),
            json!({
                "script": "arguments[0].click();",
                "args": [{ ELEMENT_KEY: element }],
            }),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserPort for WebDriverBrowser {
    async fn open_page(&self, options: PageOptions) -> ExecResult<PageHandle> {
        let session = self.new_session(&options).await.map_err(ExecError::from)?;
        info!(session = %session, "Opened WebDriver session");
        Ok(PageHandle::new(session))
    }

    async fn goto(&self, page: &PageHandle, url: &str) -> ExecResult<()> {
        debug!(page = %page, url, "Navigating");
        self.post(
            &format!("/session/{}/url", page.as_str()),
            json!({ "url": url }),
        )
        .await
        .map_err(ExecError::from)?;
        Ok(())
    }

    async fn add_cookies(&self, page: &PageHandle, cookies: &[SessionCookie]) -> ExecResult<()> {
        for cookie in cookies {
            let body = serde_json::to_value(cookie)
                .map_err(|e| ExecError::Browser(format!("Cookie serialization: {}", e)))?;
            self.post(
                &format!("/session/{}/cookie", page.as_str()),
                json!({ "cookie": body }),
            )
            .await
            .map_err(ExecError::from)?;
        }
        debug!(page = %page, count = cookies.len(), "Injected session cookies");
        Ok(())
    }

    async fn cookies(&self, page: &PageHandle) -> ExecResult<Vec<SessionCookie>> {
        let value = self
            .get(&format!("/session/{}/cookie", page.as_str()))
            .await
            .map_err(ExecError::from)?;

        serde_json::from_value(value)
            .map_err(|e| ExecError::Browser(format!("Cookie response parse: {}", e)))
    }

    async fn fill(&self, page: &PageHandle, selector: &str, value: &str) -> ExecResult<()> {
        let session = page.as_str();
        let element = self
            .find_element(session, &Locator::css(selector))
            .await
            .map_err(ExecError::from)?
            .ok_or_else(|| ExecError::ElementNotFound(selector.to_string()))?;

        self.post(&format!("/session/{}/element/{}/clear", session, element), json!({}))
            .await
            .map_err(ExecError::from)?;
        self.post(
            &format!("/session/{}/element/{}/value", session, element),
            json!({ "text": value }),
        )
        .await
        .map_err(ExecError::from)?;
        Ok(())
    }

    async fn wait_for(
        &self,
        page: &PageHandle,
        locator: &Locator,
        timeout: Duration,
    ) -> ExecResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self
                .find_element(page.as_str(), locator)
                .await
                .map_err(ExecError::from)?
                .is_some()
            {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, page: &PageHandle, locator: &Locator, force: bool) -> ExecResult<()> {
        let session = page.as_str();
        let element = self
            .find_element(session, locator)
            .await
            .map_err(ExecError::from)?
            .ok_or_else(|| ExecError::ElementNotFound(locator.to_string()))?;

        if force {
            self.force_click(session, &element).await.map_err(ExecError::from)?;
        } else {
            self.post(&format!("/session/{}/element/{}/click", session, element), json!({}))
                .await
                .map_err(ExecError::from)?;
        }
        Ok(())
    }

    async fn close_page(&self, page: &PageHandle) -> ExecResult<()> {
        self.delete(&format!("/session/{}", page.as_str()))
            .await
            .map_err(ExecError::from)?;
        info!(page = %page, "Closed WebDriver session");
        Ok(())
    }
}

// =============================================================================
// Protocol Helpers
// =============================================================================

/// Build the new-session capabilities payload.
fn build_capabilities(options: &PageOptions) -> Value {
    let mut always_match = json!({ "browserName": "chrome" });

    if options.dismiss_dialogs {
        always_match["unhandledPromptBehavior"] = json!("dismiss");
    }
    if let Some((width, height)) = options.viewport {
        always_match["goog:chromeOptions"] =
            json!({ "args": [format!("--window-size={},{}", width, height)] });
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Map a locator to a WebDriver location strategy.
fn locator_strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::Css(selector) => ("css selector", selector.clone()),
        Locator::Text(text) => (
            "xpath",
            format!("//*[normalize-space(text())={}]", xpath_literal(text)),
        ),
    }
}

/// Quote a string as an XPath literal, handling embedded quotes.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Extract the element id from an element response value.
fn element_id(value: &Value) -> Option<String> {
    value[ELEMENT_KEY].as_str().map(str::to_string)
}

/// Parse a W3C error envelope value.
fn parse_error_value(value: &Value) -> WebDriverError {
    match (value["error"].as_str(), value["message"].as_str()) {
        (Some(error), message) => WebDriverError::Api {
            error: error.to_string(),
            message: message.unwrap_or_default().to_string(),
        },
        _ => WebDriverError::ParseError(format!("Unrecognized error body: {}", value)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_capabilities_defaults() {
        let caps = build_capabilities(&PageOptions::default());
        let always = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always["browserName"], "chrome");
        assert!(always.get("unhandledPromptBehavior").is_none());
        assert!(always.get("goog:chromeOptions").is_none());
    }

    #[test]
    fn test_build_capabilities_with_options() {
        let caps = build_capabilities(&PageOptions {
            dismiss_dialogs: true,
            viewport: Some((960, 540)),
        });
        let always = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always["unhandledPromptBehavior"], "dismiss");
        assert_eq!(
            always["goog:chromeOptions"]["args"][0],
            "--window-size=960,540"
        );
    }

    #[test]
    fn test_locator_strategy_css() {
        let (using, value) = locator_strategy(&Locator::css(".ant-input"));

        assert_eq!(using, "css selector");
        assert_eq!(value, ".ant-input");
    }

    #[test]
    fn test_locator_strategy_text_is_xpath() {
        let (using, value) = locator_strategy(&Locator::text("Open Long"));

        assert_eq!(using, "xpath");
        assert_eq!(value, "//*[normalize-space(text())='Open Long']");
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("a'b\"c"),
            "concat('a', \"'\", 'b\"c')"
        );
    }

    #[test]
    fn test_element_id_extraction() {
        let value = json!({ ELEMENT_KEY: "node-7" });
        assert_eq!(element_id(&value), Some("node-7".to_string()));

        let empty = json!({});
        assert_eq!(element_id(&empty), None);
    }

    #[test]
    fn test_parse_error_value() {
        let value = json!({ "error": "no such element", "message": "not found" });
        let err = parse_error_value(&value);

        assert!(matches!(
            err,
            WebDriverError::Api { ref error, .. } if error == "no such element"
        ));

        // And that maps to ElementNotFound at the port boundary
        assert!(matches!(ExecError::from(err), ExecError::ElementNotFound(_)));
    }
}
