//! Minimal W3C WebDriver HTTP client.
//!
//! Covers the handful of endpoints the harness needs: session lifecycle,
//! navigation, element lookup, keyboard input, script execution and property
//! reads. Every command is a single request; nothing here retries.

use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::domain::errors::SurfaceError;
use crate::domain::models::WebDriverConfig;
use crate::domain::ports::SurfaceRole;

/// Key under which W3C drivers return element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Errors from the WebDriver endpoint.
#[derive(Error, Debug)]
pub enum WebDriverError {
    /// The driver answered with a W3C error object
    #[error("{error} ({status}): {message}")]
    Command {
        status: StatusCode,
        error: String,
        message: String,
    },

    /// Connection failure or request timeout
    #[error("WebDriver endpoint unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("malformed WebDriver response: {0}")]
    MalformedResponse(String),
}

impl WebDriverError {
    /// W3C error code, if the driver sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Command { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether the browsing context is gone and the page must be reloaded.
    pub fn is_navigation_lost(&self) -> bool {
        match self {
            Self::Command { error, message, .. } => {
                matches!(error.as_str(), "no such window" | "invalid session id")
                    || message.contains("disconnected")
                    || message.contains("target frame detached")
            }
            _ => false,
        }
    }

    /// Whether the element handle no longer points at a usable control.
    pub fn is_element_gone(&self) -> bool {
        matches!(
            self.code(),
            Some("no such element" | "stale element reference" | "element not interactable")
        )
    }

    /// Map onto the surface fault taxonomy for the surface playing `role`.
    pub fn into_surface_error(self, role: SurfaceRole) -> SurfaceError {
        if self.is_navigation_lost() {
            SurfaceError::NavigationLost(self.to_string())
        } else if self.is_element_gone() || matches!(self, Self::Http(_)) {
            SurfaceError::unavailable(role, self.to_string())
        } else {
            SurfaceError::Protocol(self.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

/// Opaque element handle returned by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementId(pub String);

impl ElementId {
    /// Element reference as passed to `execute/sync` arguments.
    pub fn to_json(&self) -> Value {
        let mut reference = serde_json::Map::new();
        reference.insert(ELEMENT_KEY.to_string(), Value::String(self.0.clone()));
        Value::Object(reference)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Self(id.to_string()))
    }
}

/// HTTP client for one WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: ReqwestClient,
    endpoint: String,
}

impl WebDriverClient {
    /// Create a client for `endpoint` with a per-command timeout.
    pub fn new(endpoint: impl Into<String>, command_timeout: Duration) -> Result<Self, WebDriverError> {
        let http = ReqwestClient::builder()
            .timeout(command_timeout)
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send a command and unwrap the `value` member of the response.
    #[instrument(level = "trace", skip(self, body))]
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, WebDriverError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(%status, body = %text, "webdriver response");

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| WebDriverError::MalformedResponse(format!("{e}: {text}")))?;

        if status.is_success() {
            return Ok(envelope.value);
        }

        let error = serde_json::from_value::<ErrorValue>(envelope.value).unwrap_or(ErrorValue {
            error: "unknown error".to_string(),
            message: text,
        });
        Err(WebDriverError::Command {
            status,
            error: error.error,
            message: error.message,
        })
    }

    /// Start a browser session; returns the session id.
    pub async fn new_session(&self, config: &WebDriverConfig) -> Result<String, WebDriverError> {
        let mut chrome_args = vec!["--window-size=1280,900"];
        let mut firefox_args = Vec::new();
        if config.headless {
            chrome_args.push("--headless=new");
            firefox_args.push("-headless");
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": config.browser,
                    "goog:chromeOptions": { "args": chrome_args },
                    "moz:firefoxOptions": { "args": firefox_args },
                }
            }
        });

        let value = self.command(Method::POST, "/session", Some(capabilities)).await?;
        let session = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::MalformedResponse("missing sessionId".to_string()))?;
        debug!(session, browser = %config.browser, "webdriver session created");
        Ok(session.to_string())
    }

    pub async fn delete_session(&self, session: &str) -> Result<(), WebDriverError> {
        self.command(Method::DELETE, &format!("/session/{session}"), None)
            .await
            .map(drop)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub async fn set_timeouts(
        &self,
        session: &str,
        page_load: Duration,
        script: Duration,
    ) -> Result<(), WebDriverError> {
        let body = json!({
            "pageLoad": page_load.as_millis() as u64,
            "script": script.as_millis() as u64,
        });
        self.command(Method::POST, &format!("/session/{session}/timeouts"), Some(body))
            .await
            .map(drop)
    }

    /// Navigate and wait for the page load to complete.
    pub async fn navigate(&self, session: &str, url: &str) -> Result<(), WebDriverError> {
        self.command(
            Method::POST,
            &format!("/session/{session}/url"),
            Some(json!({ "url": url })),
        )
        .await
        .map(drop)
    }

    /// All elements matching a CSS selector, in document order.
    pub async fn find_elements(&self, session: &str, selector: &str) -> Result<Vec<ElementId>, WebDriverError> {
        let value = self
            .command(
                Method::POST,
                &format!("/session/{session}/elements"),
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;

        let items = value
            .as_array()
            .ok_or_else(|| WebDriverError::MalformedResponse("elements is not an array".to_string()))?;
        items
            .iter()
            .map(|item| {
                ElementId::from_json(item)
                    .ok_or_else(|| WebDriverError::MalformedResponse(format!("bad element reference: {item}")))
            })
            .collect()
    }

    /// Type `text` into an element as keyboard input.
    pub async fn send_keys(&self, session: &str, element: &ElementId, text: &str) -> Result<(), WebDriverError> {
        self.command(
            Method::POST,
            &format!("/session/{session}/element/{}/value", element.0),
            Some(json!({ "text": text })),
        )
        .await
        .map(drop)
    }

    /// Run a synchronous script in the page.
    pub async fn execute(&self, session: &str, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.command(
            Method::POST,
            &format!("/session/{session}/execute/sync"),
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    /// Read a DOM property of an element.
    pub async fn property(&self, session: &str, element: &ElementId, name: &str) -> Result<Value, WebDriverError> {
        self.command(
            Method::GET,
            &format!("/session/{session}/element/{}/property/{name}", element.0),
            None,
        )
        .await
    }
}
