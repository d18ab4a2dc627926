//! Surfaces backed by a real page driven through W3C WebDriver.
//!
//! One browser session is created lazily on the first discovery and reused;
//! every later discovery navigates to the target again, which is how the
//! runner recovers from a lost page.

pub mod client;

pub use client::{ElementId, WebDriverClient, WebDriverError};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{SurfaceError, SurfaceResult};
use crate::domain::models::{TimingProfile, WebDriverConfig};
use crate::domain::ports::{Surface, SurfaceDiscovery, SurfacePair, SurfaceRole};
use crate::services::{AbortSignal, EventualStatePoller, PollError};

/// Replace the value and notify the page as a paste would.
const SET_VALUE_SCRIPT: &str = "const el = arguments[0]; \
     el.focus(); \
     el.value = arguments[1]; \
     el.dispatchEvent(new Event('input', { bubbles: true })); \
     el.dispatchEvent(new Event('change', { bubbles: true }));";

/// Clear a control the page only writes to, without notifying it.
const CLEAR_OUTPUT_SCRIPT: &str = "arguments[0].value = '';";

/// Interval between element lookups while the page is loading.
const DISCOVERY_POLL_MS: u64 = 500;

/// One text control on the page.
pub struct WebDriverSurface {
    role: SurfaceRole,
    client: WebDriverClient,
    session: String,
    element: ElementId,
}

impl WebDriverSurface {
    pub fn new(role: SurfaceRole, client: WebDriverClient, session: String, element: ElementId) -> Self {
        Self {
            role,
            client,
            session,
            element,
        }
    }

    fn fault(&self, err: WebDriverError) -> SurfaceError {
        err.into_surface_error(self.role)
    }

    async fn set_value(&self, text: &str) -> SurfaceResult<()> {
        self.client
            .execute(
                &self.session,
                SET_VALUE_SCRIPT,
                vec![self.element.to_json(), Value::String(text.to_string())],
            )
            .await
            .map(drop)
            .map_err(|e| self.fault(e))
    }
}

#[async_trait]
impl Surface for WebDriverSurface {
    fn role(&self) -> SurfaceRole {
        self.role
    }

    async fn reset(&self) -> SurfaceResult<()> {
        match self.role {
            SurfaceRole::Input => self.set_value("").await,
            SurfaceRole::Output => self
                .client
                .execute(&self.session, CLEAR_OUTPUT_SCRIPT, vec![self.element.to_json()])
                .await
                .map(drop)
                .map_err(|e| self.fault(e)),
        }
    }

    async fn apply_atomic(&self, text: &str) -> SurfaceResult<()> {
        self.set_value(text).await
    }

    async fn apply_incremental(&self, text: &str, per_char_delay: Duration) -> SurfaceResult<()> {
        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                tokio::time::sleep(per_char_delay).await;
            }
            self.client
                .send_keys(&self.session, &self.element, c.encode_utf8(&mut buf))
                .await
                .map_err(|e| self.fault(e))?;
        }
        Ok(())
    }

    async fn current_value(&self) -> SurfaceResult<String> {
        let value = self
            .client
            .property(&self.session, &self.element, "value")
            .await
            .map_err(|e| self.fault(e))?;

        match value {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(SurfaceError::Protocol(format!(
                "{} value is not a string: {other}",
                self.role
            ))),
        }
    }
}

/// Creates the browser session, loads the target page and locates the
/// input and output controls.
pub struct WebDriverDiscovery {
    config: WebDriverConfig,
    client: WebDriverClient,
    session: Mutex<Option<String>>,
    poller: EventualStatePoller,
}

impl WebDriverDiscovery {
    pub fn new(config: WebDriverConfig, abort: AbortSignal) -> Result<Self, WebDriverError> {
        let client = WebDriverClient::new(
            config.endpoint.clone(),
            Duration::from_millis(config.command_timeout_ms),
        )?;

        Ok(Self {
            config,
            client,
            session: Mutex::new(None),
            poller: EventualStatePoller::new(abort),
        })
    }

    /// Reuse the open session or start one.
    async fn session(&self, client: &WebDriverClient) -> SurfaceResult<String> {
        let mut session = self.session.lock().await;
        if let Some(id) = &*session {
            return Ok(id.clone());
        }

        let id = client
            .new_session(&self.config)
            .await
            .map_err(|e| e.into_surface_error(SurfaceRole::Input))?;
        client
            .set_timeouts(
                &id,
                Duration::from_millis(self.config.page_load_timeout_ms),
                Duration::from_millis(self.config.command_timeout_ms),
            )
            .await
            .map_err(|e| e.into_surface_error(SurfaceRole::Input))?;

        info!(session = %id, endpoint = %self.config.endpoint, "browser session started");
        *session = Some(id.clone());
        Ok(id)
    }
}

#[async_trait]
impl SurfaceDiscovery for WebDriverDiscovery {
    fn name(&self) -> &'static str {
        "webdriver"
    }

    #[allow(clippy::cast_possible_truncation)]
    #[instrument(skip(self), fields(url = %self.config.url, selector = %self.config.selector))]
    async fn discover(&self, timeout: Duration) -> SurfaceResult<SurfacePair> {
        let client = &self.client;
        let session = self.session(client).await?;

        if let Err(err) = client.navigate(&session, &self.config.url).await {
            // A dead session cannot be navigated; start over next time.
            if err.is_navigation_lost() {
                self.session.lock().await.take();
            }
            return Err(err.into_surface_error(SurfaceRole::Input));
        }

        let timeout_ms = timeout.as_millis() as u64;
        let timing = TimingProfile {
            settle_timeout_ms: timeout_ms,
            poll_interval_ms: DISCOVERY_POLL_MS.min(timeout_ms.max(1)),
            min_settle_delay_ms: 0,
        };
        let selector = self.config.selector.as_str();
        let session_id = session.as_str();

        let found = self
            .poller
            .await_state(
                move || async move {
                    client
                        .find_elements(session_id, selector)
                        .await
                        .map_err(|e| e.into_surface_error(SurfaceRole::Input))
                },
                |elements: &Vec<ElementId>| elements.len() >= 2,
                &timing,
            )
            .await;

        let elements = match found {
            Ok(settled) => settled.value,
            Err(PollError::TimeoutExceeded { last_observed, .. }) => {
                let missing = if last_observed.is_empty() {
                    SurfaceRole::Input
                } else {
                    SurfaceRole::Output
                };
                warn!(found = last_observed.len(), "surfaces not located in time");
                return Err(SurfaceError::unavailable(
                    missing,
                    format!(
                        "{} element(s) matching {selector:?} after {timeout_ms}ms, need 2",
                        last_observed.len()
                    ),
                ));
            }
            Err(PollError::Cancelled { .. }) => {
                return Err(SurfaceError::Protocol("discovery cancelled".to_string()));
            }
            Err(PollError::Surface(err)) => return Err(err),
        };

        debug!(found = elements.len(), "surfaces located");
        let mut elements = elements.into_iter();
        let (Some(input), Some(output)) = (elements.next(), elements.next()) else {
            return Err(SurfaceError::unavailable(SurfaceRole::Output, "element list shrank"));
        };

        Ok(SurfacePair::new(
            Arc::new(WebDriverSurface::new(
                SurfaceRole::Input,
                client.clone(),
                session.clone(),
                input,
            )),
            Arc::new(WebDriverSurface::new(
                SurfaceRole::Output,
                client.clone(),
                session,
                output,
            )),
        ))
    }

    async fn close(&self) -> SurfaceResult<()> {
        let Some(session) = self.session.lock().await.take() else {
            return Ok(());
        };
        self.client
            .delete_session(&session)
            .await
            .map_err(|e| e.into_surface_error(SurfaceRole::Input))?;
        info!(session = %session, "browser session closed");
        Ok(())
    }
}
