//! Surface port - interface for the widget's text controls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::SurfaceResult;

/// Role a surface plays in the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceRole {
    Input,
    Output,
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Uniform read/write contract over one text control.
///
/// Writes mutate the live control. Implementations must not retry; waiting
/// and retrying belong to the poller.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Role of this surface.
    fn role(&self) -> SurfaceRole;

    /// Clear the current value.
    async fn reset(&self) -> SurfaceResult<()>;

    /// Replace the entire value in one step, like a paste.
    async fn apply_atomic(&self, text: &str) -> SurfaceResult<()>;

    /// Append `text` one character at a time, `per_char_delay` apart.
    async fn apply_incremental(&self, text: &str, per_char_delay: Duration) -> SurfaceResult<()>;

    /// Snapshot of the present value.
    async fn current_value(&self) -> SurfaceResult<String>;
}

/// Input and output surface of one page, owned by the runner for a run.
#[derive(Clone)]
pub struct SurfacePair {
    pub input: Arc<dyn Surface>,
    pub output: Arc<dyn Surface>,
}

impl SurfacePair {
    pub fn new(input: Arc<dyn Surface>, output: Arc<dyn Surface>) -> Self {
        Self { input, output }
    }

    /// Reset the input first so a pending transformation cannot refill the
    /// output after it was cleared.
    pub async fn reset(&self) -> SurfaceResult<()> {
        self.input.reset().await?;
        self.output.reset().await
    }
}

impl fmt::Debug for SurfacePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfacePair")
            .field("input", &self.input.role())
            .field("output", &self.output.role())
            .finish()
    }
}

/// Loads the target page and locates its surfaces.
///
/// By convention of the widget under test, the first text control is the
/// input and the second is the output.
#[async_trait]
pub trait SurfaceDiscovery: Send + Sync {
    /// Adapter name for logs and reports.
    fn name(&self) -> &'static str;

    /// Load the target and locate both surfaces within `timeout`.
    async fn discover(&self, timeout: Duration) -> SurfaceResult<SurfacePair>;

    /// Release the page or session.
    async fn close(&self) -> SurfaceResult<()> {
        Ok(())
    }
}
