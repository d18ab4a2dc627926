//! In-process simulated transliteration widget.
//!
//! Behaves like the live page as far as the harness can tell: every input
//! mutation restarts a debounce timer, and once the input has been quiet for
//! the debounce period the output is rewritten after a processing latency.
//! Mutations that land while a transformation is pending supersede it.

mod transliterate;

pub use transliterate::transliterate;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::errors::{SurfaceError, SurfaceResult};
use crate::domain::models::SimulatedConfig;
use crate::domain::ports::{Surface, SurfaceDiscovery, SurfacePair, SurfaceRole};

#[derive(Debug, Default)]
struct WidgetState {
    input: String,
    output: String,
    /// Bumped on every input mutation; pending work for an older generation
    /// is discarded.
    generation: u64,
    frozen: bool,
    fault: Option<SurfaceError>,
    transformations: u64,
}

/// Simulated widget shared by its two surfaces.
#[derive(Debug, Clone)]
pub struct SimulatedWidget {
    state: Arc<RwLock<WidgetState>>,
    config: SimulatedConfig,
}

impl SimulatedWidget {
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(WidgetState::default())),
            config,
        }
    }

    /// Input and output surfaces bound to this widget.
    pub fn surfaces(&self) -> SurfacePair {
        SurfacePair::new(
            Arc::new(SimulatedSurface {
                role: SurfaceRole::Input,
                widget: self.clone(),
            }),
            Arc::new(SimulatedSurface {
                role: SurfaceRole::Output,
                widget: self.clone(),
            }),
        )
    }

    /// Stop the widget from ever updating its output again.
    pub async fn freeze(&self) {
        self.state.write().await.frozen = true;
    }

    /// Make every surface operation fail with `fault` until cleared.
    pub async fn inject_fault(&self, fault: Option<SurfaceError>) {
        self.state.write().await.fault = fault;
    }

    /// Current `(input, output)` values.
    pub async fn snapshot(&self) -> (String, String) {
        let state = self.state.read().await;
        (state.input.clone(), state.output.clone())
    }

    /// Number of transformations that reached the output.
    pub async fn transformations(&self) -> u64 {
        self.state.read().await.transformations
    }

    /// Simulate a page reload: clear both controls, drop pending work and
    /// injected faults.
    pub async fn reload(&self) {
        let mut state = self.state.write().await;
        state.input.clear();
        state.output.clear();
        state.generation += 1;
        state.fault = None;
    }

    async fn check(&self) -> SurfaceResult<()> {
        match &self.state.read().await.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    /// Mutate the input and schedule the debounced transformation.
    async fn edit_input(&self, edit: impl FnOnce(&mut String)) {
        let generation = {
            let mut state = self.state.write().await;
            edit(&mut state.input);
            state.generation += 1;
            state.generation
        };

        let widget = self.clone();
        tokio::spawn(async move { widget.transform(generation).await });
    }

    async fn transform(self, generation: u64) {
        tokio::time::sleep(Duration::from_millis(self.config.debounce_ms)).await;

        let input = {
            let state = self.state.read().await;
            if state.generation != generation || state.frozen {
                return;
            }
            state.input.clone()
        };
        let target = transliterate(&input);
        let latency = Duration::from_millis(self.config.latency_ms);

        if self.config.streaming {
            let words: Vec<&str> = input.split_inclusive(char::is_whitespace).collect();
            let partial = transliterate(&words[..words.len().div_ceil(2)].concat());
            tokio::time::sleep(latency / 2).await;
            self.publish(generation, partial).await;
            tokio::time::sleep(latency - latency / 2).await;
        } else {
            tokio::time::sleep(latency).await;
        }
        self.publish(generation, target).await;
    }

    async fn publish(&self, generation: u64, output: String) {
        let mut state = self.state.write().await;
        if state.generation != generation || state.frozen {
            trace!(generation, "superseded transformation dropped");
            return;
        }
        debug!(generation, output = %output, "widget output updated");
        state.output = output;
        state.transformations += 1;
    }
}

impl Default for SimulatedWidget {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

/// One control of a [`SimulatedWidget`].
pub struct SimulatedSurface {
    role: SurfaceRole,
    widget: SimulatedWidget,
}

#[async_trait]
impl Surface for SimulatedSurface {
    fn role(&self) -> SurfaceRole {
        self.role
    }

    async fn reset(&self) -> SurfaceResult<()> {
        self.widget.check().await?;
        match self.role {
            SurfaceRole::Input => self.widget.edit_input(String::clear).await,
            SurfaceRole::Output => self.widget.state.write().await.output.clear(),
        }
        Ok(())
    }

    async fn apply_atomic(&self, text: &str) -> SurfaceResult<()> {
        self.widget.check().await?;
        if self.role == SurfaceRole::Output {
            return Err(SurfaceError::Protocol("output surface is read-only".to_string()));
        }
        let text = text.to_string();
        self.widget.edit_input(move |input| *input = text).await;
        Ok(())
    }

    async fn apply_incremental(&self, text: &str, per_char_delay: Duration) -> SurfaceResult<()> {
        if self.role == SurfaceRole::Output {
            return Err(SurfaceError::Protocol("output surface is read-only".to_string()));
        }
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                tokio::time::sleep(per_char_delay).await;
            }
            self.widget.check().await?;
            self.widget.edit_input(|input| input.push(c)).await;
        }
        Ok(())
    }

    async fn current_value(&self) -> SurfaceResult<String> {
        self.widget.check().await?;
        let state = self.widget.state.read().await;
        Ok(match self.role {
            SurfaceRole::Input => state.input.clone(),
            SurfaceRole::Output => state.output.clone(),
        })
    }
}

/// Discovery over a [`SimulatedWidget`]; every discovery reloads the page.
#[derive(Debug)]
pub struct SimulatedDiscovery {
    widget: SimulatedWidget,
    failure: RwLock<Option<SurfaceError>>,
    discoveries: AtomicU32,
}

impl SimulatedDiscovery {
    pub fn new(widget: SimulatedWidget) -> Self {
        Self {
            widget,
            failure: RwLock::new(None),
            discoveries: AtomicU32::new(0),
        }
    }

    pub fn widget(&self) -> &SimulatedWidget {
        &self.widget
    }

    /// Make subsequent discoveries fail with `failure` until cleared.
    pub async fn fail_with(&self, failure: Option<SurfaceError>) {
        *self.failure.write().await = failure;
    }

    /// Number of discovery attempts so far.
    pub fn discoveries(&self) -> u32 {
        self.discoveries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SurfaceDiscovery for SimulatedDiscovery {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn discover(&self, _timeout: Duration) -> SurfaceResult<SurfacePair> {
        self.discoveries.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.read().await.clone() {
            return Err(failure);
        }
        self.widget.reload().await;
        Ok(self.widget.surfaces())
    }
}
