//! translit-probe - verification harness for live transliteration widgets
//!
//! Drives a debounced, eventually-consistent text transformation widget
//! through its input surface, waits for the output surface to settle and
//! judges the result with per-scenario oracles.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): scenario, oracle, timing and outcome models,
//!   the surface ports and the error taxonomy
//! - **Service Layer** (`services`): eventual-state poller, oracle evaluation,
//!   scenario catalog and the sequential runner
//! - **Adapters** (`adapters`): simulated in-process widget and W3C WebDriver
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use translit_probe::adapters::simulated::{SimulatedDiscovery, SimulatedWidget};
//! use translit_probe::domain::models::TimingDefaults;
//! use translit_probe::services::{
//!     AbortSignal, EventualStatePoller, RunnerOptions, ScenarioCatalog, ScenarioRunner,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = ScenarioCatalog::builtin(&TimingDefaults::default())?;
//!     let discovery = Arc::new(SimulatedDiscovery::new(SimulatedWidget::default()));
//!     let poller = EventualStatePoller::new(AbortSignal::never());
//!     let runner = ScenarioRunner::new(discovery, poller, RunnerOptions::default());
//!
//!     let report = runner.run(&catalog).await?;
//!     println!("{} of {} passed", report.summary.passed, report.summary.total);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{CatalogError, HarnessError, ScenarioFault, SurfaceError};
pub use domain::models::{
    Category, Config, OracleKind, Outcome, RunReport, RunSummary, Scenario, TimingProfile, Verdict,
};
pub use domain::ports::{Surface, SurfaceDiscovery, SurfacePair, SurfaceRole};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AbortSignal, EventualStatePoller, ScenarioCatalog, ScenarioRunner};
