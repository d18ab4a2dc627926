//! Common test utilities for integration tests
//!
//! Shared fixtures for driving the harness against the simulated widget.

#![allow(dead_code)]

use std::sync::Arc;

use translit_probe::adapters::simulated::{SimulatedDiscovery, SimulatedWidget};
use translit_probe::domain::models::{SimulatedConfig, TimingDefaults};
use translit_probe::services::{
    AbortSignal, EventualStatePoller, RunnerOptions, ScenarioCatalog, ScenarioRunner,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Simulated widget with the given debounce and latency, wrapped in a
/// discovery the runner can own.
pub fn simulated(debounce_ms: u64, latency_ms: u64) -> Arc<SimulatedDiscovery> {
    Arc::new(SimulatedDiscovery::new(SimulatedWidget::new(SimulatedConfig {
        debounce_ms,
        latency_ms,
        streaming: false,
    })))
}

/// Runner over `discovery` with default options.
pub fn runner(discovery: &Arc<SimulatedDiscovery>, signal: AbortSignal) -> ScenarioRunner {
    runner_with(discovery, signal, RunnerOptions::default())
}

pub fn runner_with(
    discovery: &Arc<SimulatedDiscovery>,
    signal: AbortSignal,
    options: RunnerOptions,
) -> ScenarioRunner {
    ScenarioRunner::new(discovery.clone(), EventualStatePoller::new(signal), options)
}

/// Build a catalog from YAML, using default category timings.
pub fn catalog(yaml: &str) -> ScenarioCatalog {
    ScenarioCatalog::from_yaml_str(yaml, &TimingDefaults::default()).expect("invalid test catalog")
}

pub fn builtin() -> ScenarioCatalog {
    ScenarioCatalog::builtin(&TimingDefaults::default()).expect("builtin catalog must build")
}
