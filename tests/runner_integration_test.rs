//! End-to-end runs against the simulated widget.

mod common;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use translit_probe::adapters::simulated::{transliterate, SimulatedDiscovery, SimulatedWidget};
use translit_probe::domain::errors::{SurfaceError, SurfaceResult};
use translit_probe::domain::models::{FaultKind, SimulatedConfig, Verdict};
use translit_probe::domain::ports::{Surface, SurfacePair, SurfaceRole};
use translit_probe::services::{AbortSignal, RunEvent, RunnerOptions};

use common::{builtin, catalog, runner, runner_with, simulated};

const NEGATIVE_YAML: &str = r"
scenarios:
  - id: Neg_Fun_0001
    title: Currency amount survives
    category: negative
    input_text: Rs. 2500 kuduththen
    oracle:
      kind: substring_preserved
      token: '2500'
  - id: Neg_Fun_0002
    title: Latin word that gets transliterated away
    category: negative
    input_text: amma appa
    oracle:
      kind: substring_preserved
      token: amma
    timing:
      settle_timeout_ms: 2000
      poll_interval_ms: 100
      min_settle_delay_ms: 500
  - id: Neg_Fun_0003
    title: Symbols only
    category: negative
    input_text: '@@@ ### !!!'
    oracle:
      kind: non_crash
";

#[tokio::test(start_paused = true)]
async fn test_slow_widget_within_budget_passes() {
    common::setup_test_logging();
    let discovery = simulated(300, 5_000);
    let catalog = builtin().filter(None, Some("Pos_Fun_0001"));

    let report = runner(&discovery, AbortSignal::never())
        .run(&catalog)
        .await
        .unwrap();

    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.verdict, Verdict::Pass, "{outcome:?}");
    assert!(outcome.elapsed_ms >= 5_300, "passed before the widget answered");
    assert!(outcome.elapsed_ms < 6_000);
}

#[tokio::test(start_paused = true)]
async fn test_substring_oracles() {
    let discovery = simulated(300, 250);

    let report = runner(&discovery, AbortSignal::never())
        .run(&catalog(NEGATIVE_YAML))
        .await
        .unwrap();

    let preserved = report.outcome("Neg_Fun_0001").unwrap();
    assert_eq!(preserved.verdict, Verdict::Pass);
    assert!(preserved.observed_output.as_deref().unwrap().contains("2500"));

    let missing = report.outcome("Neg_Fun_0002").unwrap();
    assert_eq!(missing.verdict, Verdict::Fail);
    assert_eq!(missing.fault, Some(FaultKind::TimeoutExceeded));
    assert_eq!(
        missing.observed_output.as_deref(),
        Some(transliterate("amma appa").as_str())
    );
    assert!(missing.elapsed_ms >= 2_500);

    let symbols = report.outcome("Neg_Fun_0003").unwrap();
    assert_eq!(symbols.verdict, Verdict::Pass);

    assert_eq!(report.summary.passed, 2);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.summary.is_clean());
}

#[tokio::test(start_paused = true)]
async fn test_poller_returns_first_satisfying_partial_output() {
    let discovery = Arc::new(SimulatedDiscovery::new(SimulatedWidget::new(
        SimulatedConfig {
            debounce_ms: 300,
            latency_ms: 2_000,
            streaming: true,
        },
    )));
    let catalog = builtin().filter(None, Some("Pos_Fun_0001"));

    let report = runner(&discovery, AbortSignal::never())
        .run(&catalog)
        .await
        .unwrap();

    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.verdict, Verdict::Pass);
    let observed = outcome.observed_output.as_deref().unwrap();
    assert!(observed.starts_with(&transliterate("naan")));
    assert_ne!(observed, transliterate("naan veetukku poren"));
}

#[tokio::test(start_paused = true)]
async fn test_reload_each_scenario_rediscovers_every_time() {
    let discovery = simulated(300, 250);
    let options = RunnerOptions {
        reload_each_scenario: true,
        ..RunnerOptions::default()
    };

    let report = runner_with(&discovery, AbortSignal::never(), options)
        .run(&builtin().filter(None, Some("Pos_Fun_000")))
        .await
        .unwrap();

    assert_eq!(report.summary.passed, 9);
    assert_eq!(discovery.discoveries(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_events_bracket_the_run() {
    let discovery = simulated(300, 250);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let report = runner(&discovery, AbortSignal::never())
        .with_events(tx)
        .run(&builtin().filter(None, Some("Neg_Fun_000")))
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(RunEvent::Started { total: 9 })));
    assert!(matches!(events.last(), Some(RunEvent::Finished)));

    let started: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::ScenarioStarted { id, .. } => Some(id.clone()),
            _ => None,
        })
        .collect();
    let reported: Vec<String> = report
        .outcomes()
        .iter()
        .map(|o| o.scenario_id.to_string())
        .collect();
    assert_eq!(started, reported);
}

#[tokio::test(start_paused = true)]
async fn test_report_serializes_for_external_tooling() {
    let discovery = simulated(300, 250);
    let report = runner(&discovery, AbortSignal::never())
        .run(&builtin().filter(None, Some("Pos_UI")))
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["run_id"].is_string());
    assert!(json["finished_at"].is_string());
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["pass_rate"], 1.0);
    assert_eq!(json["outcomes"][0]["verdict"], "pass");
    assert_eq!(json["outcomes"][0]["category"], "ui_behavior");
    assert_eq!(json["outcomes"][0]["checkpoint_outputs"][0], "நான்");
    assert!(json["outcomes"][0].get("fault").is_none());
}

/// Input that accepts everything and an output whose page went away.
struct DetachedPage;

#[async_trait]
impl Surface for DetachedPage {
    fn role(&self) -> SurfaceRole {
        SurfaceRole::Output
    }

    async fn reset(&self) -> SurfaceResult<()> {
        Ok(())
    }

    async fn apply_atomic(&self, _text: &str) -> SurfaceResult<()> {
        Ok(())
    }

    async fn apply_incremental(&self, _text: &str, _per_char_delay: Duration) -> SurfaceResult<()> {
        Ok(())
    }

    async fn current_value(&self) -> SurfaceResult<String> {
        Err(SurfaceError::NavigationLost("no such window".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_lost_page_is_an_error_not_a_failure() {
    let discovery = simulated(300, 250);
    let runner = runner(&discovery, AbortSignal::never());
    let catalog = builtin();
    let scenario = catalog.get("Pos_Fun_0002").unwrap();

    let surfaces = SurfacePair::new(Arc::new(DetachedPage), Arc::new(DetachedPage));
    let outcome = runner.run_scenario(scenario, &surfaces).await;

    assert_eq!(outcome.verdict, Verdict::Error);
    assert_eq!(outcome.fault, Some(FaultKind::NavigationLost));
    assert!(outcome.detail.unwrap().contains("no such window"));
}
