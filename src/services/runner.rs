//! Scenario runner.
//!
//! Executes a catalog strictly in order against one exclusively owned surface
//! pair. Every scenario fault is converted to an [`Outcome`] at the scenario
//! boundary; only a failed initial discovery ends a run early.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{HarnessError, HarnessResult, ScenarioFault, SurfaceError};
use crate::domain::models::{
    ApplyMode, FaultKind, Outcome, RunReport, RunnerConfig, Scenario, Verdict,
};
use crate::domain::ports::{SurfaceDiscovery, SurfacePair};
use crate::services::catalog::ScenarioCatalog;
use crate::services::oracle::BoundOracle;
use crate::services::poller::{EventualStatePoller, PollError};

/// Runner settings.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Bound for locating the surfaces
    pub discovery_timeout: Duration,
    /// Rediscover surfaces before every scenario
    pub reload_each_scenario: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&RunnerConfig::default())
    }
}

impl From<&RunnerConfig> for RunnerOptions {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            discovery_timeout: Duration::from_millis(config.discovery_timeout_ms),
            reload_each_scenario: config.reload_each_scenario,
        }
    }
}

/// Progress notifications emitted while a run executes.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Surfaces located, execution starts.
    Started { total: usize },
    /// A scenario is about to execute.
    ScenarioStarted { index: usize, id: String },
    /// A scenario finished and its outcome was recorded.
    ScenarioFinished(Outcome),
    /// Every scenario has an outcome.
    Finished,
}

/// Sequential scenario executor.
pub struct ScenarioRunner {
    discovery: Arc<dyn SurfaceDiscovery>,
    poller: EventualStatePoller,
    options: RunnerOptions,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

/// Evidence gathered while a scenario executes, kept even when it fails.
#[derive(Debug, Default)]
struct ScenarioTrace {
    checkpoints: Vec<String>,
}

impl ScenarioRunner {
    pub fn new(
        discovery: Arc<dyn SurfaceDiscovery>,
        poller: EventualStatePoller,
        options: RunnerOptions,
    ) -> Self {
        Self {
            discovery,
            poller,
            options,
            events: None,
        }
    }

    /// Publish [`RunEvent`]s to `tx`.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver only means nobody is watching progress.
            let _ = tx.send(event);
        }
    }

    fn is_aborted(&self) -> bool {
        self.poller.abort_signal().is_aborted()
    }

    /// Run every scenario of the catalog in order.
    ///
    /// Fails only when the surfaces cannot be located before the first
    /// scenario. An abort records the in-flight scenario and all remaining
    /// ones as cancelled.
    #[instrument(skip_all, fields(discovery = self.discovery.name(), scenarios = catalog.len()))]
    pub async fn run(&self, catalog: &ScenarioCatalog) -> HarnessResult<RunReport> {
        let mut report = RunReport::new();
        info!(run_id = %report.run_id, "starting run");

        let mut surfaces = match self.discover().await {
            Some(Ok(pair)) => Some(pair),
            Some(Err(err)) => {
                if let Err(close_err) = self.discovery.close().await {
                    warn!(error = %close_err, "failed to release surfaces");
                }
                return Err(HarnessError::Discovery(err));
            }
            None => None,
        };
        self.emit(RunEvent::Started {
            total: catalog.len(),
        });

        let mut needs_rediscovery = false;
        for (index, scenario) in catalog.iter().enumerate() {
            self.emit(RunEvent::ScenarioStarted {
                index,
                id: scenario.id.to_string(),
            });

            let rediscover =
                needs_rediscovery || (self.options.reload_each_scenario && index > 0);
            let outcome = match self.prepare(scenario, rediscover, &mut surfaces).await {
                Ok(pair) => self.run_scenario(scenario, pair).await,
                Err(outcome) => outcome,
            };

            needs_rediscovery = matches!(
                outcome.fault,
                Some(FaultKind::SurfaceUnavailable | FaultKind::NavigationLost)
            );
            self.emit(RunEvent::ScenarioFinished(outcome.clone()));
            report.record(outcome);
        }

        if let Err(err) = self.discovery.close().await {
            warn!(error = %err, "failed to release surfaces");
        }

        report.finish();
        self.emit(RunEvent::Finished);
        info!(
            run_id = %report.run_id,
            passed = report.summary.passed,
            failed = report.summary.failed,
            errored = report.summary.errored,
            cancelled = report.summary.cancelled,
            "run finished"
        );
        Ok(report)
    }

    /// Locate the surfaces; `None` when the run was aborted meanwhile.
    async fn discover(&self) -> Option<Result<SurfacePair, SurfaceError>> {
        tokio::select! {
            biased;
            () = self.poller.abort_signal().aborted() => None,
            result = self.discovery.discover(self.options.discovery_timeout) => Some(result),
        }
    }

    /// Surfaces for the next scenario, or the outcome recorded in its place.
    async fn prepare<'s>(
        &self,
        scenario: &Scenario,
        rediscover: bool,
        surfaces: &'s mut Option<SurfacePair>,
    ) -> Result<&'s SurfacePair, Outcome> {
        if self.is_aborted() {
            return Err(cancelled_before_start(scenario));
        }

        if rediscover {
            debug!(scenario_id = %scenario.id, "rediscovering surfaces");
            match self.discover().await {
                Some(Ok(pair)) => *surfaces = Some(pair),
                Some(Err(err)) => {
                    warn!(scenario_id = %scenario.id, error = %err, "surface rediscovery failed");
                    return Err(fault_outcome(
                        scenario,
                        ScenarioFault::Surface(err),
                        Vec::new(),
                        Duration::ZERO,
                    ));
                }
                None => return Err(cancelled_before_start(scenario)),
            }
        }

        surfaces
            .as_ref()
            .ok_or_else(|| cancelled_before_start(scenario))
    }

    /// Execute one scenario and convert its result into an outcome.
    #[allow(clippy::cast_possible_truncation)]
    #[instrument(skip_all, fields(scenario_id = %scenario.id, category = %scenario.category))]
    pub async fn run_scenario(&self, scenario: &Scenario, surfaces: &SurfacePair) -> Outcome {
        let start = Instant::now();
        let mut trace = ScenarioTrace::default();
        let result = self.execute(scenario, surfaces, &mut trace).await;
        let elapsed = start.elapsed();

        match result {
            Ok(observed) => {
                info!(elapsed_ms = elapsed.as_millis() as u64, "scenario passed");
                Outcome {
                    scenario_id: scenario.id.clone(),
                    category: scenario.category,
                    verdict: Verdict::Pass,
                    observed_output: Some(observed),
                    checkpoint_outputs: trace.checkpoints,
                    elapsed_ms: elapsed.as_millis() as u64,
                    fault: None,
                    detail: None,
                }
            }
            Err(fault) => {
                warn!(
                    fault = %fault.kind(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %fault,
                    "scenario did not pass"
                );
                fault_outcome(scenario, fault, trace.checkpoints, elapsed)
            }
        }
    }

    async fn execute(
        &self,
        scenario: &Scenario,
        surfaces: &SurfacePair,
        trace: &mut ScenarioTrace,
    ) -> Result<String, ScenarioFault> {
        self.guarded(surfaces.reset()).await?;

        let ApplyMode::Incremental {
            per_char_delay_ms, ..
        } = scenario.apply_mode
        else {
            self.guarded(surfaces.input.apply_atomic(&scenario.input_text))
                .await?;
            return self.settle(scenario, surfaces, BoundOracle::new(&scenario.oracle)).await;
        };

        let per_char_delay = Duration::from_millis(per_char_delay_ms);
        let stages = scenario.stages();
        let (last, leading) = stages
            .split_last()
            .map_or((scenario.input_text.as_str(), &[][..]), |(l, s)| (*l, s));

        let mut previous: Option<String> = None;
        for stage in leading {
            self.guarded(surfaces.input.apply_incremental(stage, per_char_delay))
                .await?;

            let observed = match previous.take() {
                Some(earlier) if scenario.oracle.is_stateful() => {
                    let bound = BoundOracle::new(&scenario.oracle).with_previous(earlier);
                    self.settle(scenario, surfaces, bound).await?
                }
                _ => {
                    self.pause(scenario.timing.min_settle_delay()).await?;
                    self.guarded(surfaces.output.current_value()).await?
                }
            };
            debug!(checkpoint = trace.checkpoints.len(), observed = %observed, "checkpoint observed");
            trace.checkpoints.push(observed.clone());
            previous = Some(observed);
        }

        self.guarded(surfaces.input.apply_incremental(last, per_char_delay))
            .await?;

        let bound = match previous {
            Some(earlier) if scenario.oracle.is_stateful() => {
                BoundOracle::new(&scenario.oracle).with_previous(earlier)
            }
            _ => BoundOracle::new(&scenario.oracle),
        };
        self.settle(scenario, surfaces, bound).await
    }

    /// Wait the minimum settle delay, then poll the output until the oracle
    /// holds.
    async fn settle(
        &self,
        scenario: &Scenario,
        surfaces: &SurfacePair,
        oracle: BoundOracle<'_>,
    ) -> Result<String, ScenarioFault> {
        self.pause(scenario.timing.min_settle_delay()).await?;

        let output = &surfaces.output;
        let polled = self
            .poller
            .await_state(|| output.current_value(), |v: &String| oracle.settled(v), &scenario.timing)
            .await;

        match polled {
            Ok(settled) => {
                debug!(samples = settled.samples, "oracle held");
                oracle.check_settled(scenario, &settled.value)?;
                Ok(settled.value)
            }
            Err(PollError::TimeoutExceeded {
                last_observed,
                elapsed,
                ..
            }) => Err(oracle.timeout_fault(Some(last_observed), elapsed)),
            Err(PollError::Cancelled { last_observed, .. }) => {
                Err(ScenarioFault::Cancelled { last_observed })
            }
            Err(PollError::Surface(err)) => Err(err.into()),
        }
    }

    async fn pause(&self, delay: Duration) -> Result<(), ScenarioFault> {
        if self.poller.settle_delay(delay).await {
            Ok(())
        } else {
            Err(ScenarioFault::Cancelled {
                last_observed: None,
            })
        }
    }

    /// Run a surface operation unless the run is aborted first.
    async fn guarded<T>(
        &self,
        operation: impl Future<Output = Result<T, SurfaceError>>,
    ) -> Result<T, ScenarioFault> {
        tokio::select! {
            biased;
            () = self.poller.abort_signal().aborted() => Err(ScenarioFault::Cancelled { last_observed: None }),
            result = operation => result.map_err(ScenarioFault::from),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fault_outcome(
    scenario: &Scenario,
    fault: ScenarioFault,
    checkpoints: Vec<String>,
    elapsed: Duration,
) -> Outcome {
    let kind = fault.kind();
    Outcome {
        scenario_id: scenario.id.clone(),
        category: scenario.category,
        verdict: kind.verdict(),
        observed_output: fault.last_observed().map(str::to_string),
        checkpoint_outputs: checkpoints,
        elapsed_ms: elapsed.as_millis() as u64,
        fault: Some(kind),
        detail: Some(fault.to_string()),
    }
}

fn cancelled_before_start(scenario: &Scenario) -> Outcome {
    fault_outcome(
        scenario,
        ScenarioFault::Cancelled {
            last_observed: None,
        },
        Vec::new(),
        Duration::ZERO,
    )
}
