use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::scenario::{Category, ScenarioId};

/// Final verdict for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    Error,
}

impl Verdict {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable reason behind a non-passing verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// ScriptPresence never held within the settle budget
    TransformationAbsent,
    /// Any other oracle never held within the settle budget
    TimeoutExceeded,
    /// The oracle held on a value violating a secondary invariant
    OracleMismatch,
    /// Surface could not be located or read
    SurfaceUnavailable,
    /// The page or session went away mid-scenario
    NavigationLost,
    /// Run-level abort
    Cancelled,
}

impl FaultKind {
    /// Verdict a fault of this kind maps to.
    pub const fn verdict(&self) -> Verdict {
        match self {
            Self::TransformationAbsent | Self::TimeoutExceeded | Self::OracleMismatch => {
                Verdict::Fail
            }
            Self::SurfaceUnavailable | Self::NavigationLost | Self::Cancelled => Verdict::Error,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TransformationAbsent => "transformation_absent",
            Self::TimeoutExceeded => "timeout_exceeded",
            Self::OracleMismatch => "oracle_mismatch",
            Self::SurfaceUnavailable => "surface_unavailable",
            Self::NavigationLost => "navigation_lost",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one executed scenario. Never mutated once appended to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub scenario_id: ScenarioId,
    pub category: Category,
    pub verdict: Verdict,
    /// Last value read from the output surface, if any was read
    pub observed_output: Option<String>,
    /// Output snapshots taken at incremental-typing checkpoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoint_outputs: Vec<String>,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<FaultKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Outcome {
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.fault, Some(FaultKind::Cancelled))
    }
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Errors other than cancellation
    pub errored: usize,
    pub cancelled: usize,
    /// Passed over executed scenarios; cancelled scenarios are excluded
    pub pass_rate: f64,
}

impl RunSummary {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Fail => summary.failed += 1,
                Verdict::Error if outcome.is_cancelled() => summary.cancelled += 1,
                Verdict::Error => summary.errored += 1,
            }
        }
        let executed = summary.total - summary.cancelled;
        if executed > 0 {
            summary.pass_rate = summary.passed as f64 / executed as f64;
        }
        summary
    }

    /// True when every executed scenario passed and nothing was cancelled.
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.cancelled == 0
    }
}

/// Ordered outcomes of one run, consumed by external reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    outcomes: Vec<Outcome>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    /// Append an outcome; insertion order is execution order.
    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
        self.summary = RunSummary::from_outcomes(&self.outcomes);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.scenario_id.as_str() == id)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
