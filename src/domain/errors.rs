//! Domain errors for the translit-probe harness.

use std::path::PathBuf;
use thiserror::Error;

use super::models::{Category, FaultKind, InvalidScenarioId, Script, ScenarioId, TimingError};
use super::ports::SurfaceRole;

/// Faults raised by a surface adapter. Surfaces never retry internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("{role} surface unavailable: {reason}")]
    Unavailable { role: SurfaceRole, reason: String },

    #[error("navigation lost: {0}")]
    NavigationLost(String),

    #[error("surface protocol error: {0}")]
    Protocol(String),
}

impl SurfaceError {
    pub fn unavailable(role: SurfaceRole, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            role,
            reason: reason.into(),
        }
    }

    pub const fn fault_kind(&self) -> FaultKind {
        match self {
            Self::Unavailable { .. } | Self::Protocol(_) => FaultKind::SurfaceUnavailable,
            Self::NavigationLost(_) => FaultKind::NavigationLost,
        }
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Everything that can stop a single scenario from passing.
///
/// Caught at the scenario boundary and turned into an outcome; never
/// propagates past the runner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScenarioFault {
    #[error("transformation absent: no {script} text within {elapsed_ms}ms (last output {last_observed:?})")]
    TransformationAbsent {
        script: Script,
        last_observed: Option<String>,
        elapsed_ms: u64,
    },

    #[error("{oracle} did not hold within {elapsed_ms}ms (last output {last_observed:?})")]
    TimeoutExceeded {
        oracle: String,
        last_observed: Option<String>,
        elapsed_ms: u64,
    },

    #[error("oracle mismatch: {reason}")]
    OracleMismatch { reason: String, observed: String },

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("cancelled by run-level abort")]
    Cancelled { last_observed: Option<String> },
}

impl ScenarioFault {
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::TransformationAbsent { .. } => FaultKind::TransformationAbsent,
            Self::TimeoutExceeded { .. } => FaultKind::TimeoutExceeded,
            Self::OracleMismatch { .. } => FaultKind::OracleMismatch,
            Self::Surface(err) => err.fault_kind(),
            Self::Cancelled { .. } => FaultKind::Cancelled,
        }
    }

    /// Value retained for diagnosis, if one was observed.
    pub fn last_observed(&self) -> Option<&str> {
        match self {
            Self::TransformationAbsent { last_observed, .. }
            | Self::TimeoutExceeded { last_observed, .. }
            | Self::Cancelled { last_observed } => last_observed.as_deref(),
            Self::OracleMismatch { observed, .. } => Some(observed),
            Self::Surface(_) => None,
        }
    }
}

/// Structural catalog problems, detected before any scenario runs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidId(#[from] InvalidScenarioId),

    #[error("duplicate scenario id: {0}")]
    DuplicateId(ScenarioId),

    #[error("scenario {id} is declared {declared} but its id implies {implied}")]
    CategoryMismatch {
        id: ScenarioId,
        declared: Category,
        implied: Category,
    },

    #[error("scenario {id} has an invalid timing profile: {source}")]
    InvalidTiming {
        id: ScenarioId,
        #[source]
        source: TimingError,
    },

    #[error("scenario {id} references an unresolvable oracle: {reason}")]
    UnresolvableOracle { id: ScenarioId, reason: String },

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog contains no scenarios")]
    Empty,
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Run-level fatal errors. Scenario faults never end up here.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("surface discovery failed: {0}")]
    Discovery(#[source] SurfaceError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
