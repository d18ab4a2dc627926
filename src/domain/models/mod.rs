pub mod config;
pub mod oracle;
pub mod outcome;
pub mod scenario;
pub mod timing;

pub use config::{
    Config, LogConfig, LogFormat, RotationPolicy, RunnerConfig, SimulatedConfig, TargetConfig,
    TargetKind, TimingDefaults, WebDriverConfig,
};
pub use oracle::{OracleKind, Script};
pub use outcome::{FaultKind, Outcome, RunReport, RunSummary, Verdict};
pub use scenario::{ApplyMode, Category, InvalidScenarioId, Scenario, ScenarioId};
pub use timing::{TimingError, TimingProfile};
