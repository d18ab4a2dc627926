pub mod abort;
pub mod catalog;
pub mod oracle;
pub mod poller;
pub mod runner;

pub use abort::{AbortHandle, AbortSignal};
pub use catalog::{ScenarioCatalog, ScenarioRecord};
pub use oracle::BoundOracle;
pub use poller::{EventualStatePoller, PollError, Settled};
pub use runner::{RunEvent, RunnerOptions, ScenarioRunner};
