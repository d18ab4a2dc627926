//! Domain layer for the translit-probe harness
//!
//! Scenario, oracle, timing and outcome models, the surface ports adapters
//! implement, and the error taxonomy.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    CatalogError, HarnessError, HarnessResult, ScenarioFault, SurfaceError, SurfaceResult,
};
