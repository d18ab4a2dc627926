//! Surface adapters for the widget under test.

pub mod simulated;
pub mod webdriver;

use std::sync::Arc;

use crate::domain::models::{TargetConfig, TargetKind};
use crate::domain::ports::SurfaceDiscovery;
use crate::services::AbortSignal;

/// Build the discovery adapter selected by `config`.
pub fn discovery_for(
    config: &TargetConfig,
    abort: AbortSignal,
) -> Result<Arc<dyn SurfaceDiscovery>, webdriver::WebDriverError> {
    Ok(match config.kind {
        TargetKind::Simulated => Arc::new(simulated::SimulatedDiscovery::new(
            simulated::SimulatedWidget::new(config.simulated.clone()),
        )),
        TargetKind::Webdriver => Arc::new(webdriver::WebDriverDiscovery::new(
            config.webdriver.clone(),
            abort,
        )?),
    })
}
