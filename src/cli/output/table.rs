//! Table output formatting for CLI commands
//!
//! Renders run outcomes and scenario catalogs with comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{Outcome, Scenario, Verdict};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format scenario outcomes, one row per scenario in execution order
    #[allow(clippy::cast_precision_loss)]
    pub fn format_outcomes(&self, outcomes: &[Outcome]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Scenario", "Verdict", "Fault", "Elapsed", "Observed output"]));

        for outcome in outcomes {
            let verdict_cell = if self.use_colors {
                Cell::new(outcome.verdict).fg(verdict_color(outcome.verdict))
            } else {
                Cell::new(format!("{} {}", verdict_icon(outcome.verdict), outcome.verdict))
            };

            let fault = outcome.fault.map_or_else(|| "-".to_string(), |f| f.to_string());
            let observed = outcome
                .observed_output
                .as_deref()
                .map_or_else(|| "-".to_string(), |o| truncate(o, 40));

            table.add_row(vec![
                Cell::new(&outcome.scenario_id),
                verdict_cell,
                Cell::new(fault),
                Cell::new(format!("{:.1}s", outcome.elapsed_ms as f64 / 1000.0)),
                Cell::new(observed),
            ]);
        }

        table.to_string()
    }

    /// Format a scenario catalog
    pub fn format_scenarios(&self, scenarios: &[Scenario]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Title", "Category", "Apply", "Oracle", "Settle"]));

        for scenario in scenarios {
            let apply = if scenario.apply_mode.is_incremental() {
                "incremental"
            } else {
                "atomic"
            };
            let oracle_cell = if self.use_colors {
                Cell::new(&scenario.oracle).fg(Color::Cyan)
            } else {
                Cell::new(&scenario.oracle)
            };

            table.add_row(vec![
                Cell::new(&scenario.id),
                Cell::new(truncate(&scenario.title, 36)),
                Cell::new(scenario.category),
                Cell::new(apply),
                oracle_cell,
                Cell::new(format!("{}ms", scenario.timing.settle_timeout_ms)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

/// Check if the terminal supports colors
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    console::colors_enabled()
}

const fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Pass => Color::Green,
        Verdict::Fail => Color::Red,
        Verdict::Error => Color::Yellow,
    }
}

const fn verdict_icon(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "✓",
        Verdict::Fail => "✗",
        Verdict::Error => "!",
    }
}
