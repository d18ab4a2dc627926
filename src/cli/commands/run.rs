//! `run` command: execute a catalog against the configured target.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::adapters::discovery_for;
use crate::cli::output::{create_progress_bar, output, CommandOutput, TableFormatter};
use crate::cli::types::{parse_category, parse_target};
use crate::domain::models::{Category, Config, RunReport, TargetKind, Verdict};
use crate::services::{
    AbortSignal, EventualStatePoller, RunEvent, RunnerOptions, ScenarioCatalog, ScenarioRunner,
};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML catalog to run instead of the builtin suite
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only run scenarios of this category (positive, negative, ui_behavior)
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Only run scenarios whose id starts with this prefix
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Write the JSON run report to this file
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Override the configured target (simulated, webdriver)
    #[arg(short, long, value_parser = parse_target)]
    pub target: Option<TargetKind>,

    /// Reload the page before every scenario
    #[arg(long)]
    pub reload_each_scenario: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    #[serde(flatten)]
    pub report: RunReport,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let summary = &self.report.summary;
        let mut lines = vec![TableFormatter::new().format_outcomes(self.report.outcomes())];

        for outcome in self.report.outcomes() {
            if let (Verdict::Fail | Verdict::Error, Some(detail)) = (outcome.verdict, &outcome.detail) {
                if !outcome.is_cancelled() {
                    lines.push(format!("  {}: {detail}", style(&outcome.scenario_id).bold()));
                }
            }
        }

        lines.push(format!(
            "\n{} passed, {} failed, {} errored, {} cancelled of {} ({:.1}% pass rate)",
            style(summary.passed).green(),
            style(summary.failed).red(),
            style(summary.errored).yellow(),
            style(summary.cancelled).dim(),
            summary.total,
            summary.pass_rate * 100.0,
        ));
        lines.push(format!("Run {}", self.report.run_id));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Load the catalog named on the command line, or the builtin suite.
pub fn load_catalog(path: Option<&Path>, config: &Config) -> Result<ScenarioCatalog> {
    match path {
        Some(path) => ScenarioCatalog::load(path, &config.timing)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => ScenarioCatalog::builtin(&config.timing).context("Builtin catalog is invalid"),
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref(), config)?
        .filter(args.category, args.filter.as_deref());
    if catalog.is_empty() {
        anyhow::bail!("No scenarios match the selection");
    }

    let mut target = config.target.clone();
    if let Some(kind) = args.target {
        target.kind = kind;
    }
    let mut options = RunnerOptions::from(&config.runner);
    options.reload_each_scenario |= args.reload_each_scenario;

    let (abort, signal) = AbortSignal::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            abort.abort();
        }
    });

    let discovery = discovery_for(&target, signal.clone()).context("Failed to create surface adapter")?;
    info!(target = ?target.kind, scenarios = catalog.len(), "running catalog");

    let (tx, rx) = mpsc::unbounded_channel();
    let runner = ScenarioRunner::new(discovery, EventualStatePoller::new(signal), options).with_events(tx);

    let progress = (!json_mode).then(|| {
        let bar = create_progress_bar(catalog.len() as u64);
        bar.set_message("locating surfaces");
        tokio::spawn(track_progress(rx, bar))
    });

    let result = runner.run(&catalog).await;
    // Dropping the runner closes the event channel and ends the tracker.
    drop(runner);
    if let Some(progress) = progress {
        let _ = progress.await;
    }
    let report = result.context("Run could not start")?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    let summary = report.summary;
    output(&RunOutput { report }, json_mode);

    if summary.cancelled > 0 {
        anyhow::bail!("Run cancelled after {} of {} scenarios", summary.total - summary.cancelled, summary.total);
    }
    if !summary.is_clean() {
        anyhow::bail!(
            "{} scenario(s) failed and {} errored",
            summary.failed,
            summary.errored
        );
    }
    Ok(())
}

async fn track_progress(mut rx: mpsc::UnboundedReceiver<RunEvent>, bar: ProgressBar) {
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Started { total } => bar.set_length(total as u64),
            RunEvent::ScenarioStarted { id, .. } => bar.set_message(id),
            RunEvent::ScenarioFinished(outcome) => {
                if outcome.verdict != Verdict::Pass && !outcome.is_cancelled() {
                    bar.println(format!(
                        "{} {} {}",
                        style(outcome.verdict).red().bold(),
                        outcome.scenario_id,
                        outcome.fault.map(|f| f.to_string()).unwrap_or_default()
                    ));
                }
                bar.inc(1);
            }
            RunEvent::Finished => bar.finish_and_clear(),
        }
    }
    bar.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::parse_from([
            "translit-probe",
            "run",
            "--category",
            "ui",
            "--filter",
            "Pos_",
            "--target",
            "wd",
            "--json",
        ]);
        assert!(cli.json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.category, Some(Category::UiBehavior));
        assert_eq!(args.filter.as_deref(), Some("Pos_"));
        assert_eq!(args.target, Some(TargetKind::Webdriver));
        assert!(!args.reload_each_scenario);
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(Cli::try_parse_from(["translit-probe", "run", "--category", "smoke"]).is_err());
    }

    #[test]
    fn test_builtin_catalog_used_by_default() {
        let catalog = load_catalog(None, &Config::default()).unwrap();
        assert_eq!(catalog.len(), 35);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let args = RunArgs {
            catalog: None,
            category: None,
            filter: Some("Pos_Fun_000".to_string()),
            report: Some(path.clone()),
            target: Some(TargetKind::Simulated),
            reload_each_scenario: false,
        };

        execute(args, &Config::default(), true).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total"], 9);
        assert_eq!(written["summary"]["passed"], 9);
        assert_eq!(written["outcomes"][0]["scenario_id"], "Pos_Fun_0001");
    }
}
