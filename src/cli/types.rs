//! CLI type definitions
//!
//! Top-level clap structures; each subcommand's arguments live next to its
//! implementation in `commands`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{catalog::CatalogArgs, config::ConfigArgs, run::RunArgs};
use crate::domain::models::{Category, TargetKind};

#[derive(Parser, Debug)]
#[command(name = "translit-probe")]
#[command(about = "Black-box verification harness for live transliteration widgets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .translit-probe/config.yaml)
    #[arg(short, long, global = true, env = "TRANSLIT_PROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute scenarios against the widget and report outcomes
    Run(RunArgs),

    /// Inspect, validate and export scenario catalogs
    Catalog(CatalogArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Parse a scenario category name
pub fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_str(s)
        .ok_or_else(|| format!("unknown category '{s}' (expected positive, negative or ui_behavior)"))
}

/// Parse a target adapter name
pub fn parse_target(s: &str) -> Result<TargetKind, String> {
    TargetKind::from_str(s)
        .ok_or_else(|| format!("unknown target '{s}' (expected simulated or webdriver)"))
}
