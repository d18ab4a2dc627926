//! `catalog` command: list, validate and export scenario catalogs.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::commands::run::load_catalog;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::types::parse_category;
use crate::domain::models::{Category, Config, Scenario};
use crate::services::ScenarioCatalog;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List scenarios
    List {
        /// YAML catalog to list instead of the builtin suite
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only list scenarios of this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Load and validate a YAML catalog file
    Validate {
        /// Catalog file
        file: PathBuf,
    },
    /// Write the builtin catalog as YAML
    Export {
        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
pub struct CatalogListOutput {
    pub scenarios: Vec<Scenario>,
    pub total: usize,
}

impl CommandOutput for CatalogListOutput {
    fn to_human(&self) -> String {
        if self.scenarios.is_empty() {
            return "No scenarios found.".to_string();
        }
        format!(
            "{}\n\nShowing {} scenario(s)",
            TableFormatter::new().format_scenarios(&self.scenarios),
            self.total
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogValidateOutput {
    pub file: PathBuf,
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl CommandOutput for CatalogValidateOutput {
    fn to_human(&self) -> String {
        let counts: Vec<String> = self
            .by_category
            .iter()
            .map(|(category, n)| format!("{n} {category}"))
            .collect();
        format!(
            "{} is valid: {} scenario(s) ({})",
            self.file.display(),
            self.total,
            counts.join(", ")
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogExportOutput {
    pub output: Option<PathBuf>,
    pub total: usize,
    #[serde(skip)]
    pub yaml: String,
}

impl CommandOutput for CatalogExportOutput {
    fn to_human(&self) -> String {
        match &self.output {
            Some(path) => format!("Exported {} scenario(s) to {}", self.total, path.display()),
            None => self.yaml.trim_end().to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if self.output.is_none() {
            value["yaml"] = serde_json::Value::String(self.yaml.clone());
        }
        value
    }
}

fn count_by_category(catalog: &ScenarioCatalog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for scenario in catalog {
        *counts.entry(scenario.category.to_string()).or_insert(0) += 1;
    }
    counts
}

pub async fn execute(args: CatalogArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        CatalogCommands::List { catalog, category } => {
            let catalog = load_catalog(catalog.as_deref(), config)?.filter(category, None);
            let out = CatalogListOutput {
                total: catalog.len(),
                scenarios: catalog.scenarios().to_vec(),
            };
            output(&out, json_mode);
        }
        CatalogCommands::Validate { file } => {
            let catalog = ScenarioCatalog::load(&file, &config.timing)
                .with_context(|| format!("{} is not a valid catalog", file.display()))?;
            let out = CatalogValidateOutput {
                total: catalog.len(),
                by_category: count_by_category(&catalog),
                file,
            };
            output(&out, json_mode);
        }
        CatalogCommands::Export { output: path } => {
            let catalog = ScenarioCatalog::builtin(&config.timing).context("Builtin catalog is invalid")?;
            let yaml = catalog.to_yaml().context("Failed to serialize catalog")?;
            if let Some(path) = &path {
                tokio::fs::write(path, &yaml)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            let out = CatalogExportOutput {
                output: path,
                total: catalog.len(),
                yaml,
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
