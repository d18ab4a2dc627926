//! `config` command: inspect and initialize configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::loader::CONFIG_DIR;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration after all overrides
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, short)]
        force: bool,

        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config)
            .unwrap_or_else(|e| format!("failed to render configuration: {e}"))
            .trim_end()
            .to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigInitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for ConfigInitOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => output(
            &ConfigShowOutput {
                config: config.clone(),
            },
            json_mode,
        ),
        ConfigCommands::Init { force, path } => {
            let out = init(&path, force).await?;
            output(&out, json_mode);
        }
    }
    Ok(())
}

async fn init(root: &std::path::Path, force: bool) -> Result<ConfigInitOutput> {
    let dir = root.join(CONFIG_DIR);
    let config_path = dir.join("config.yaml");

    if config_path.exists() && !force {
        return Ok(ConfigInitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite.",
                config_path.display()
            ),
            config_path,
        });
    }

    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default configuration")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(ConfigInitOutput {
        success: true,
        message: format!("Wrote default configuration to {}", config_path.display()),
        config_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[tokio::test]
    async fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let out = init(dir.path(), false).await.unwrap();
        assert!(out.success);

        let loaded = ConfigLoader::load_from_file(&out.config_path).unwrap();
        assert_eq!(loaded.runner.discovery_timeout_ms, Config::default().runner.discovery_timeout_ms);
        assert_eq!(loaded.timing, Config::default().timing);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), false).await.unwrap();

        let config_path = dir.path().join(CONFIG_DIR).join("config.yaml");
        std::fs::write(&config_path, "runner:\n  discovery_timeout_ms: 5000\n").unwrap();

        assert!(!init(dir.path(), false).await.unwrap().success);
        assert!(std::fs::read_to_string(&config_path).unwrap().contains("5000"));

        assert!(init(dir.path(), true).await.unwrap().success);
        assert!(!std::fs::read_to_string(&config_path).unwrap().contains("5000"));
    }

    #[test]
    fn test_show_renders_yaml() {
        let out = ConfigShowOutput {
            config: Config::default(),
        };
        let human = out.to_human();
        assert!(human.contains("discovery_timeout_ms: 60000"));
        assert_eq!(out.to_json()["target"]["kind"], "simulated");
    }
}
