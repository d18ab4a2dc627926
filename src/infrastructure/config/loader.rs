use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::{Category, Config, TimingError};

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".translit-probe";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "TRANSLIT_PROBE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid retention_days: {0}. Must be at least 1")]
    InvalidRetention(u32),

    #[error("Invalid {category} timing profile: {source}")]
    InvalidTiming {
        category: Category,
        #[source]
        source: TimingError,
    },

    #[error("Invalid discovery_timeout_ms: 0. Must be positive")]
    ZeroDiscoveryTimeout,

    #[error("WebDriver {0} cannot be empty")]
    EmptyWebDriverField(&'static str),

    #[error("Invalid WebDriver endpoint: {0}. Must be an http(s) URL")]
    InvalidEndpoint(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .translit-probe/config.yaml (project config)
    /// 3. .translit-probe/local.yaml (local overrides, optional)
    /// 4. Environment variables (TRANSLIT_PROBE_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.logging.log_dir.is_some() && config.logging.retention_days == 0 {
            return Err(ConfigError::InvalidRetention(config.logging.retention_days));
        }

        for category in [Category::Positive, Category::Negative, Category::UiBehavior] {
            config
                .timing
                .for_category(category)
                .validate()
                .map_err(|source| ConfigError::InvalidTiming { category, source })?;
        }

        if config.runner.discovery_timeout_ms == 0 {
            return Err(ConfigError::ZeroDiscoveryTimeout);
        }

        let webdriver = &config.target.webdriver;
        for (field, value) in [
            ("endpoint", &webdriver.endpoint),
            ("url", &webdriver.url),
            ("selector", &webdriver.selector),
            ("browser", &webdriver.browser),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyWebDriverField(field));
            }
        }
        if !webdriver.endpoint.starts_with("http://") && !webdriver.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint(webdriver.endpoint.clone()));
        }

        Ok(())
    }
}
