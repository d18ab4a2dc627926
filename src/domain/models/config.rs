use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::scenario::Category;
use super::timing::TimingProfile;

/// Main configuration structure for translit-probe
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,

    /// Widget under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Scenario runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Default timing profiles per scenario category
    #[serde(default)]
    pub timing: TimingDefaults,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for log files (None logs to the terminal only)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Mirror logs to stderr when writing to files
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
            retention_days: default_retention_days(),
        }
    }
}

/// Which surface adapter drives the widget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// In-process debounced widget
    #[default]
    Simulated,
    /// Real page driven through a W3C WebDriver endpoint
    Webdriver,
}

impl TargetKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simulated" | "sim" => Some(Self::Simulated),
            "webdriver" | "wd" => Some(Self::Webdriver),
            _ => None,
        }
    }
}

/// Target configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct TargetConfig {
    #[serde(default)]
    pub kind: TargetKind,

    #[serde(default)]
    pub webdriver: WebDriverConfig,

    #[serde(default)]
    pub simulated: SimulatedConfig,
}

/// WebDriver target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebDriverConfig {
    /// WebDriver server base URL (chromedriver, geckodriver, selenium)
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,

    /// Page hosting the widget
    #[serde(default = "default_target_url")]
    pub url: String,

    /// CSS selector matching the text surfaces; input is the first match,
    /// output the second
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Browser name requested in the session capabilities
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Page load timeout in milliseconds
    #[serde(default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,

    /// HTTP request timeout for a single WebDriver command
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:4444".to_string()
}

fn default_target_url() -> String {
    "https://tamil.changathi.com/".to_string()
}

fn default_selector() -> String {
    "textarea".to_string()
}

fn default_browser() -> String {
    "chrome".to_string()
}

const fn default_page_load_timeout_ms() -> u64 {
    60_000
}

const fn default_command_timeout_ms() -> u64 {
    30_000
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            url: default_target_url(),
            selector: default_selector(),
            browser: default_browser(),
            headless: true,
            page_load_timeout_ms: default_page_load_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

/// Simulated widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulatedConfig {
    /// Quiet period after the last keystroke before a transformation starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Time the transformation takes once started
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Publish a partial result halfway through the latency
    #[serde(default)]
    pub streaming: bool,
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_latency_ms() -> u64 {
    250
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            latency_ms: default_latency_ms(),
            streaming: false,
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Bound for locating the input and output surfaces
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,

    /// Rediscover surfaces before every scenario instead of only after faults
    #[serde(default)]
    pub reload_each_scenario: bool,
}

const fn default_discovery_timeout_ms() -> u64 {
    60_000
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_ms: default_discovery_timeout_ms(),
            reload_each_scenario: false,
        }
    }
}

/// Default timing profile for each category, used when a catalog record
/// omits its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimingDefaults {
    #[serde(default = "positive_timing")]
    pub positive: TimingProfile,

    #[serde(default = "negative_timing")]
    pub negative: TimingProfile,

    #[serde(default = "ui_timing")]
    pub ui_behavior: TimingProfile,
}

const fn positive_timing() -> TimingProfile {
    TimingProfile::for_category(Category::Positive)
}

const fn negative_timing() -> TimingProfile {
    TimingProfile::for_category(Category::Negative)
}

const fn ui_timing() -> TimingProfile {
    TimingProfile::for_category(Category::UiBehavior)
}

impl TimingDefaults {
    pub const fn for_category(&self, category: Category) -> TimingProfile {
        match category {
            Category::Positive => self.positive,
            Category::Negative => self.negative,
            Category::UiBehavior => self.ui_behavior,
        }
    }
}

impl Default for TimingDefaults {
    fn default() -> Self {
        Self {
            positive: positive_timing(),
            negative: negative_timing(),
            ui_behavior: ui_timing(),
        }
    }
}
