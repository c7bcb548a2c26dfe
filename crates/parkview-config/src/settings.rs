//! Application configuration structures

use parkview_common::{LoggingConfig, ParkApiConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError, ValidationErrors};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Visit store backend
    pub store: StoreConfig,

    /// Report query limits
    pub reports: ReportsConfig,

    /// Chart dataset styling
    pub charts: ChartConfig,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Visit store backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the park backend
    #[validate(url(message = "Store URL must be a valid URL"))]
    pub url: String,

    /// HTTP request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum number of transport retries for failed requests
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Client side rate limit in requests per second
    #[validate(range(min = 1, max = 1000, message = "Rate limit must be between 1 and 1000"))]
    pub rate_limit_per_sec: u32,

    /// Idle pooled connections kept per host
    pub max_idle_per_host: usize,

    /// Whether the backend filters the lower date bound exclusively
    pub exclusive_start_bound: bool,
}

/// Report query configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReportsConfig {
    /// How many days back from today a report range may reach
    #[validate(range(min = 1, max = 3650, message = "Lookback must be between 1 and 3650 days"))]
    pub lookback_days: u32,

    /// Upper bound for a single store fetch, in seconds
    #[validate(range(min = 1, max = 300, message = "Fetch timeout must be between 1 and 300 seconds"))]
    pub fetch_timeout_seconds: u64,

    /// Length of the range used when the caller gives no dates
    #[validate(range(min = 1, max = 3650, message = "Default range must be between 1 and 3650 days"))]
    pub default_range_days: u32,
}

/// Chart dataset styling
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartConfig {
    /// Color of the 0-18 dataset
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub band_0_18_color: String,

    /// Color of the 0-30 dataset
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub band_0_30_color: String,

    /// Color of the 0-50 dataset
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub band_0_50_color: String,

    /// Color of the all-ages envelope
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub all_ages_color: String,

    /// Color of the per-ride average bars
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub average_color: String,

    /// Color of the per-ride maximum bars
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Colors must be #RRGGBB"))]
    pub max_color: String,

    /// strftime pattern for timeline labels
    #[validate(custom(function = "crate::validation::validate_date_format", message = "Invalid date label format"))]
    pub date_label_format: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    Compact,
    /// Multi-line human readable output
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level or filter directives (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Invalid log file path"))]
    pub file: Option<String>,

    /// Output format
    pub format: LogFormat,

    /// Whether to log span open/close events
    pub include_spans: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_per_sec: 10,
            max_idle_per_host: 10,
            exclusive_start_bound: true,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            fetch_timeout_seconds: 5,
            default_range_days: 7,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            band_0_18_color: "#E7F069".to_string(),
            band_0_30_color: "#BF69F0".to_string(),
            band_0_50_color: "#4BC0C0".to_string(),
            all_ages_color: "#FF6384".to_string(),
            average_color: "#E7F069".to_string(),
            max_color: "#BF69F0".to_string(),
            date_label_format: "%m-%d".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: LogFormat::Compact,
            include_spans: false,
        }
    }
}

impl Config {
    /// Validate every section plus the rules that span fields
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.store.validate()?;
        self.reports.validate()?;
        self.charts.validate()?;
        self.logging.validate()?;
        self.reports.validate_window()
    }
}

impl ReportsConfig {
    /// The default range has to fit inside the lookback window
    fn validate_window(&self) -> Result<(), ValidationErrors> {
        if self.default_range_days > self.lookback_days {
            let mut errors = ValidationErrors::new();
            let mut error = ValidationError::new("default_range_exceeds_lookback");
            error.message = Some("Default range cannot be longer than the lookback window".into());
            errors.add("default_range_days", error);
            return Err(errors);
        }
        Ok(())
    }

    /// Per-fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl StoreConfig {
    /// Client settings for [`parkview_common::ParkApiClient`]
    pub fn to_api_config(&self) -> ParkApiConfig {
        ParkApiConfig::new(self.url.clone())
            .with_timeout(self.timeout_seconds)
            .with_pool_size(self.max_idle_per_host)
            .with_rate_limit(self.rate_limit_per_sec)
            .with_max_retries(self.max_retries as usize)
            .with_exclusive_start_bound(self.exclusive_start_bound)
    }
}

impl LoggingSettings {
    /// Subscriber settings for [`parkview_common::init_logging`]
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            pretty_format: self.format == LogFormat::Pretty,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            ..LoggingConfig::default()
        }
    }
}
