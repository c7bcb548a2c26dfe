//! Configuration loading utilities

use crate::Config;
use parkview_common::{ParkError, Result as ParkResult};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "PARKVIEW_CONFIG_PATH";

/// File names searched for in the working directory, in order
const DEFAULT_FILES: [&str; 2] = ["parkview.yaml", "parkview.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParse {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for ParkError {
    fn from(err: ConfigError) -> Self {
        ParkError::config_with_source("failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with(path, |name| env::var(name).ok())
    }

    /// Load a YAML file, resolving overrides through `lookup` instead of the process environment
    pub fn load_config_with<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        debug!(path = %path.as_ref().display(), "Reading configuration file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::parse_with(&content, lookup)?;
        info!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse YAML text, apply overrides and validate
    pub fn parse_with<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty document deserializes to unit, not to a defaulted struct
        let mut config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };

        Self::apply_overrides_from(&mut config, lookup)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from the first source that exists.
    ///
    /// Search order: `explicit`, then `PARKVIEW_CONFIG_PATH`, then
    /// `parkview.yaml` / `parkview.yml` in the working directory. Without any
    /// file the defaults are used. Environment overrides apply in every case.
    pub fn load(explicit: Option<&Path>) -> ParkResult<Config> {
        let config = match Self::locate(explicit, |name| env::var(name).ok()) {
            Some(path) => Self::load_config(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                Self::parse_with("", |name| env::var(name).ok())?
            }
        };
        Ok(config)
    }

    /// Resolve which configuration file `load` would read
    pub fn locate<F>(explicit: Option<&Path>, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = lookup(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |name| env::var(name).ok())
    }

    /// Apply overrides resolved through `lookup`
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store configuration overrides
        if let Some(url) = lookup("PARKVIEW_STORE_URL") {
            config.store.url = url;
        }

        if let Some(timeout) = lookup("PARKVIEW_STORE_TIMEOUT") {
            config.store.timeout_seconds = parse_var("PARKVIEW_STORE_TIMEOUT", &timeout)?;
        }

        if let Some(retries) = lookup("PARKVIEW_STORE_MAX_RETRIES") {
            config.store.max_retries = parse_var("PARKVIEW_STORE_MAX_RETRIES", &retries)?;
        }

        // Report configuration overrides
        if let Some(days) = lookup("PARKVIEW_LOOKBACK_DAYS") {
            config.reports.lookback_days = parse_var("PARKVIEW_LOOKBACK_DAYS", &days)?;
        }

        if let Some(timeout) = lookup("PARKVIEW_FETCH_TIMEOUT") {
            config.reports.fetch_timeout_seconds = parse_var("PARKVIEW_FETCH_TIMEOUT", &timeout)?;
        }

        // Logging configuration overrides
        if let Some(level) = lookup("PARKVIEW_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().map_err(|e| ConfigError::EnvParse {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a temporary YAML config file for testing
    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_valid_yaml_config() {
        let yaml = "store:\n  url: \"https://park.example.com\"\n  timeout_seconds: 20\n  max_retries: 2\nreports:\n  lookback_days: 60\n  fetch_timeout_seconds: 3\ncharts:\n  all_ages_color: \"#112233\"\nlogging:\n  level: \"debug\"\n  format: json\n";

        let temp_file = create_test_config_file(yaml);
        let config = ConfigLoader::load_config_with(temp_file.path(), no_env).expect("Failed to load config");

        assert_eq!(config.store.url, "https://park.example.com");
        assert_eq!(config.store.timeout_seconds, 20);
        assert_eq!(config.store.max_retries, 2);
        assert_eq!(config.reports.lookback_days, 60);
        assert_eq!(config.reports.fetch_timeout_seconds, 3);
        assert_eq!(config.charts.all_ages_color, "#112233");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_minimal_config() {
        let temp_file = create_test_config_file("reports:\n  lookback_days: 30\n");
        let config = ConfigLoader::load_config_with(temp_file.path(), no_env).expect("Failed to load config");

        // Unspecified values fall back to defaults
        assert_eq!(config.reports.lookback_days, 30);
        assert_eq!(config.reports.fetch_timeout_seconds, 5);
        assert_eq!(config.store.url, "http://localhost:5000");
        assert_eq!(config.charts.band_0_18_color, "#E7F069");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::parse_with("", no_env).expect("defaults are valid");
        assert_eq!(config.reports.lookback_days, 90);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ConfigLoader::parse_with("store:\n  url: [unclosed", no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let result = ConfigLoader::parse_with("store:\n  url: \"not_a_url\"\n", no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ConfigLoader::load_config_with("/nonexistent/parkview.yaml", no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_environment_variable_overrides() {
        let lookup = env_of(&[
            ("PARKVIEW_STORE_URL", "https://env.park.example"),
            ("PARKVIEW_STORE_TIMEOUT", "45"),
            ("PARKVIEW_STORE_MAX_RETRIES", "0"),
            ("PARKVIEW_LOOKBACK_DAYS", "120"),
            ("PARKVIEW_FETCH_TIMEOUT", " 9 "),
            ("PARKVIEW_LOG_LEVEL", "warn"),
        ]);

        let config = ConfigLoader::parse_with("store:\n  url: \"https://file.park.example\"\n", lookup)
            .expect("Failed to load config");

        assert_eq!(config.store.url, "https://env.park.example");
        assert_eq!(config.store.timeout_seconds, 45);
        assert_eq!(config.store.max_retries, 0);
        assert_eq!(config.reports.lookback_days, 120);
        assert_eq!(config.reports.fetch_timeout_seconds, 9);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unparseable_override() {
        let lookup = env_of(&[("PARKVIEW_LOOKBACK_DAYS", "ninety")]);
        let err = ConfigLoader::parse_with("", lookup).unwrap_err();

        match err {
            ConfigError::EnvParse { var, .. } => assert_eq!(var, "PARKVIEW_LOOKBACK_DAYS"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_are_validated() {
        let lookup = env_of(&[("PARKVIEW_FETCH_TIMEOUT", "0")]);
        let result = ConfigLoader::parse_with("", lookup);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let lookup = env_of(&[(CONFIG_PATH_VAR, "/etc/parkview/from-env.yaml")]);

        let explicit = ConfigLoader::locate(Some(Path::new("/tmp/explicit.yaml")), &lookup);
        assert_eq!(explicit, Some(PathBuf::from("/tmp/explicit.yaml")));

        let from_env = ConfigLoader::locate(None, &lookup);
        assert_eq!(from_env, Some(PathBuf::from("/etc/parkview/from-env.yaml")));
    }

    #[test]
    fn test_config_error_converts_to_park_error() {
        let err: ParkError = ConfigLoader::parse_with("store:\n  url: \"nope\"\n", no_env)
            .unwrap_err()
            .into();
        assert!(matches!(err, ParkError::Config { .. }));
    }
}
