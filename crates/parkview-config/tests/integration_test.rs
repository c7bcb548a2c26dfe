//! Integration tests for parkview-config crate.

use parkview_common::ParkError;
use parkview_config::{Config, ConfigLoader, LogFormat};
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r##"
store:
  url: "https://backoffice.park.example"
  timeout_seconds: 15
  max_retries: 4
  rate_limit_per_sec: 20
  max_idle_per_host: 4
  exclusive_start_bound: false
reports:
  lookback_days: 90
  fetch_timeout_seconds: 5
  default_range_days: 14
charts:
  band_0_18_color: "#E7F069"
  band_0_30_color: "#BF69F0"
  band_0_50_color: "#4BC0C0"
  all_ages_color: "#FF6384"
  average_color: "#E7F069"
  max_color: "#BF69F0"
  date_label_format: "%d/%m"
logging:
  level: "info,parkview_reports=debug"
  format: pretty
  include_spans: true
"##;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_default_config_validation() {
    let config = Config::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_full_file_round_trip_into_runtime_settings() {
    let file = write_config(FULL_CONFIG);
    let config = ConfigLoader::load_config_with(file.path(), |_| None).expect("config loads");

    let api = config.store.to_api_config();
    assert_eq!(api.base_url, "https://backoffice.park.example");
    assert_eq!(api.max_retries, 4);
    assert!(!api.exclusive_start_bound);

    assert_eq!(config.reports.default_range_days, 14);
    assert_eq!(config.charts.date_label_format, "%d/%m");

    assert_eq!(config.logging.format, LogFormat::Pretty);
    let logging = config.logging.to_logging_config();
    assert!(logging.pretty_format);
    assert!(logging.include_spans);
    assert_eq!(logging.level, "info,parkview_reports=debug");
}

#[test]
fn test_explicit_path_wins_in_load() {
    let file = write_config("reports:\n  lookback_days: 45\n  default_range_days: 3\n");
    let config = ConfigLoader::load(Some(file.path())).expect("config loads");
    assert_eq!(config.reports.lookback_days, 45);
    assert_eq!(config.reports.default_range_days, 3);
}

#[test]
fn test_bad_color_surfaces_as_config_error() {
    let file = write_config("charts:\n  max_color: \"rgba(191,105,240,1)\"\n");
    let err: ParkError = ConfigLoader::load_config_with(file.path(), |_| None)
        .unwrap_err()
        .into();
    assert!(matches!(err, ParkError::Config { .. }));
}
