//! Integration tests for the parkview command line.

use clap::Parser;
use parkview_cli::{run, Cli};
use parkview_config::Config;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{
    "rides": [
        {"rideId": 1, "rideName": "Thunder Run"},
        {"rideId": 2, "rideName": "Lazy River"}
    ],
    "visits": [
        {"rideId": 1, "date": "2024-01-01T00:00:00", "ageGroup1_0_to_18": 2, "ageGroup2_19_to_30": 3, "ageGroup3_31_to_50": 1, "ageGroup4_over50": 0, "count": 6},
        {"rideId": 1, "date": "2024-01-02T00:00:00", "ageGroup1_0_to_18": 1, "ageGroup2_19_to_30": 1, "ageGroup3_31_to_50": 1, "ageGroup4_over50": 1, "count": 4},
        {"rideId": 1, "date": "2024-01-03T00:00:00", "ageGroup1_0_to_18": 0, "ageGroup2_19_to_30": 0, "ageGroup3_31_to_50": 0, "ageGroup4_over50": 5, "count": 5},
        {"rideId": 2, "date": "2024-01-03T00:00:00", "ageGroup1_0_to_18": 2, "ageGroup2_19_to_30": 0, "ageGroup3_31_to_50": 0, "ageGroup4_over50": 0, "count": 2}
    ]
}"#;

fn fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(SNAPSHOT.as_bytes()).expect("Failed to write fixture");
    file
}

async fn run_args(args: &[&str]) -> anyhow::Result<serde_json::Value> {
    let cli = Cli::try_parse_from(args)?;
    run(&cli, &Config::default()).await
}

#[tokio::test]
async fn test_rides_command() {
    let file = fixture();
    let path = file.path().to_str().unwrap();

    let output = run_args(&["parkview", "--fixture", path, "rides"]).await.unwrap();
    assert_eq!(
        output,
        serde_json::json!([
            {"value": "1", "label": "Thunder Run"},
            {"value": "2", "label": "Lazy River"}
        ])
    );
}

#[tokio::test]
async fn test_timeline_command() {
    let file = fixture();
    let path = file.path().to_str().unwrap();

    let output = run_args(&[
        "parkview", "--fixture", path, "--today", "2024-01-10", "timeline", "--ride", "1", "--start",
        "2024-01-01", "--end", "2024-01-03",
    ])
    .await
    .unwrap();

    assert_eq!(output["ride"]["rideName"], "Thunder Run");
    let points = output["points"].as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["band1Plus2"], 5);
    assert_eq!(points[1]["band1Plus2Plus3"], 3);
    assert_eq!(points[2]["allBands"], 5);
}

#[tokio::test]
async fn test_timeline_chart_uses_default_range() {
    let file = fixture();
    let path = file.path().to_str().unwrap();

    // Default range is the seven days before "today"
    let output = run_args(&[
        "parkview", "--fixture", path, "--today", "2024-01-08", "timeline", "--ride", "1", "--chart",
    ])
    .await
    .unwrap();

    assert_eq!(output["range"]["start"], "2024-01-01");
    assert_eq!(output["chart"]["labels"], serde_json::json!(["01-01", "01-02", "01-03"]));
    assert_eq!(output["chart"]["datasets"][3]["label"], "All Age Groups");
}

#[tokio::test]
async fn test_summary_chart_command() {
    let file = fixture();
    let path = file.path().to_str().unwrap();

    let output = run_args(&[
        "parkview", "--fixture", path, "--today", "2024-01-10", "summary", "--start", "2024-01-01",
        "--end", "2024-01-03", "--chart",
    ])
    .await
    .unwrap();

    assert!(output.get("ride").is_none());
    assert_eq!(output["chart"]["labels"], serde_json::json!(["Thunder Run", "Lazy River"]));
    assert_eq!(output["chart"]["datasets"][0]["data"], serde_json::json!([5.0, 2.0]));
    assert_eq!(output["chart"]["datasets"][1]["data"], serde_json::json!([6.0, 2.0]));
}

#[tokio::test]
async fn test_errors_surface() {
    let file = fixture();
    let path = file.path().to_str().unwrap();

    let unknown = run_args(&["parkview", "--fixture", path, "timeline", "--ride", "99"]).await;
    assert!(unknown.unwrap_err().to_string().contains("no such ride: 99"));

    let inverted = run_args(&[
        "parkview", "--fixture", path, "--today", "2024-01-10", "summary", "--start", "2024-01-05",
        "--end", "2024-01-01",
    ])
    .await;
    assert!(inverted.unwrap_err().to_string().contains("start after end"));

    let missing = run_args(&["parkview", "--fixture", "/nonexistent/park.json", "rides"]).await;
    assert!(missing.is_err());
}

#[test]
fn test_binary_prints_json() {
    let file = fixture();

    let output = Command::new(env!("CARGO_BIN_EXE_parkview"))
        .args(["--fixture", file.path().to_str().unwrap(), "--log-level", "error", "rides"])
        .env_remove("PARKVIEW_CONFIG_PATH")
        .env_remove("PARKVIEW_LOG_LEVEL")
        .env_remove("PARKVIEW_LOOKBACK_DAYS")
        .env_remove("PARKVIEW_FETCH_TIMEOUT")
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout[1]["label"], "Lazy River");
}

#[test]
fn test_binary_reports_failure() {
    let file = fixture();

    let output = Command::new(env!("CARGO_BIN_EXE_parkview"))
        .args(["--fixture", file.path().to_str().unwrap(), "timeline", "--ride", "nope"])
        .env_remove("PARKVIEW_CONFIG_PATH")
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
