//! Command line front end for parkview reports.
//!
//! Argument parsing and command execution live here so they can be tested
//! without spawning the binary; `main.rs` only wires up configuration and
//! logging.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use parkview_common::{parse_calendar_date, ParkApiClient, RideId};
use parkview_config::Config;
use parkview_reports::{
    comparison_chart, timeline_chart, DateRange, FixedClock, InMemoryVisitStore, ReportQuery, Ride,
    VisitRecordStore,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Visit analytics for the park back office
#[derive(Parser, Debug)]
#[command(name = "parkview", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Serve reports from a JSON snapshot instead of the backend
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Date treated as today for lookback checks (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List rides as `{value, label}` options
    Rides,

    /// Per-day stacked age-band timeline for one ride
    Timeline {
        /// Ride identifier
        #[arg(long)]
        ride: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Emit chart datasets instead of raw points
        #[arg(long)]
        chart: bool,
    },

    /// Average and maximum attendance across rides
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Emit chart datasets instead of raw series
        #[arg(long)]
        chart: bool,
    },
}

/// Optional report bounds; missing ones come from the default range
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day of the report (inclusive)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the report (inclusive)
    #[arg(long)]
    pub end: Option<String>,
}

impl RangeArgs {
    /// Fill unspecified bounds from `fallback`
    pub fn resolve(&self, fallback: DateRange) -> Result<DateRange> {
        let start = match &self.start {
            Some(raw) => parse_calendar_date(raw, "start")?,
            None => fallback.start,
        };
        let end = match &self.end {
            Some(raw) => parse_calendar_date(raw, "end")?,
            None => fallback.end,
        };
        Ok(DateRange::new(start, end))
    }
}

/// Build the query for the store selected on the command line
pub fn build_query(cli: &Cli, config: &Config) -> Result<ReportQuery> {
    let store: Arc<dyn VisitRecordStore> = match &cli.fixture {
        Some(path) => {
            info!(path = %path.display(), "Using snapshot store");
            Arc::new(
                InMemoryVisitStore::from_file(path)
                    .with_context(|| format!("failed to load fixture {}", path.display()))?,
            )
        }
        None => {
            let client = ParkApiClient::new(config.store.to_api_config())?;
            info!(url = %config.store.url, "Using park backend");
            debug!(metrics = ?client.get_client_metrics(), "HTTP client ready");
            Arc::new(client)
        }
    };

    let mut query = ReportQuery::from_config(store, &config.reports);
    if let Some(raw) = &cli.today {
        query = query.with_clock(Arc::new(FixedClock(parse_calendar_date(raw, "today")?)));
    }
    Ok(query)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Framed<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ride: Option<&'a Ride>,
    range: DateRange,
    chart: T,
}

/// Execute the parsed command and return its JSON output
pub async fn run(cli: &Cli, config: &Config) -> Result<Value> {
    let query = build_query(cli, config)?;
    debug!(?query, "Report query ready");

    let output = match &cli.command {
        Command::Rides => serde_json::to_value(query.list_rides().await?)?,

        Command::Timeline { ride, range, chart } => {
            let range = range.resolve(query.default_range())?;
            let report = query.build_ride_report(&RideId::new(ride.as_str()), &range).await?;
            if *chart {
                serde_json::to_value(Framed {
                    ride: Some(&report.ride),
                    range,
                    chart: timeline_chart(&report.points, &config.charts),
                })?
            } else {
                serde_json::to_value(&report)?
            }
        }

        Command::Summary { range, chart } => {
            let range = range.resolve(query.default_range())?;
            let series = query.build_cross_ride_summary(&range).await?;
            if *chart {
                serde_json::to_value(Framed {
                    ride: None,
                    range,
                    chart: comparison_chart(&series, &config.charts),
                })?
            } else {
                serde_json::to_value(&series)?
            }
        }
    };

    Ok(output)
}
