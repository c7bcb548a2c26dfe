//! Test utilities and shared test helpers for parkview.
//!
//! Available to other crates through the `testing` feature.

use crate::park_api::{DetailedVisitDto, RideDto, SummaryVisitDto};
use chrono::NaiveDate;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Calendar date fixture.
pub fn mock_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Wire fixtures shaped like the park backend's JSON answers.
pub mod wire_fixtures {
    use super::*;

    /// A ride as returned by the ride endpoints.
    pub fn ride(ride_id: &str, ride_name: &str) -> RideDto {
        RideDto {
            ride_id: ride_id.to_string(),
            ride_name: ride_name.to_string(),
        }
    }

    /// A detailed visit row whose total is the sum of the four bands.
    pub fn detailed_visit(ride_id: &str, date: &str, bands: [i64; 4]) -> DetailedVisitDto {
        DetailedVisitDto {
            ride_id: ride_id.to_string(),
            date: date.to_string(),
            age_group1: bands[0],
            age_group2: bands[1],
            age_group3: bands[2],
            age_group4: bands[3],
            total_count: bands.iter().sum(),
        }
    }

    /// A per-ride summary row.
    pub fn summary_visit(ride_id: &str, name: &str, average: f64, max_count: i64, total: i64) -> SummaryVisitDto {
        SummaryVisitDto {
            ride_id: Some(ride_id.to_string()),
            name: name.to_string(),
            average,
            max_count,
            total_count: total,
        }
    }
}
