//! Cross-ride comparison of pre-aggregated attendance

use crate::model::{ComparisonSeries, RideSummaryRow};
use crate::traits::SeriesBuilder;
use parkview_common::{ParkError, Result};
use tracing::{debug, instrument};

/// Projects summary rows onto a comparison series.
///
/// Averages and maxima are taken from the store as-is after validation;
/// the total is not part of the comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossRideSummaryBuilder;

impl CrossRideSummaryBuilder {
    pub fn new() -> Self {
        Self
    }

    fn check(row: &RideSummaryRow) -> Result<()> {
        if !row.average_count.is_finite() {
            return Err(ParkError::validation_field(
                format!("average for {} is not a number", row.ride_name),
                "average",
            ));
        }
        if row.average_count < 0.0 || row.max_count < 0 || row.total_count < 0 {
            return Err(ParkError::validation_field(
                format!("negative aggregate for {}", row.ride_name),
                "count",
            ));
        }
        if (row.max_count as f64) < row.average_count {
            return Err(ParkError::validation_field(
                format!(
                    "max count {} below average {} for {}",
                    row.max_count, row.average_count, row.ride_name
                ),
                "maxCount",
            ));
        }
        Ok(())
    }
}

impl SeriesBuilder for CrossRideSummaryBuilder {
    type Input = RideSummaryRow;
    type Output = ComparisonSeries;

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    fn build(&self, rows: &[RideSummaryRow]) -> Result<ComparisonSeries> {
        for row in rows {
            Self::check(row)?;
        }

        let mut series = ComparisonSeries::with_capacity(rows.len());
        for row in rows {
            series.push(row.ride_name.clone(), row.average_count, row.max_count);
        }

        debug!("Built comparison series for {} rides", series.len());
        Ok(series)
    }

    fn name(&self) -> &'static str {
        "cross_ride_summary"
    }
}
