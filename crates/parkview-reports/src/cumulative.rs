//! Per-day stacked age-band series for a single ride

use crate::model::{CumulativeSeriesPoint, VisitRecord};
use crate::traits::SeriesBuilder;
use parkview_common::{ParkError, Result};
use tracing::{debug, instrument};

/// Turns visit records into one stacked point per record.
///
/// Each point stacks the bands of its own day only; nothing accumulates
/// across days. Input order is preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct CumulativeSeriesBuilder;

impl CumulativeSeriesBuilder {
    pub fn new() -> Self {
        Self
    }

    fn check(record: &VisitRecord) -> Result<()> {
        if record.bands().iter().any(|n| *n < 0) || record.total_count < 0 {
            return Err(ParkError::validation_field(
                format!("negative count for ride {} on {}", record.ride_id, record.date),
                "count",
            ));
        }

        match record.band_sum() {
            Some(sum) if sum == record.total_count => Ok(()),
            Some(sum) => Err(ParkError::validation_field(
                format!(
                    "total count {} does not match band sum {} for ride {} on {}",
                    record.total_count, sum, record.ride_id, record.date
                ),
                "count",
            )),
            None => Err(ParkError::validation_field(
                format!("band counts overflow for ride {} on {}", record.ride_id, record.date),
                "count",
            )),
        }
    }

    /// Stack one record. The record must already have passed [`Self::check`].
    fn point(record: &VisitRecord) -> CumulativeSeriesPoint {
        let [g1, g2, g3, _] = record.bands().map(|n| n.unsigned_abs());
        let band1 = g1;
        let band1_plus2 = band1 + g2;
        let band1_plus2_plus3 = band1_plus2 + g3;

        CumulativeSeriesPoint {
            date: record.date,
            band1,
            band1_plus2,
            band1_plus2_plus3,
            all_bands: record.total_count.unsigned_abs(),
        }
    }
}

impl SeriesBuilder for CumulativeSeriesBuilder {
    type Input = VisitRecord;
    type Output = Vec<CumulativeSeriesPoint>;

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    fn build(&self, rows: &[VisitRecord]) -> Result<Vec<CumulativeSeriesPoint>> {
        for record in rows {
            Self::check(record)?;
        }

        let points: Vec<_> = rows.iter().map(Self::point).collect();
        debug!("Built {} stacked timeline points", points.len());
        Ok(points)
    }

    fn name(&self) -> &'static str {
        "cumulative_series"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_common::test_utils::mock_date;
    use proptest::prelude::*;

    fn record(day: u32, bands: [i64; 4]) -> VisitRecord {
        VisitRecord::from_bands("R1", mock_date(2024, 1, day), bands)
    }

    #[test]
    fn test_three_day_breakdown() {
        let rows = vec![
            record(1, [2, 3, 1, 0]),
            record(2, [1, 1, 1, 1]),
            record(3, [0, 0, 0, 5]),
        ];

        let points = CumulativeSeriesBuilder::new().build(&rows).unwrap();
        let stacked: Vec<_> = points
            .iter()
            .map(|p| (p.band1, p.band1_plus2, p.band1_plus2_plus3, p.all_bands))
            .collect();

        assert_eq!(stacked, vec![(2, 5, 6, 6), (1, 2, 3, 4), (0, 0, 0, 5)]);
        assert_eq!(points[2].date, mock_date(2024, 1, 3));
    }

    #[test]
    fn test_empty_input() {
        let points = CumulativeSeriesBuilder::new().build(&[]).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_all_zero_record() {
        let points = CumulativeSeriesBuilder::new().build(&[record(4, [0, 0, 0, 0])]).unwrap();
        assert_eq!(
            points[0],
            CumulativeSeriesPoint {
                date: mock_date(2024, 1, 4),
                band1: 0,
                band1_plus2: 0,
                band1_plus2_plus3: 0,
                all_bands: 0,
            }
        );
    }

    #[test]
    fn test_order_is_not_changed() {
        let rows = vec![record(9, [1, 0, 0, 0]), record(2, [2, 0, 0, 0])];
        let points = CumulativeSeriesBuilder::new().build(&rows).unwrap();
        assert_eq!(points[0].date, mock_date(2024, 1, 9));
        assert_eq!(points[1].date, mock_date(2024, 1, 2));
    }

    #[test]
    fn test_total_mismatch_fails_whole_series() {
        let rows = vec![
            record(1, [1, 1, 1, 1]),
            VisitRecord::new("R1", mock_date(2024, 1, 2), [1, 1, 1, 1], 5),
        ];
        let err = CumulativeSeriesBuilder::new().build(&rows).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_negative_count_rejected() {
        let rows = vec![VisitRecord::new("R1", mock_date(2024, 1, 2), [3, -1, 0, 0], 2)];
        let err = CumulativeSeriesBuilder::new().build(&rows).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("negative count"));
    }

    proptest! {
        #[test]
        fn prop_points_are_monotonic(bands in prop::collection::vec(prop::array::uniform4(0i64..100_000), 0..40)) {
            let rows: Vec<_> = bands
                .iter()
                .enumerate()
                .map(|(i, b)| VisitRecord::from_bands("R1", mock_date(2024, 1, 1) + chrono::Duration::days(i as i64), *b))
                .collect();

            let points = CumulativeSeriesBuilder::new().build(&rows).unwrap();
            prop_assert_eq!(points.len(), rows.len());
            for (point, row) in points.iter().zip(&rows) {
                prop_assert!(point.is_monotonic());
                prop_assert_eq!(point.all_bands as i64, row.total_count);
                prop_assert_eq!(point.date, row.date);
            }
        }

        #[test]
        fn prop_each_point_depends_only_on_its_record(a in prop::array::uniform4(0i64..1000), b in prop::array::uniform4(0i64..1000)) {
            let builder = CumulativeSeriesBuilder::new();
            let alone = builder.build(&[record(2, b)]).unwrap();
            let together = builder.build(&[record(1, a), record(2, b)]).unwrap();
            prop_assert_eq!(alone[0], together[1]);
        }
    }
}
