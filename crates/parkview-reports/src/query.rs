//! Report queries: validate the selection, fetch from the store, run a builder

use crate::clock::{Clock, SystemClock};
use crate::cumulative::CumulativeSeriesBuilder;
use crate::model::{ComparisonSeries, CumulativeSeriesPoint, DateRange, Ride, RideOption};
use crate::store::VisitRecordStore;
use crate::summary::CrossRideSummaryBuilder;
use crate::traits::SeriesBuilder;
use parkview_common::{ParkError, RideId, Result};
use parkview_config::ReportsConfig;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Timeline for one ride together with the ride and range it was built for
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideTimeline {
    pub ride: Ride,
    pub range: DateRange,
    pub points: Vec<CumulativeSeriesPoint>,
}

/// One request/response cycle against the visit store per call.
///
/// Queries are read-only and hold no mutable state, so one instance can serve
/// concurrent callers. Every store call is bounded by the fetch timeout; the
/// query itself never retries.
#[derive(Clone)]
pub struct ReportQuery {
    store: Arc<dyn VisitRecordStore>,
    clock: Arc<dyn Clock>,
    lookback_days: u32,
    default_range_days: u32,
    fetch_timeout: Duration,
}

impl ReportQuery {
    /// Query with the default limits (90 day lookback, 5 s fetch timeout)
    pub fn new(store: Arc<dyn VisitRecordStore>) -> Self {
        Self::from_config(store, &ReportsConfig::default())
    }

    pub fn from_config(store: Arc<dyn VisitRecordStore>, config: &ReportsConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            lookback_days: config.lookback_days,
            default_range_days: config.default_range_days,
            fetch_timeout: config.fetch_timeout(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Trailing window ending today
    pub fn default_range(&self) -> DateRange {
        DateRange::trailing(self.today(), self.default_range_days)
    }

    /// Run a store call under the fetch timeout
    async fn bounded<T, F>(&self, operation: &str, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.fetch_timeout, "Store call timed out");
                Err(ParkError::timeout(
                    format!("{operation} did not complete"),
                    self.fetch_timeout,
                ))
            }
        }
    }

    /// Look a ride up by id
    #[instrument(skip_all, fields(ride = %ride_id))]
    pub async fn resolve_ride(&self, ride_id: &RideId) -> Result<Ride> {
        let ids = [ride_id.clone()];
        let rides = self
            .bounded("fetch_rides_by_ids", self.store.fetch_rides_by_ids(&ids))
            .await?;

        rides
            .into_iter()
            .find(|ride| &ride.ride_id == ride_id)
            .ok_or_else(|| ParkError::no_such_ride(ride_id))
    }

    /// Per-day stacked age-band series for one ride.
    ///
    /// An unknown ride is reported before the range is looked at.
    pub async fn build_ride_timeline(
        &self,
        ride_id: &RideId,
        range: &DateRange,
    ) -> Result<Vec<CumulativeSeriesPoint>> {
        Ok(self.build_ride_report(ride_id, range).await?.points)
    }

    /// Same as [`Self::build_ride_timeline`], keeping the resolved ride
    #[instrument(skip_all, fields(ride = %ride_id, range = %range))]
    pub async fn build_ride_report(&self, ride_id: &RideId, range: &DateRange) -> Result<RideTimeline> {
        let ride = self.resolve_ride(ride_id).await?;
        range.validate(self.today(), self.lookback_days)?;

        let mut records = self
            .bounded(
                "fetch_detailed_visits",
                self.store.fetch_detailed_visits(ride_id, range),
            )
            .await?;

        let fetched = records.len();
        records.retain(|r| &r.ride_id == ride_id && range.contains(r.date));
        records.sort_by_key(|r| r.date);
        if records.len() != fetched {
            debug!(dropped = fetched - records.len(), "Discarded records outside the selection");
        }

        let points = CumulativeSeriesBuilder::new().build(&records)?;
        info!(points = points.len(), "Ride timeline built");

        Ok(RideTimeline {
            ride,
            range: *range,
            points,
        })
    }

    /// Average and maximum attendance for every ride over `range`
    #[instrument(skip_all, fields(range = %range))]
    pub async fn build_cross_ride_summary(&self, range: &DateRange) -> Result<ComparisonSeries> {
        range.validate(self.today(), self.lookback_days)?;

        let rows = self
            .bounded("fetch_summary_visits", self.store.fetch_summary_visits(range))
            .await?;

        let series = CrossRideSummaryBuilder::new().build(&rows)?;
        info!(rides = series.len(), "Cross-ride summary built");
        Ok(series)
    }

    /// Rides as `{value, label}` options for a picker
    #[instrument(skip(self))]
    pub async fn list_rides(&self) -> Result<Vec<RideOption>> {
        let rides = self.bounded("fetch_rides", self.store.fetch_rides()).await?;
        debug!("Listing {} rides", rides.len());
        Ok(rides.iter().map(RideOption::from).collect())
    }
}

impl std::fmt::Debug for ReportQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportQuery")
            .field("lookback_days", &self.lookback_days)
            .field("default_range_days", &self.default_range_days)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
