//! Visit record store abstraction and its implementations.
//!
//! - [`ParkApiClient`]: the park backend over HTTP
//! - [`InMemoryVisitStore`]: in-process data for tests, demos and fixtures

use crate::model::{DateRange, Ride, RideSummaryRow, VisitRecord};
use async_trait::async_trait;
use parkview_common::{DetailedVisitDto, ParkApiClient, ParkError, RideDto, RideId, Result};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(test)]
use mockall::automock;

/// Read-only source of rides and recorded visits.
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// report query.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VisitRecordStore: Send + Sync {
    /// Visit records for one ride whose date falls inside `range`
    async fn fetch_detailed_visits(&self, ride_id: &RideId, range: &DateRange) -> Result<Vec<VisitRecord>>;

    /// One pre-aggregated row per ride for `range`
    async fn fetch_summary_visits(&self, range: &DateRange) -> Result<Vec<RideSummaryRow>>;

    /// Metadata for the given rides; unknown ids are absent from the answer
    async fn fetch_rides_by_ids(&self, ride_ids: &[RideId]) -> Result<Vec<Ride>>;

    /// Every ride in the inventory
    async fn fetch_rides(&self) -> Result<Vec<Ride>>;
}

#[async_trait]
impl<S: VisitRecordStore + ?Sized> VisitRecordStore for Arc<S> {
    async fn fetch_detailed_visits(&self, ride_id: &RideId, range: &DateRange) -> Result<Vec<VisitRecord>> {
        (**self).fetch_detailed_visits(ride_id, range).await
    }

    async fn fetch_summary_visits(&self, range: &DateRange) -> Result<Vec<RideSummaryRow>> {
        (**self).fetch_summary_visits(range).await
    }

    async fn fetch_rides_by_ids(&self, ride_ids: &[RideId]) -> Result<Vec<Ride>> {
        (**self).fetch_rides_by_ids(ride_ids).await
    }

    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        (**self).fetch_rides().await
    }
}

#[async_trait]
impl VisitRecordStore for ParkApiClient {
    async fn fetch_detailed_visits(&self, ride_id: &RideId, range: &DateRange) -> Result<Vec<VisitRecord>> {
        self.get_detailed_visits(ride_id.as_str(), range.start, range.end)
            .await?
            .into_iter()
            .map(VisitRecord::try_from)
            .collect()
    }

    async fn fetch_summary_visits(&self, range: &DateRange) -> Result<Vec<RideSummaryRow>> {
        let rows = self.get_summary_visits(range.start, range.end).await?;
        Ok(rows.into_iter().map(RideSummaryRow::from).collect())
    }

    async fn fetch_rides_by_ids(&self, ride_ids: &[RideId]) -> Result<Vec<Ride>> {
        let ids: Vec<String> = ride_ids.iter().map(|id| id.as_str().to_string()).collect();
        let rides = self.get_rides_by_id(&ids).await?;
        Ok(rides.into_iter().map(Ride::from).collect())
    }

    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        let rides = self.get_rides().await?;
        Ok(rides.into_iter().map(Ride::from).collect())
    }
}

/// JSON snapshot in the backend's wire format
#[derive(Debug, Default, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub rides: Vec<RideDto>,
    #[serde(default)]
    pub visits: Vec<DetailedVisitDto>,
}

#[derive(Debug, Default)]
struct Inventory {
    rides: Vec<Ride>,
    visits: Vec<VisitRecord>,
}

/// Thread-safe in-memory store.
///
/// Summary rows are computed from the stored records: total is the sum of
/// daily totals, max the largest daily total and average the total divided by
/// the number of recorded days. Rides without records in the range are left
/// out of the summary.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVisitStore {
    inner: Arc<RwLock<Inventory>>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from rides and records
    pub fn with_data(rides: Vec<Ride>, visits: Vec<VisitRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inventory { rides, visits })),
        }
    }

    /// Load a JSON snapshot (`{"rides": [...], "visits": [...]}`) in wire format
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Read a JSON snapshot file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_json(&content)?;
        info!(path = %path.as_ref().display(), "Loaded visit store snapshot");
        Ok(store)
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let rides = snapshot.rides.into_iter().map(Ride::from).collect();
        let visits = snapshot
            .visits
            .into_iter()
            .map(VisitRecord::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_data(rides, visits))
    }

    /// Add or rename a ride
    pub fn upsert_ride(&self, ride: Ride) {
        let mut inner = self.inner.write();
        match inner.rides.iter_mut().find(|r| r.ride_id == ride.ride_id) {
            Some(existing) => *existing = ride,
            None => inner.rides.push(ride),
        }
    }

    pub fn add_visit(&self, record: VisitRecord) {
        self.inner.write().visits.push(record);
    }

    pub fn visit_count(&self) -> usize {
        self.inner.read().visits.len()
    }

    fn summarize(ride: &Ride, records: &[&VisitRecord]) -> Result<Option<RideSummaryRow>> {
        if records.is_empty() {
            return Ok(None);
        }
        let total = records
            .iter()
            .try_fold(0i64, |acc, r| acc.checked_add(r.total_count))
            .ok_or_else(|| {
                ParkError::validation_field(
                    format!("total visits for ride {} overflow", ride.ride_id),
                    "totalCount",
                )
            })?;
        let max = records.iter().map(|r| r.total_count).max().unwrap_or(0);
        let days: HashSet<_> = records.iter().map(|r| r.date).collect();

        Ok(Some(RideSummaryRow {
            ride_id: Some(ride.ride_id.clone()),
            ride_name: ride.ride_name.clone(),
            average_count: total as f64 / days.len() as f64,
            max_count: max,
            total_count: total,
        }))
    }
}

#[async_trait]
impl VisitRecordStore for InMemoryVisitStore {
    #[instrument(skip_all, fields(ride = %ride_id, range = %range))]
    async fn fetch_detailed_visits(&self, ride_id: &RideId, range: &DateRange) -> Result<Vec<VisitRecord>> {
        let inner = self.inner.read();
        let mut records: Vec<_> = inner
            .visits
            .iter()
            .filter(|r| &r.ride_id == ride_id && range.contains(r.date))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        debug!("Found {} visit records", records.len());
        Ok(records)
    }

    #[instrument(skip_all, fields(range = %range))]
    async fn fetch_summary_visits(&self, range: &DateRange) -> Result<Vec<RideSummaryRow>> {
        let inner = self.inner.read();
        let rows: Vec<_> = inner
            .rides
            .iter()
            .map(|ride| {
                let records: Vec<_> = inner
                    .visits
                    .iter()
                    .filter(|r| r.ride_id == ride.ride_id && range.contains(r.date))
                    .collect();
                Self::summarize(ride, &records)
            })
            .filter_map(Result::transpose)
            .collect::<Result<_>>()?;
        debug!("Summarized {} rides", rows.len());
        Ok(rows)
    }

    async fn fetch_rides_by_ids(&self, ride_ids: &[RideId]) -> Result<Vec<Ride>> {
        let inner = self.inner.read();
        Ok(inner
            .rides
            .iter()
            .filter(|ride| ride_ids.contains(&ride.ride_id))
            .cloned()
            .collect())
    }

    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        Ok(self.inner.read().rides.clone())
    }
}

/// Store that fails every call; for exercising error paths.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    message: String,
}

impl UnavailableStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(ParkError::store(self.message.clone()))
    }
}

#[async_trait]
impl VisitRecordStore for UnavailableStore {
    async fn fetch_detailed_visits(&self, _ride_id: &RideId, _range: &DateRange) -> Result<Vec<VisitRecord>> {
        self.fail()
    }

    async fn fetch_summary_visits(&self, _range: &DateRange) -> Result<Vec<RideSummaryRow>> {
        self.fail()
    }

    async fn fetch_rides_by_ids(&self, _ride_ids: &[RideId]) -> Result<Vec<Ride>> {
        self.fail()
    }

    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        self.fail()
    }
}
