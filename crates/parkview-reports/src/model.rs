//! Domain types shared by the builders, the stores and the query layer

use chrono::{Days, NaiveDate};
use parkview_common::{
    parse_calendar_date, DetailedVisitDto, ParkError, RideDto, RideId, Result, SummaryVisitDto,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row per ride and day, with visitors broken down by age band.
///
/// Counts are kept signed as delivered by the store; the timeline builder
/// rejects negative values instead of the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub ride_id: RideId,
    pub date: NaiveDate,
    pub age_group1_count: i64,
    pub age_group2_count: i64,
    pub age_group3_count: i64,
    pub age_group4_count: i64,
    pub total_count: i64,
}

impl VisitRecord {
    /// Build a record whose total is given explicitly
    pub fn new(ride_id: impl Into<RideId>, date: NaiveDate, bands: [i64; 4], total_count: i64) -> Self {
        Self {
            ride_id: ride_id.into(),
            date,
            age_group1_count: bands[0],
            age_group2_count: bands[1],
            age_group3_count: bands[2],
            age_group4_count: bands[3],
            total_count,
        }
    }

    /// Build a record whose total is the sum of its bands
    pub fn from_bands(ride_id: impl Into<RideId>, date: NaiveDate, bands: [i64; 4]) -> Self {
        let total = bands.iter().fold(0i64, |acc, b| acc.saturating_add(*b));
        Self::new(ride_id, date, bands, total)
    }

    /// Band counts in age order
    pub fn bands(&self) -> [i64; 4] {
        [
            self.age_group1_count,
            self.age_group2_count,
            self.age_group3_count,
            self.age_group4_count,
        ]
    }

    /// Sum of the four bands, `None` on overflow
    pub fn band_sum(&self) -> Option<i64> {
        self.bands().iter().try_fold(0i64, |acc, n| acc.checked_add(*n))
    }
}

impl TryFrom<DetailedVisitDto> for VisitRecord {
    type Error = ParkError;

    fn try_from(dto: DetailedVisitDto) -> Result<Self> {
        Ok(Self {
            ride_id: RideId::new(dto.ride_id),
            date: parse_calendar_date(&dto.date, "date")?,
            age_group1_count: dto.age_group1,
            age_group2_count: dto.age_group2,
            age_group3_count: dto.age_group3,
            age_group4_count: dto.age_group4,
            total_count: dto.total_count,
        })
    }
}

/// Pre-aggregated attendance for one ride over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSummaryRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ride_id: Option<RideId>,
    pub ride_name: String,
    pub average_count: f64,
    pub max_count: i64,
    pub total_count: i64,
}

impl From<SummaryVisitDto> for RideSummaryRow {
    fn from(dto: SummaryVisitDto) -> Self {
        Self {
            ride_id: dto.ride_id.map(RideId::new),
            ride_name: dto.name,
            average_count: dto.average,
            max_count: dto.max_count,
            total_count: dto.total_count,
        }
    }
}

/// Ride metadata as far as reports care about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub ride_id: RideId,
    pub ride_name: String,
}

impl Ride {
    pub fn new(ride_id: impl Into<RideId>, ride_name: impl Into<String>) -> Self {
        Self {
            ride_id: ride_id.into(),
            ride_name: ride_name.into(),
        }
    }
}

impl From<RideDto> for Ride {
    fn from(dto: RideDto) -> Self {
        Self::new(dto.ride_id, dto.ride_name)
    }
}

/// `{value, label}` pair for a ride picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideOption {
    pub value: String,
    pub label: String,
}

impl From<&Ride> for RideOption {
    fn from(ride: &Ride) -> Self {
        Self {
            value: ride.ride_id.to_string(),
            label: ride.ride_name.clone(),
        }
    }
}

/// Inclusive calendar date range.
///
/// Construction does not validate; [`DateRange::validate`] checks ordering and
/// the lookback window against a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds, naming the offending field on failure
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(
            parse_calendar_date(start, "start")?,
            parse_calendar_date(end, "end")?,
        ))
    }

    /// The `days` days before `today`, up to and including `today`
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        Self::new(Self::days_before(today, days), today)
    }

    /// Earliest day a report may start on
    pub fn window_start(today: NaiveDate, lookback_days: u32) -> NaiveDate {
        Self::days_before(today, lookback_days)
    }

    // Saturates at the earliest representable date
    fn days_before(today: NaiveDate, days: u32) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, zero when inverted
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// Check ordering first, then that both bounds lie in `[today - lookback_days, today]`
    pub fn validate(&self, today: NaiveDate, lookback_days: u32) -> Result<()> {
        if self.start > self.end {
            return Err(ParkError::validation_field("start after end", "start"));
        }

        let earliest = Self::window_start(today, lookback_days);
        if self.start < earliest || self.end > today {
            let field = if self.start < earliest { "start" } else { "end" };
            return Err(ParkError::validation_field("range out of lookback window", field));
        }

        Ok(())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// The four age bands, youngest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    Under19,
    From19To30,
    From31To50,
    Over50,
}

impl AgeBand {
    pub const ALL: [AgeBand; 4] = [
        AgeBand::Under19,
        AgeBand::From19To30,
        AgeBand::From31To50,
        AgeBand::Over50,
    ];

    /// Label of the band alone
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Under19 => "0-18",
            AgeBand::From19To30 => "19-30",
            AgeBand::From31To50 => "31-50",
            AgeBand::Over50 => "51+",
        }
    }

    /// Label of this band stacked on every younger band
    pub fn cumulative_label(self) -> &'static str {
        match self {
            AgeBand::Under19 => "0-18",
            AgeBand::From19To30 => "0-30",
            AgeBand::From31To50 => "0-50",
            AgeBand::Over50 => "All Age Groups",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-day stacked breakdown: each field includes every younger band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeSeriesPoint {
    pub date: NaiveDate,
    pub band1: u64,
    pub band1_plus2: u64,
    pub band1_plus2_plus3: u64,
    pub all_bands: u64,
}

impl CumulativeSeriesPoint {
    /// Stacked value for a band
    pub fn stacked(&self, band: AgeBand) -> u64 {
        match band {
            AgeBand::Under19 => self.band1,
            AgeBand::From19To30 => self.band1_plus2,
            AgeBand::From31To50 => self.band1_plus2_plus3,
            AgeBand::Over50 => self.all_bands,
        }
    }

    /// Whether the stacked values never decrease
    pub fn is_monotonic(&self) -> bool {
        self.band1 <= self.band1_plus2
            && self.band1_plus2 <= self.band1_plus2_plus3
            && self.band1_plus2_plus3 <= self.all_bands
    }
}

/// Per-ride comparison as parallel arrays, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    #[serde(rename = "rideName")]
    pub ride_names: Vec<String>,
    #[serde(rename = "average")]
    pub averages: Vec<f64>,
    #[serde(rename = "max")]
    pub maxes: Vec<i64>,
}

impl ComparisonSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ride_names: Vec::with_capacity(capacity),
            averages: Vec::with_capacity(capacity),
            maxes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, ride_name: impl Into<String>, average: f64, max: i64) {
        self.ride_names.push(ride_name.into());
        self.averages.push(average);
        self.maxes.push(max);
    }

    pub fn len(&self) -> usize {
        self.ride_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ride_names.is_empty()
    }
}
