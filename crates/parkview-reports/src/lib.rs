//! # Parkview Reports
//!
//! Visit analytics for the park back office: per-day stacked age-band
//! timelines for a single ride and average/maximum comparisons across rides.
//!
//! [`ReportQuery`] validates the caller's selection, fetches from a
//! [`VisitRecordStore`] under a timeout and hands the rows to one of the pure
//! builders ([`CumulativeSeriesBuilder`], [`CrossRideSummaryBuilder`]).

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod chart;
pub mod clock;
pub mod cumulative;
pub mod model;
pub mod query;
pub mod session;
pub mod store;
pub mod summary;
pub mod traits;

pub use chart::{comparison_chart, timeline_chart, ChartData, ChartDataset};
pub use clock::{Clock, FixedClock, SystemClock};
pub use cumulative::CumulativeSeriesBuilder;
pub use model::{
    AgeBand, ComparisonSeries, CumulativeSeriesPoint, DateRange, Ride, RideOption, RideSummaryRow,
    VisitRecord,
};
pub use query::{ReportQuery, RideTimeline};
pub use session::{PanelUpdate, ReportPanel, RequestSequencer, RequestToken};
pub use store::{InMemoryVisitStore, StoreSnapshot, UnavailableStore, VisitRecordStore};
pub use summary::CrossRideSummaryBuilder;
pub use traits::SeriesBuilder;
