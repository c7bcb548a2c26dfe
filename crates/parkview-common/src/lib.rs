//! # Parkview Common
//!
//! Shared types, utilities, and the visit store HTTP client used by every
//! crate in the parkview workspace.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod park_api;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use error::{ParkError, Result};
pub use logging::{init_logging, LoggingConfig};
pub use park_api::{
    ClientMetrics, DetailedVisitDto, ParkApiClient, ParkApiConfig, RideDto, SummaryVisitDto,
};
pub use types::*;
pub use utils::*;
