//! Error types and utilities for parkview

use std::time::Duration;
use thiserror::Error;

/// Result type alias for parkview operations
pub type Result<T> = std::result::Result<T, ParkError>;

/// Main error type for parkview operations
#[derive(Error, Debug)]
pub enum ParkError {
    /// Malformed input: bad date range, count invariant violation, unparseable date
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A referenced entity (usually a ride) does not exist
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource: Option<String>,
    },

    /// The visit store could not be reached or answered with an error
    #[error("Visit store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A store call exceeded its time allowance
    #[error("Timed out after {timeout:?}: {message}")]
    Timeout { message: String, timeout: Duration },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ParkError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
            resource: None,
        }
    }

    /// Not-found error for an unknown ride identifier
    pub fn no_such_ride(ride_id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: format!("no such ride: {ride_id}"),
            resource: Some(ride_id.to_string()),
        }
    }

    /// Create a new store-unavailable error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new store-unavailable error with an HTTP status code
    pub fn store_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::StoreUnavailable {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new store-unavailable error with source
    pub fn store_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreUnavailable {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new timeout error
    pub fn timeout(msg: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            message: msg.into(),
            timeout,
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error came from the store side (unreachable or too slow).
    ///
    /// Callers treat both kinds the same way: the request failed and nothing
    /// about the displayed report should change.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. } | Self::Timeout { .. })
    }

    /// Whether the error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether the error reports a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convert from reqwest::Error to ParkError
impl From<reqwest::Error> for ParkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: format!("request timed out: {err}"),
                timeout: Duration::ZERO,
            }
        } else if err.is_connect() {
            Self::store_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::StoreUnavailable {
                message: format!("HTTP error: {status_code}"),
                status_code: Some(status_code),
                source: Some(Box::new(err)),
            }
        } else {
            Self::store_with_source("Network request failed", err)
        }
    }
}
