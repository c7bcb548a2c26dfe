//! Visit store HTTP client with connection pooling and rate limiting
//!
//! Talks to the park administration backend that owns rides and recorded
//! visits. Only read endpoints are wrapped here; every call is rate limited and
//! transport failures are retried with exponential backoff.

use crate::error::{ParkError, Result};
use crate::utils::format_wire_date;
use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Deserializer, Serialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, error, info, instrument, warn};

const RIDES_PATH: &str = "api/Ride/GetRides";
const RIDES_BY_ID_PATH: &str = "api/Ride/GetRidesById";
const DETAILED_VISITS_PATH: &str = "api/Visit/GetDetailedVisitsForRide";
const SUMMARY_VISITS_PATH: &str = "api/Visit/GetSummaryVisits";

/// Configuration for the visit store client
#[derive(Debug, Clone)]
pub struct ParkApiConfig {
    /// Base URL of the park backend (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts (default: 3)
    pub max_retries: usize,
    /// The backend filters `startTime` exclusively; send the day before the
    /// first requested day so that it is included (default: true)
    pub exclusive_start_bound: bool,
}

impl Default for ParkApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
            max_retries: 3,
            exclusive_start_bound: true,
        }
    }
}

impl ParkApiConfig {
    /// Create a new configuration for the given backend
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Choose whether the lower date bound is shifted for an exclusive backend filter
    pub fn with_exclusive_start_bound(mut self, exclusive: bool) -> Self {
        self.exclusive_start_bound = exclusive;
        self
    }
}

/// Visit store HTTP client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct ParkApiClient {
    client: Client,
    config: ParkApiConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ParkApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ParkApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| ParkError::config_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| ParkError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with default settings for the given backend
    pub fn with_defaults(base_url: impl Into<String>) -> Result<Self> {
        Self::new(ParkApiConfig::new(base_url))
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Lower bound as sent on the wire
    fn wire_start(&self, start: NaiveDate) -> NaiveDate {
        if self.config.exclusive_start_bound {
            start.pred_opt().unwrap_or(start)
        } else {
            start
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Send one request, retrying connection failures, timeouts and 5xx answers
    #[instrument(skip(self, body))]
    async fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.build_url(path);
        debug!("Making request to: {}", url);

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let timeout = self.timeout();

        let response = RetryIf::spawn(
            retry_strategy,
            || {
                let mut request = self.client.request(method.clone(), &url);
                if let Some(body) = body {
                    request = request.json(body);
                }

                async move {
                    match request.send().await {
                        Ok(response) if response.status().is_success() => {
                            debug!("Request successful: {}", response.status());
                            Ok(response)
                        }
                        Ok(response) if response.status().is_client_error() => {
                            error!("Client error: {}", response.status());
                            Err(ParkError::store_with_status(
                                format!("backend rejected request: {}", response.status()),
                                response.status().as_u16(),
                            ))
                        }
                        Ok(response) => {
                            warn!("Server error, will retry: {}", response.status());
                            Err(ParkError::store_with_status(
                                format!("backend returned server error: {}", response.status()),
                                response.status().as_u16(),
                            ))
                        }
                        Err(e) if e.is_timeout() => {
                            warn!("Request timeout, will retry: {}", e);
                            Err(ParkError::timeout(format!("{path}: {e}"), timeout))
                        }
                        Err(e) => {
                            warn!("Request failed: {}", e);
                            Err(ParkError::from(e))
                        }
                    }
                }
            },
            is_retryable,
        )
        .await?;

        info!("Successfully completed request to {}", path);
        Ok(response)
    }

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.make_request(method, path, body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ParkError::store_with_source("Failed to read response body", e))?;

        debug!(bytes = text.len(), "Response body received");
        Ok(serde_json::from_str(&text)?)
    }

    // ============================================================================
    // Public API Methods
    // ============================================================================

    /// Get every ride in the inventory
    #[instrument(skip(self))]
    pub async fn get_rides(&self) -> Result<Vec<RideDto>> {
        info!("Fetching ride list");
        self.request_json(Method::GET, RIDES_PATH, None).await
    }

    /// Get the rides matching the given identifiers
    ///
    /// Unknown identifiers are simply absent from the answer.
    #[instrument(skip(self), fields(count = ride_ids.len()))]
    pub async fn get_rides_by_id(&self, ride_ids: &[String]) -> Result<Vec<RideDto>> {
        info!("Fetching rides by id");
        let body = serde_json::to_value(ride_ids)?;
        self.request_json(Method::POST, RIDES_BY_ID_PATH, Some(&body)).await
    }

    /// Get per-day, age-banded visit rows for one ride
    #[instrument(skip(self))]
    pub async fn get_detailed_visits(
        &self,
        ride_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DetailedVisitDto>> {
        info!("Fetching detailed visits");
        let body = serde_json::to_value(VisitRangeRequest {
            ride_id: Some(ride_id.to_string()),
            start_time: format_wire_date(self.wire_start(start)),
            end_time: format_wire_date(end),
        })?;
        self.request_json(Method::POST, DETAILED_VISITS_PATH, Some(&body)).await
    }

    /// Get per-ride aggregates (average, max, total) over a date range
    #[instrument(skip(self))]
    pub async fn get_summary_visits(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SummaryVisitDto>> {
        info!("Fetching summary visits");
        let body = serde_json::to_value(VisitRangeRequest {
            ride_id: None,
            start_time: format_wire_date(self.wire_start(start)),
            end_time: format_wire_date(end),
        })?;
        self.request_json(Method::POST, SUMMARY_VISITS_PATH, Some(&body)).await
    }

    /// Get metrics about the client configuration and state
    pub fn get_client_metrics(&self) -> ClientMetrics {
        ClientMetrics {
            base_url: self.config.base_url.clone(),
            timeout_secs: self.config.timeout_secs,
            max_idle_per_host: self.config.max_idle_per_host,
            rate_limit_per_sec: self.config.rate_limit_per_sec,
            max_retries: self.config.max_retries,
            has_rate_limit_capacity: self.rate_limiter.check().is_ok(),
        }
    }
}

/// 4xx answers are final; everything else from the store side is worth another try
fn is_retryable(err: &ParkError) -> bool {
    match err {
        ParkError::StoreUnavailable {
            status_code: Some(code),
            ..
        } => *code >= 500,
        ParkError::StoreUnavailable { .. } | ParkError::Timeout { .. } => true,
        _ => false,
    }
}

/// Client metrics for monitoring and debugging
#[derive(Debug, Clone, Serialize)]
pub struct ClientMetrics {
    /// Base URL being used
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection pool max idle per host
    pub max_idle_per_host: usize,
    /// Rate limit requests per second
    pub rate_limit_per_sec: u32,
    /// Maximum retry attempts
    pub max_retries: usize,
    /// Whether we currently have rate limit capacity
    pub has_rate_limit_capacity: bool,
}

// ============================================================================
// Wire Models
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisitRangeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    ride_id: Option<String>,
    start_time: String,
    end_time: String,
}

/// Ride identity as returned by the ride endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideDto {
    #[serde(deserialize_with = "id_string")]
    pub ride_id: String,
    pub ride_name: String,
}

/// One recorded day of visits for a ride
///
/// `date` is kept as received; it is parsed when converted into a domain record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetailedVisitDto {
    #[serde(rename = "rideId", deserialize_with = "id_string")]
    pub ride_id: String,
    pub date: String,
    #[serde(rename = "ageGroup1_0_to_18")]
    pub age_group1: i64,
    #[serde(rename = "ageGroup2_19_to_30")]
    pub age_group2: i64,
    #[serde(rename = "ageGroup3_31_to_50")]
    pub age_group3: i64,
    #[serde(rename = "ageGroup4_over50")]
    pub age_group4: i64,
    #[serde(rename = "count")]
    pub total_count: i64,
}

/// Attendance aggregated per ride over a date range
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryVisitDto {
    #[serde(rename = "rideId", default, deserialize_with = "opt_id_string")]
    pub ride_id: Option<String>,
    pub name: String,
    pub average: f64,
    #[serde(rename = "maxCount")]
    pub max_count: i64,
    #[serde(rename = "count")]
    pub total_count: i64,
}

/// Identifiers arrive as strings or integers depending on the backend
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    WireId::deserialize(deserializer).map(String::from)
}

fn opt_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<WireId>::deserialize(deserializer)?.map(String::from))
}
