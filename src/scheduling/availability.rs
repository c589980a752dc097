//! Client for the availability endpoint, with the cache in front.
//!
//! `POST /api/check-availability` accepts `{date, timezone}` and returns
//! `{availableSlots, date, timezone}` where `availableSlots` is an
//! ordered list of `HH:MM` times in the requested timezone. Errors come
//! back as `{error, message}`. An empty slot list is a normal answer
//! (nothing free that day), not a failure.

use crate::config::{ApiConfig, SchedulingConfig};
use crate::error::{LevrokError, Result};
use crate::scheduling::cache::AvailabilityCache;
use crate::scheduling::timezone;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API route serving availability checks.
pub const AVAILABILITY_ROUTE: &str = "/api/check-availability";

#[derive(Debug, Serialize)]
struct AvailabilityRequest<'a> {
    date: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(rename = "availableSlots")]
    available_slots: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityError {
    #[allow(dead_code)]
    error: String,
    message: String,
}

/// Validate a `YYYY-MM-DD` date string.
pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| LevrokError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", date)).into())
}

/// Client for availability lookups.
///
/// Holds the cache, so repeated lookups for the same day and timezone
/// inside the TTL never touch the network.
pub struct AvailabilityClient {
    client: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
    cache: AvailabilityCache,
}

impl AvailabilityClient {
    /// Create a client from configuration, with a system-clock cache.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(api: &ApiConfig, scheduling: &SchedulingConfig) -> Result<Self> {
        let cache = AvailabilityCache::new(
            Duration::from_secs(scheduling.cache_ttl_seconds),
            Duration::from_secs(scheduling.cache_stale_seconds),
        );
        Self::with_cache(api, cache)
    }

    /// Create a client with a caller-supplied cache (used by tests to
    /// inject a fake clock).
    pub fn with_cache(api: &ApiConfig, cache: AvailabilityCache) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(concat!("levrok/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                LevrokError::Scheduling(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: api.route(AVAILABILITY_ROUTE),
            bearer_token: api.bearer_token(),
            cache,
        })
    }

    /// Fetch available `HH:MM` slots for a date in a timezone.
    ///
    /// Cache first; on a miss the endpoint is queried and the answer is
    /// stored. Validation failures never reach the network.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed date or unsupported
    /// timezone, and an upstream error when the endpoint rejects the
    /// request.
    pub async fn available_slots(&mut self, date: &str, timezone_id: &str) -> Result<Vec<String>> {
        validate_date(date)?;
        let timezone_id = timezone::normalize(timezone_id)?;

        if let Some(slots) = self.cache.lookup(date, timezone_id) {
            return Ok(slots);
        }

        let mut request = self.client.post(&self.url).json(&AvailabilityRequest {
            date,
            timezone: timezone_id,
        });
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            LevrokError::Scheduling(format!("Availability request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<AvailabilityError>().await {
                Ok(body) => body.message,
                Err(_) => "availability check failed".to_string(),
            };
            return Err(LevrokError::Upstream {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: AvailabilityResponse = response.json().await.map_err(|e| {
            LevrokError::Scheduling(format!("Invalid availability reply: {}", e))
        })?;

        tracing::debug!(
            "Fetched {} slot(s) for {} in {}",
            body.available_slots.len(),
            date,
            timezone_id
        );
        self.cache
            .store(date, timezone_id, body.available_slots.clone());

        Ok(body.available_slots)
    }
}
