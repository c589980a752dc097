//! Client for the booking endpoint, plus request validation.
//!
//! `POST /api/schedule-meeting` accepts the attendee and slot details and
//! returns `{message, meetingId}` on success or `{message}` on failure.
//! Validation runs client-side first so a malformed request never leaves
//! the process; a rejected booking surfaces the endpoint's message so the
//! user can correct and retry.

use crate::config::ApiConfig;
use crate::error::{LevrokError, Result};
use crate::scheduling::availability::validate_date;
use crate::scheduling::timezone;
use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// API route serving meeting bookings.
pub const BOOKING_ROUTE: &str = "/api/schedule-meeting";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; construction cannot fail at runtime.
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// A meeting booking request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Meeting date in `YYYY-MM-DD` format
    pub selected_date: String,
    /// Meeting time in `HH:MM` format, local to `timezone`
    pub selected_time: String,
    /// IANA timezone the time is expressed in
    pub timezone: String,
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Attendee's company name
    pub company_name: String,
    /// Attendee's company industry
    pub company_niche: String,
}

impl BookingRequest {
    /// Validate the request, collecting every field problem.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing all failing fields.
    pub fn validate(&self) -> Result<()> {
        let mut problems: Vec<String> = Vec::new();

        if validate_date(&self.selected_date).is_err() {
            problems.push(format!(
                "Invalid date '{}', expected YYYY-MM-DD",
                self.selected_date
            ));
        }
        if NaiveTime::parse_from_str(&self.selected_time, "%H:%M").is_err() {
            problems.push(format!(
                "Invalid time '{}', expected HH:MM",
                self.selected_time
            ));
        }
        if timezone::normalize(&self.timezone).is_err() {
            problems.push(format!("Unsupported timezone '{}'", self.timezone));
        }
        if self.name.trim().is_empty() {
            problems.push("Name is required".to_string());
        }
        if self.email.trim().is_empty() {
            problems.push("Email is required".to_string());
        } else if !email_regex().is_match(self.email.trim()) {
            problems.push("Please enter a valid email address".to_string());
        }
        if self.company_name.trim().is_empty() {
            problems.push("Company name is required".to_string());
        }
        if self.company_niche.trim().is_empty() {
            problems.push("Company niche is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LevrokError::Validation(problems.join("; ")).into())
        }
    }
}

/// Successful booking reply.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfirmation {
    /// Human-readable confirmation message
    pub message: String,
    /// Identifier of the created meeting
    #[serde(rename = "meetingId")]
    pub meeting_id: String,
}

#[derive(Debug, Deserialize)]
struct BookingError {
    message: String,
}

/// Client for scheduling meetings.
pub struct BookingClient {
    client: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
}

impl BookingClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(concat!("levrok/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                LevrokError::Scheduling(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: api.route(BOOKING_ROUTE),
            bearer_token: api.bearer_token(),
        })
    }

    /// Validate and submit a booking.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network traffic when the
    /// request is malformed, and an upstream error carrying the
    /// endpoint's message when the booking is rejected.
    pub async fn schedule(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        request.validate()?;

        let mut http_request = self.client.post(&self.url).json(request);
        if let Some(token) = &self.bearer_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| LevrokError::Scheduling(format!("Booking request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<BookingError>().await {
                Ok(body) => body.message,
                Err(_) => "failed to schedule meeting".to_string(),
            };
            return Err(LevrokError::Upstream {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let confirmation: BookingConfirmation = response
            .json()
            .await
            .map_err(|e| LevrokError::Scheduling(format!("Invalid booking reply: {}", e)))?;

        tracing::info!("Meeting scheduled: {}", confirmation.meeting_id);
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> BookingRequest {
        BookingRequest {
            selected_date: "2026-03-02".to_string(),
            selected_time: "11:30".to_string(),
            timezone: "America/New_York".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company_name: "Analytical Engines".to_string(),
            company_niche: "Computing".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_request_serializes_to_camel_case() {
        let json = serde_json::to_string(&valid_request()).unwrap();
        assert!(json.contains("\"selectedDate\""));
        assert!(json.contains("\"selectedTime\""));
        assert!(json.contains("\"companyName\""));
        assert!(json.contains("\"companyNiche\""));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let mut request = valid_request();
        request.name = "   ".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("Name is required"));
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut request = valid_request();
        request.email = "not-an-email".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("valid email"));
    }

    #[test]
    fn test_empty_email_reported_as_missing() {
        let mut request = valid_request();
        request.email = "".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("Email is required"));
    }

    #[test]
    fn test_bad_date_and_time_both_reported() {
        let mut request = valid_request();
        request.selected_date = "March 2nd".to_string();
        request.selected_time = "eleven".to_string();
        let err = request.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Invalid date"));
        assert!(text.contains("Invalid time"));
    }

    #[test]
    fn test_unsupported_timezone_rejected() {
        let mut request = valid_request();
        request.timezone = "Moon/Tranquility".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_email_regex_accepts_common_addresses() {
        for email in ["a@b.co", "first.last@sub.domain.org", "x+tag@y.io"] {
            assert!(email_regex().is_match(email), "{} should match", email);
        }
    }

    #[test]
    fn test_email_regex_rejects_spaces_and_missing_parts() {
        for email in ["a b@c.de", "@no-user.com", "no-at-sign", "user@nodot"] {
            assert!(!email_regex().is_match(email), "{} should not match", email);
        }
    }
}
