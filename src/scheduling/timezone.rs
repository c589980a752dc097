//! Supported timezones and display helpers for the scheduling flow.
//!
//! Availability is defined in the business timezone (Eastern, 11:00 to
//! 19:00); users pick from a fixed list of US timezones and all times are
//! shown in their choice.

use crate::error::{LevrokError, Result};
use chrono::NaiveTime;

/// A selectable timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneOption {
    /// IANA timezone identifier
    pub id: &'static str,
    /// Display name
    pub label: &'static str,
    /// Short form shown next to times
    pub abbreviation: &'static str,
    /// Standard UTC offset in hours
    pub utc_offset_hours: i8,
}

/// Timezones offered by the scheduling flow.
pub const SUPPORTED_TIMEZONES: &[TimezoneOption] = &[
    TimezoneOption { id: "America/New_York", label: "Eastern Time", abbreviation: "EST", utc_offset_hours: -5 },
    TimezoneOption { id: "America/Chicago", label: "Central Time", abbreviation: "CST", utc_offset_hours: -6 },
    TimezoneOption { id: "America/Denver", label: "Mountain Time", abbreviation: "MST", utc_offset_hours: -7 },
    TimezoneOption { id: "America/Phoenix", label: "Arizona Time", abbreviation: "MST", utc_offset_hours: -7 },
    TimezoneOption { id: "America/Los_Angeles", label: "Pacific Time", abbreviation: "PST", utc_offset_hours: -8 },
    TimezoneOption { id: "America/Anchorage", label: "Alaska Time", abbreviation: "AKST", utc_offset_hours: -9 },
    TimezoneOption { id: "Pacific/Honolulu", label: "Hawaii Time", abbreviation: "HST", utc_offset_hours: -10 },
    TimezoneOption { id: "America/Puerto_Rico", label: "Atlantic Time", abbreviation: "AST", utc_offset_hours: -4 },
    TimezoneOption { id: "Pacific/Guam", label: "Guam Time", abbreviation: "ChST", utc_offset_hours: 10 },
];

/// Timezone all availability is defined in.
pub const BUSINESS_TIMEZONE: &str = "America/New_York";

/// Business hours in the business timezone (24-hour clock).
pub const BUSINESS_OPEN_HOUR: u32 = 11;
/// End of business hours, exclusive.
pub const BUSINESS_CLOSE_HOUR: u32 = 19;

/// Look up a supported timezone by IANA identifier.
pub fn find(id: &str) -> Option<&'static TimezoneOption> {
    SUPPORTED_TIMEZONES.iter().find(|tz| tz.id == id)
}

/// Whether the identifier is in the supported list.
pub fn is_supported(id: &str) -> bool {
    find(id).is_some()
}

/// Abbreviation for display, defaulting to the business timezone's.
pub fn abbreviation(id: &str) -> &'static str {
    find(id).map(|tz| tz.abbreviation).unwrap_or("EST")
}

/// Resolve an identifier to a supported one, accepting common aliases.
///
/// # Errors
///
/// Returns a validation error when the identifier is neither supported
/// nor a known alias.
pub fn normalize(id: &str) -> Result<&'static str> {
    if let Some(tz) = find(id) {
        return Ok(tz.id);
    }

    let mapped = match id {
        "US/Eastern" => "America/New_York",
        "US/Central" => "America/Chicago",
        "US/Mountain" => "America/Denver",
        "US/Pacific" => "America/Los_Angeles",
        "US/Alaska" => "America/Anchorage",
        "US/Hawaii" => "Pacific/Honolulu",
        _ => {
            return Err(LevrokError::Validation(format!(
                "Unsupported timezone '{}'",
                id
            ))
            .into())
        }
    };
    Ok(mapped)
}

/// Format an `HH:MM` time as `h:mm AM/PM ABBR` for display.
///
/// # Errors
///
/// Returns a validation error when the time string is malformed.
pub fn format_time_12h(time: &str, timezone: &str) -> Result<String> {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| LevrokError::Validation(format!("Invalid time '{}'", time)))?;

    use chrono::Timelike;
    let hour = parsed.hour();
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };

    Ok(format!(
        "{}:{:02} {} {}",
        display_hour,
        parsed.minute(),
        period,
        abbreviation(timezone)
    ))
}
