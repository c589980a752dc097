//! Availability lookup command.

use crate::config::Config;
use crate::error::Result;
use crate::scheduling::{timezone, AvailabilityClient};
use prettytable::{cell, row, Table};

/// Show available meeting slots for a date.
///
/// An empty slot list is reported as genuinely no availability; a failed
/// lookup gets a distinct try-again message with the cause in the logs.
pub async fn run_slots(config: Config, date: String, tz_override: Option<String>) -> Result<()> {
    let requested = tz_override.unwrap_or_else(|| config.scheduling.default_timezone.clone());
    let tz = timezone::normalize(&requested)?;

    let mut client = AvailabilityClient::new(&config.api, &config.scheduling)?;

    match client.available_slots(&date, tz).await {
        Ok(slots) if slots.is_empty() => {
            println!("No availability on {}.", date);
        }
        Ok(slots) => {
            let mut table = Table::new();
            table.add_row(row!["Time", "Local"]);
            for slot in &slots {
                let display = timezone::format_time_12h(slot, tz)
                    .unwrap_or_else(|_| slot.clone());
                table.add_row(row![slot, display]);
            }
            println!("Available slots on {} ({}):", date, tz);
            table.printstd();
        }
        Err(err) => {
            tracing::warn!("Availability lookup failed: {:#}", err);
            println!("Could not check availability right now. Please try again.");
        }
    }

    Ok(())
}
