//! Interactive booking command.
//!
//! Drives the three-step wizard: pick a date and slot, enter attendee
//! details, submit the booking, and show the confirmation. Validation
//! problems are printed and the step repeats; a rejected booking surfaces
//! the endpoint's message so the user can retry.

use crate::config::Config;
use crate::error::Result;
use crate::scheduling::{
    timezone, AttendeeDetails, AvailabilityClient, BookingClient, BookingWizard,
};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the booking wizard.
pub async fn run_book(config: Config, tz_override: Option<String>) -> Result<()> {
    let requested = tz_override.unwrap_or_else(|| config.scheduling.default_timezone.clone());
    let tz = timezone::normalize(&requested)?;

    let mut availability = AvailabilityClient::new(&config.api, &config.scheduling)?;
    let booking = BookingClient::new(&config.api)?;
    let mut wizard = BookingWizard::new(tz.to_string());
    let mut rl = DefaultEditor::new()?;

    println!("{}", "Schedule a call with Levrok Labs".bold());
    println!("Times are shown in {} ({}).\n", tz, timezone::abbreviation(tz));

    // Step 1: calendar
    loop {
        let date = match prompt(&mut rl, "Date (YYYY-MM-DD, empty to cancel): ")? {
            Some(date) => date,
            None => return cancelled(),
        };

        let slots = match availability.available_slots(&date, tz).await {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!("Availability lookup failed: {:#}", err);
                println!("Could not check availability right now. Please try again.\n");
                continue;
            }
        };

        if slots.is_empty() {
            println!("No availability on {}. Pick another date.\n", date);
            continue;
        }

        println!("Available times on {}:", date);
        for (i, slot) in slots.iter().enumerate() {
            let display = timezone::format_time_12h(slot, tz).unwrap_or_else(|_| slot.clone());
            println!("  {}. {}", i + 1, display);
        }

        let choice = match prompt(&mut rl, "Pick a slot number (empty to cancel): ")? {
            Some(choice) => choice,
            None => return cancelled(),
        };
        let Some(slot) = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| slots.get(i))
        else {
            println!("Not a valid slot number.\n");
            continue;
        };

        match wizard.select_slot(&date, slot) {
            Ok(()) => break,
            Err(err) => {
                println!("{}\n", err);
                continue;
            }
        }
    }

    if let Some(summary) = wizard.slot_summary() {
        println!("\nBooking {}.\n", summary.bold());
    }

    // Step 2: form (repeats until the booking goes through or the user quits)
    loop {
        let Some(name) = prompt(&mut rl, "Your name: ")? else {
            return cancelled();
        };
        let Some(email) = prompt(&mut rl, "Your email: ")? else {
            return cancelled();
        };
        let Some(company_name) = prompt(&mut rl, "Company name: ")? else {
            return cancelled();
        };
        let Some(company_niche) = prompt(&mut rl, "Company industry: ")? else {
            return cancelled();
        };

        let request = match wizard.submit_details(AttendeeDetails {
            name,
            email,
            company_name,
            company_niche,
        }) {
            Ok(request) => request,
            Err(err) => {
                println!("{}\n", format!("{}", err).yellow());
                continue;
            }
        };

        match booking.schedule(&request).await {
            Ok(confirmation) => {
                wizard.confirm()?;
                // Step 3: confirmation
                println!("\n{}", confirmation.message.green().bold());
                println!("Meeting ID: {}", confirmation.meeting_id);
                if let Some(summary) = wizard.slot_summary() {
                    println!("When: {}", summary);
                }
                return Ok(());
            }
            Err(err) => {
                tracing::warn!("Booking failed: {:#}", err);
                println!("\n{}\n", format!("{}", err).yellow());
                println!("You can correct the details and try again.\n");
            }
        }
    }
}

fn cancelled() -> Result<()> {
    println!("Booking cancelled.");
    Ok(())
}

/// Read one trimmed line; `None` means the user cancelled (empty input,
/// Ctrl-C, or Ctrl-D).
fn prompt(rl: &mut DefaultEditor, text: &str) -> Result<Option<String>> {
    match rl.readline(text) {
        Ok(line) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed))
            }
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
