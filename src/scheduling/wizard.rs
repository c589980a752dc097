//! Booking flow state machine.
//!
//! Scheduling is a three-step wizard: pick a slot on the calendar, fill
//! in attendee details, see the confirmation. The machine validates each
//! transition so a driver (the CLI, here) cannot submit details before a
//! slot exists or confirm before the booking succeeded.

use crate::error::{LevrokError, Result};
use crate::scheduling::availability::validate_date;
use crate::scheduling::booking::BookingRequest;
use crate::scheduling::timezone;
use chrono::NaiveTime;

/// The wizard's current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Choosing a date and time
    Calendar,
    /// Entering attendee details
    Form,
    /// Booking succeeded
    Confirmation,
}

/// Attendee details collected on the form step.
#[derive(Debug, Clone)]
pub struct AttendeeDetails {
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Company name
    pub company_name: String,
    /// Company industry
    pub company_niche: String,
}

/// Three-step booking flow.
///
/// # Examples
///
/// ```
/// use levrok::scheduling::{AttendeeDetails, BookingWizard, WizardStep};
///
/// # fn example() -> levrok::error::Result<()> {
/// let mut wizard = BookingWizard::new("America/New_York".to_string());
/// wizard.select_slot("2026-03-02", "11:30")?;
/// assert_eq!(wizard.step(), WizardStep::Form);
///
/// let request = wizard.submit_details(AttendeeDetails {
///     name: "Ada Lovelace".into(),
///     email: "ada@example.com".into(),
///     company_name: "Analytical Engines".into(),
///     company_niche: "Computing".into(),
/// })?;
/// // ... send `request` through the booking client, then:
/// wizard.confirm()?;
/// assert_eq!(wizard.step(), WizardStep::Confirmation);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct BookingWizard {
    step: WizardStep,
    timezone: String,
    selected_date: Option<String>,
    selected_time: Option<String>,
}

impl BookingWizard {
    /// Start a wizard on the calendar step.
    ///
    /// The timezone should already be normalized by the caller.
    pub fn new(timezone: String) -> Self {
        Self {
            step: WizardStep::Calendar,
            timezone,
            selected_date: None,
            selected_time: None,
        }
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Selected date, once the calendar step is done.
    pub fn selected_date(&self) -> Option<&str> {
        self.selected_date.as_deref()
    }

    /// Selected time, once the calendar step is done.
    pub fn selected_time(&self) -> Option<&str> {
        self.selected_time.as_deref()
    }

    /// Timezone the wizard books in.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Pick a date and time, moving from the calendar to the form step.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed date or time, and a
    /// scheduling error when called outside the calendar step.
    pub fn select_slot(&mut self, date: &str, time: &str) -> Result<()> {
        if self.step != WizardStep::Calendar {
            return Err(
                LevrokError::Scheduling("a slot has already been selected".to_string()).into(),
            );
        }
        validate_date(date)?;
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| LevrokError::Validation(format!("Invalid time '{}'", time)))?;

        self.selected_date = Some(date.to_string());
        self.selected_time = Some(time.to_string());
        self.step = WizardStep::Form;
        Ok(())
    }

    /// Combine the selected slot with attendee details into a validated
    /// booking request. Stays on the form step; the driver advances with
    /// [`confirm`](Self::confirm) after the booking endpoint accepts.
    ///
    /// # Errors
    ///
    /// Returns a scheduling error outside the form step, and a validation
    /// error when the combined request is invalid.
    pub fn submit_details(&mut self, details: AttendeeDetails) -> Result<BookingRequest> {
        if self.step != WizardStep::Form {
            return Err(
                LevrokError::Scheduling("select a date and time first".to_string()).into(),
            );
        }

        // The slot fields are present on the form step by construction.
        let request = BookingRequest {
            selected_date: self.selected_date.clone().unwrap_or_default(),
            selected_time: self.selected_time.clone().unwrap_or_default(),
            timezone: self.timezone.clone(),
            name: details.name,
            email: details.email,
            company_name: details.company_name,
            company_niche: details.company_niche,
        };
        request.validate()?;
        Ok(request)
    }

    /// Mark the booking as confirmed, moving to the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns a scheduling error outside the form step.
    pub fn confirm(&mut self) -> Result<()> {
        if self.step != WizardStep::Form {
            return Err(LevrokError::Scheduling(
                "nothing to confirm on this step".to_string(),
            )
            .into());
        }
        self.step = WizardStep::Confirmation;
        Ok(())
    }

    /// Step back: confirmation returns to the form, the form returns to
    /// the calendar (clearing the selected slot).
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::Confirmation => WizardStep::Form,
            WizardStep::Form => {
                self.selected_date = None;
                self.selected_time = None;
                WizardStep::Calendar
            }
            WizardStep::Calendar => WizardStep::Calendar,
        };
    }

    /// Human-readable summary of the selected slot, for the form step.
    pub fn slot_summary(&self) -> Option<String> {
        let date = self.selected_date.as_deref()?;
        let time = self.selected_time.as_deref()?;
        let display = timezone::format_time_12h(time, &self.timezone).ok()?;
        Some(format!("{} at {}", date, display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> AttendeeDetails {
        AttendeeDetails {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company_name: "Analytical Engines".to_string(),
            company_niche: "Computing".to_string(),
        }
    }

    #[test]
    fn test_happy_path_walks_all_three_steps() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        assert_eq!(wizard.step(), WizardStep::Calendar);

        wizard.select_slot("2026-03-02", "11:30").unwrap();
        assert_eq!(wizard.step(), WizardStep::Form);

        let request = wizard.submit_details(details()).unwrap();
        assert_eq!(request.selected_date, "2026-03-02");
        assert_eq!(request.selected_time, "11:30");
        assert_eq!(request.timezone, "America/New_York");

        wizard.confirm().unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirmation);
    }

    #[test]
    fn test_cannot_submit_details_before_slot() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        assert!(wizard.submit_details(details()).is_err());
    }

    #[test]
    fn test_cannot_confirm_from_calendar() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        assert!(wizard.confirm().is_err());
    }

    #[test]
    fn test_cannot_reselect_slot_on_form_step() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        wizard.select_slot("2026-03-02", "11:30").unwrap();
        assert!(wizard.select_slot("2026-03-03", "12:00").is_err());
    }

    #[test]
    fn test_select_slot_rejects_bad_input() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        assert!(wizard.select_slot("soon", "11:30").is_err());
        assert!(wizard.select_slot("2026-03-02", "late morning").is_err());
        assert_eq!(wizard.step(), WizardStep::Calendar);
    }

    #[test]
    fn test_invalid_details_keep_form_step() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        wizard.select_slot("2026-03-02", "11:30").unwrap();

        let mut bad = details();
        bad.email = "nope".to_string();
        assert!(wizard.submit_details(bad).is_err());
        assert_eq!(wizard.step(), WizardStep::Form);

        // A corrected submission still works.
        assert!(wizard.submit_details(details()).is_ok());
    }

    #[test]
    fn test_back_clears_slot_from_form() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        wizard.select_slot("2026-03-02", "11:30").unwrap();
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Calendar);
        assert!(wizard.selected_date().is_none());
        assert!(wizard.selected_time().is_none());
    }

    #[test]
    fn test_back_from_confirmation_returns_to_form() {
        let mut wizard = BookingWizard::new("America/New_York".to_string());
        wizard.select_slot("2026-03-02", "11:30").unwrap();
        wizard.submit_details(details()).unwrap();
        wizard.confirm().unwrap();

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Form);
        assert_eq!(wizard.selected_date(), Some("2026-03-02"));
    }

    #[test]
    fn test_slot_summary_formats_selection() {
        let mut wizard = BookingWizard::new("America/Chicago".to_string());
        assert!(wizard.slot_summary().is_none());

        wizard.select_slot("2026-03-02", "13:30").unwrap();
        assert_eq!(
            wizard.slot_summary().unwrap(),
            "2026-03-02 at 1:30 PM CST"
        );
    }
}
