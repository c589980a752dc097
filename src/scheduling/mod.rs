//! Scheduling subsystem: availability lookups, booking, and the wizard.

pub mod availability;
pub mod booking;
pub mod cache;
pub mod timezone;
pub mod wizard;

pub use availability::{AvailabilityClient, AVAILABILITY_ROUTE};
pub use booking::{BookingClient, BookingConfirmation, BookingRequest, BOOKING_ROUTE};
pub use cache::{AvailabilityCache, Clock, SlotKey, SystemClock};
pub use wizard::{AttendeeDetails, BookingWizard, WizardStep};
