//! Typed validation errors for products, features and the wizard steps.
//!
//! Transport and terminal failures go through `anyhow`; these are the
//! errors a user can fix by editing a form, so their `Display` text is
//! what the form shows inline.

use chrono::NaiveDate;

/// A write DTO or form step failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is not a valid date (use YYYY-MM-DD)")]
    InvalidDate { field: &'static str },

    #[error("Both dates are required to schedule a feature")]
    PartialSchedule,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Progress must be a whole number between 0 and 100")]
    InvalidProgress,
}
