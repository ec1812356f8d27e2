use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from hilal operations.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum HilalError {
    /// The ephemeris could not compute a position or phase event.
    #[error("Ephemeris computation failed: {0}")]
    Ephemeris(String),

    /// No conjunction could be located at or before the reference instant.
    #[error("No conjunction found at or before {reference}")]
    NoConjunction { reference: DateTime<Utc> },

    /// Date outside the range a calendar system supports.
    #[error("Date {date} is out of supported range ({min} to {max})")]
    DateOutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    /// Calendar conversion failure.
    #[error("Hijri conversion failed: {0}")]
    CalendarConversion(String),

    /// Calendar id that has no deterministic implementation.
    #[error("Unsupported calendar system: {0:?}")]
    UnsupportedCalendar(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Invalid observer or criteria values.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Location or sunset instant not available yet.
    #[error("Missing input: {0}")]
    MissingInput(String),
}

impl HilalError {
    /// Creates an `InvalidConfiguration` error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }

    /// Creates an `Ephemeris` error.
    pub fn ephemeris(reason: impl Into<String>) -> Self {
        Self::Ephemeris(reason.into())
    }

    /// Returns true for the errors a caller should treat as "not ready yet"
    /// rather than as a failure.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }
}
