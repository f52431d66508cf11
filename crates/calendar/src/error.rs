//! Error types for the regavg-calendar crate.

use chrono::NaiveDate;

/// Error type for all fallible operations in the regavg-calendar crate.
///
/// Covers unsupported temporal resolutions, malformed date strings,
/// empty or inverted date ranges and day-of-year values outside the
/// climatology calendar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a temporal resolution name is not one of the supported ones.
    #[error("unsupported temporal resolution: '{name}' (expected daily, monthly, seasonal or annual)")]
    UnsupportedResolution {
        /// The name that was provided.
        name: String,
    },

    /// Returned for a day that has no field in a daily climatology.
    #[error("day of year {doy} is outside the climatology calendar (1..=365)")]
    InvalidDoy {
        doy: u16,
    },

    /// Returned when a date string cannot be parsed.
    #[error("invalid date '{input}': {reason}")]
    InvalidDate {
        /// The text that failed to parse.
        input: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// Returned when the end of a date range is not after its start.
    #[error("invalid date range: end {end} must be after start {start}")]
    InvalidRange {
        /// Inclusive start of the range.
        start: NaiveDate,
        /// Exclusive end of the range.
        end: NaiveDate,
    },

    /// Returned when date arithmetic leaves the representable range.
    #[error("date overflow stepping from {date}")]
    Overflow {
        /// The date that could not be advanced.
        date: NaiveDate,
    },
}
