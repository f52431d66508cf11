//! Day-of-year newtype for the 365-day climatology calendar.

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// Day-of-year in the 365-day climatology calendar (1..=365).
///
/// Daily climatologies carry one field per day of a non-leap year, so the
/// 366th day of a leap year reuses the field of day 365.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Doy(u16);

impl Doy {
    /// # Errors
    ///
    /// [`CalendarError::InvalidDoy`] outside 1..=365; a leap day must go
    /// through [`Doy::from_date`].
    pub fn new(doy: u16) -> Result<Self, CalendarError> {
        match doy {
            1..=365 => Ok(Self(doy)),
            _ => Err(CalendarError::InvalidDoy { doy }),
        }
    }

    /// Day of year of a calendar date, mapping day 366 onto 365.
    pub fn from_date(date: NaiveDate) -> Self {
        Self((date.ordinal() as u16).min(365))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Position of the day's field in a 365-entry climatology.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}
