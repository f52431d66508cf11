//! Half-open aggregation windows and their stepping rules.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::CalendarError;
use crate::resolution::TemporalResolution;

/// A half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidRange`] unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if end <= start {
            return Err(CalendarError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Zero-based calendar month (0 = January) of the window start.
    pub fn month0(&self) -> u32 {
        self.start.month0()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Number of days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The calendar-month windows starting at each month step inside this
    /// window.
    pub fn monthly_windows(&self) -> Result<Vec<TimeWindow>, CalendarError> {
        let mut windows = Vec::new();
        let mut d1 = self.start;
        while d1 < self.end {
            let d2 = add_months(d1, 1)?;
            windows.push(TimeWindow { start: d1, end: d2 });
            d1 = d2;
        }
        Ok(windows)
    }
}

/// Start of the window following the one that starts at `date`.
///
/// # Errors
///
/// Returns [`CalendarError::Overflow`] if the result is not representable.
pub fn advance(date: NaiveDate, resolution: TemporalResolution) -> Result<NaiveDate, CalendarError> {
    match resolution.months() {
        None => date
            .checked_add_days(Days::new(1))
            .ok_or(CalendarError::Overflow { date }),
        Some(n) => add_months(date, n),
    }
}

/// Consecutive windows from `start` while the window start is before `end`.
///
/// The last window is not clipped to `end`, so an annual run from
/// 2003-01-01 to 2003-06-01 still yields one full year.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidRange`] if `end <= start`.
pub fn time_windows(
    start: NaiveDate,
    end: NaiveDate,
    resolution: TemporalResolution,
) -> Result<Vec<TimeWindow>, CalendarError> {
    if end <= start {
        return Err(CalendarError::InvalidRange { start, end });
    }
    let mut windows = Vec::new();
    let mut d1 = start;
    while d1 < end {
        let d2 = advance(d1, resolution)?;
        windows.push(TimeWindow { start: d1, end: d2 });
        d1 = d2;
    }
    Ok(windows)
}

fn add_months(date: NaiveDate, n: u32) -> Result<NaiveDate, CalendarError> {
    date.checked_add_months(Months::new(n))
        .ok_or(CalendarError::Overflow { date })
}
