//! Time encodings used by SST products and the output files.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::CalendarError;

/// Reference epoch of the GHRSST time axes: 1981-01-01T00:00:00Z.
pub fn epoch_1981() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1981, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Seconds from the 1981 epoch to midnight of `date`.
pub fn seconds_since_1981(date: NaiveDate) -> i64 {
    (date.and_time(chrono::NaiveTime::MIN) - epoch_1981()).num_seconds()
}

/// Date-time `seconds` after the 1981 epoch, rounded to whole seconds.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] for non-finite or out of range
/// values.
pub fn datetime_from_seconds_since_1981(seconds: f64) -> Result<NaiveDateTime, CalendarError> {
    let invalid = || CalendarError::InvalidDate {
        input: seconds.to_string(),
        reason: "not a representable number of seconds since 1981-01-01".to_string(),
    };
    if !seconds.is_finite() {
        return Err(invalid());
    }
    let delta = TimeDelta::try_seconds(seconds.round() as i64).ok_or_else(invalid)?;
    epoch_1981().checked_add_signed(delta).ok_or_else(invalid)
}

/// Parses an ISO date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| CalendarError::InvalidDate {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a compact date (`yyyyMMdd`) as used in product file names.
pub fn parse_compact_date(s: &str) -> Result<NaiveDate, CalendarError> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidDate {
            input: s.to_string(),
            reason: "expected 8 digits (yyyyMMdd)".to_string(),
        });
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| CalendarError::InvalidDate {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a date as `yyyyMMdd`.
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seconds_at_epoch_and_after() {
        assert_eq!(seconds_since_1981(date(1981, 1, 1)), 0);
        assert_eq!(seconds_since_1981(date(1981, 1, 2)), 86_400);
        assert_eq!(seconds_since_1981(date(1980, 12, 31)), -86_400);
    }

    #[test]
    fn seconds_roundtrip_rounds() {
        let secs = seconds_since_1981(date(2003, 7, 15)) as f64;
        let dt = datetime_from_seconds_since_1981(secs + 0.4).unwrap();
        assert_eq!(dt.date(), date(2003, 7, 15));
        assert_eq!(dt.and_utc().timestamp() - epoch_1981().and_utc().timestamp(), secs as i64);
    }

    #[test]
    fn seconds_reject_nan() {
        assert!(datetime_from_seconds_since_1981(f64::NAN).is_err());
    }

    #[test]
    fn parse_dates() {
        assert_eq!(parse_date("2003-02-28").unwrap(), date(2003, 2, 28));
        assert!(parse_date("2003-02-29").is_err());
        assert_eq!(parse_compact_date("20100701").unwrap(), date(2010, 7, 1));
        assert!(parse_compact_date("A2010070").is_err());
        assert!(parse_compact_date("2010070").is_err());
        assert_eq!(compact_date(date(1995, 7, 31)), "19950731");
    }
}
