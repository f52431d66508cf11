//! # regavg-calendar
//!
//! Date arithmetic for regional averaging: output temporal resolutions,
//! half-open aggregation windows, the 365-day climatology day-of-year and
//! the seconds-since-1981 encoding of GHRSST time axes.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["&str"] -->|"parse()"| B["TemporalResolution"]
//!     B -->|"time_windows(start, end)"| C["Vec of TimeWindow"]
//!     C -->|".monthly_windows()"| D["monthly TimeWindows"]
//!     E["NaiveDate"] -->|"Doy::from_date()"| F["Doy (1..=365)"]
//!     E -->|"seconds_since_1981()"| G["i64 seconds"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use regavg_calendar::{TemporalResolution, time_windows};
//!
//! let start = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2004, 1, 1).unwrap();
//! let seasons = time_windows(start, end, TemporalResolution::Seasonal).unwrap();
//! assert_eq!(seasons.len(), 4);
//! assert_eq!(seasons[1].monthly_windows().unwrap().len(), 3);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `resolution` | Temporal resolution names and window lengths |
//! | `window` | Half-open windows and stepping |
//! | `doy` | Climatology day-of-year newtype |
//! | `epoch` | Seconds since 1981 and date string formats |
//! | `error` | Error types |

mod doy;
mod epoch;
mod error;
mod resolution;
mod window;

pub use doy::Doy;
pub use epoch::{
    compact_date, datetime_from_seconds_since_1981, epoch_1981, parse_compact_date, parse_date,
    seconds_since_1981,
};
pub use error::CalendarError;
pub use resolution::TemporalResolution;
pub use window::{TimeWindow, advance, time_windows};
