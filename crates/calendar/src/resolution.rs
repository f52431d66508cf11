//! Temporal resolution of the output time series.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Length of one output time step.
///
/// `Daily` and `Monthly` windows are aggregated directly from source files;
/// `Seasonal` and `Annual` windows are folded from their monthly results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalResolution {
    Daily,
    Monthly,
    Seasonal,
    Annual,
}

impl TemporalResolution {
    /// Number of calendar months per window, `None` for daily windows.
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Daily => None,
            Self::Monthly => Some(1),
            Self::Seasonal => Some(3),
            Self::Annual => Some(12),
        }
    }

    /// Whether windows are folded from monthly sub-windows.
    pub fn is_multi_month(self) -> bool {
        matches!(self, Self::Seasonal | Self::Annual)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Seasonal => "seasonal",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for TemporalResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalResolution {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "seasonal" => Ok(Self::Seasonal),
            "annual" => Ok(Self::Annual),
            _ => Err(CalendarError::UnsupportedResolution {
                name: s.to_string(),
            }),
        }
    }
}
