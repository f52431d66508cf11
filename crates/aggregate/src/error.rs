//! Error types for the regavg-aggregate crate.

use regavg_calendar::CalendarError;
use regavg_grid::GridError;

use crate::cell::CellKind;

/// Error type for all fallible operations in the regavg-aggregate crate.
///
/// Covers grid and calendar failures, malformed auxiliary tables, cells fed
/// with input of the wrong tier and cancelled runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    /// Grid geometry error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Calendar error.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Returned when a cell is fed results of a tier it cannot consume.
    #[error("a {target} cell cannot accumulate {child} results")]
    KindMismatch {
        /// Kind of the receiving cell.
        target: CellKind,
        /// Kind of the offered results.
        child: CellKind,
    },

    /// Returned when pixels are fed to a cell above the pixel tier.
    #[error("a {kind} cell cannot accumulate pixels")]
    PixelInput {
        /// Kind of the receiving cell.
        kind: CellKind,
    },

    /// Returned when a lookup table has the wrong shape or content.
    #[error("invalid lookup table {name}: {reason}")]
    InvalidLut {
        /// Table name.
        name: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when climatology fields are inconsistent.
    #[error("invalid climatology: {reason}")]
    InvalidClimatology {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an SST depth name is not recognised.
    #[error("unknown SST depth '{name}' (expected skin, depth_20 or depth_100)")]
    UnknownSstDepth {
        /// The name that was provided.
        name: String,
    },

    /// Returned when a run was cancelled through its cancellation flag.
    #[error("aggregation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_grid_transparent() {
        let err = AggregateError::from(GridError::InvalidResolution { resolution: 7.0 });
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn error_kind_mismatch() {
        let err = AggregateError::KindMismatch {
            target: CellKind::Cell5,
            child: CellKind::Cell90,
        };
        assert_eq!(err.to_string(), "a Cell5 cell cannot accumulate Cell90 results");
    }

    #[test]
    fn error_pixel_input() {
        let err = AggregateError::PixelInput {
            kind: CellKind::SameMonth,
        };
        assert_eq!(err.to_string(), "a SameMonth cell cannot accumulate pixels");
    }

    #[test]
    fn error_invalid_lut() {
        let err = AggregateError::InvalidLut {
            name: "LUT2",
            reason: "expected 12 months".into(),
        };
        assert_eq!(err.to_string(), "invalid lookup table LUT2: expected 12 months");
    }

    #[test]
    fn error_cancelled() {
        assert_eq!(AggregateError::Cancelled.to_string(), "aggregation cancelled");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<AggregateError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<AggregateError>();
    }
}
