//! Error types for regavg-io.

use std::path::PathBuf;

/// Failure while reading products, auxiliary data or writing outputs.
///
/// Errors of the grid, calendar and aggregation crates raised while a file
/// is being decoded are carried over as their message.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A product file, auxiliary file or directory is missing.
    #[error("no such file or directory: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The NetCDF library rejected an operation.
    #[error("NetCDF failure: {reason}")]
    Netcdf {
        /// Library message.
        reason: String,
    },

    /// Reading or writing a plain file failed.
    #[error("i/o error on {}: {reason}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        reason: String,
    },

    /// A date or time window could not be built.
    #[error("calendar: {reason}")]
    Calendar { reason: String },

    /// A grid read from a file is inconsistent with its definition.
    #[error("grid: {reason}")]
    Grid { reason: String },

    /// The auxiliary data does not fit the aggregation engine.
    #[error("aggregation: {reason}")]
    Aggregate { reason: String },

    /// None of the accepted names of a variable exists in a file.
    #[error("{}: no variable '{name}'", path.display())]
    MissingVariable {
        /// First accepted name.
        name: String,
        /// File that was searched.
        path: PathBuf,
    },

    /// A variable's shape does not match the expected grid.
    #[error("unexpected size of '{name}': expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension or variable name.
        name: String,
        expected: usize,
        got: usize,
    },

    /// A time coordinate is missing or out of range.
    #[error("bad time coordinate: {reason}")]
    InvalidTime { reason: String },

    /// Returned when a product type name is not in the registry.
    #[error("unknown product type '{name}', expected one of: {known}")]
    UnknownProductType {
        /// Requested name.
        name: String,
        /// Comma-separated registry names.
        known: String,
    },

    /// Returned when a lookup-table file is malformed.
    #[error("{}: line {line}: {reason}", path.display())]
    LutFormat {
        /// Path to the table.
        path: PathBuf,
        /// 1-based line number, 0 when the whole file is at fault.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// Returned when a climatology directory does not hold a usable set of
    /// daily files.
    #[error("invalid climatology in {}: {reason}", dir.display())]
    InvalidClimatology {
        /// Climatology directory.
        dir: PathBuf,
        /// What is wrong with its contents.
        reason: String,
    },

    /// Returned when a file name pattern does not compile.
    #[error("invalid file name pattern '{pattern}': {reason}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Returned when a date cannot be taken from a file name.
    #[error("cannot parse a date from file name '{name}'")]
    InvalidFileName {
        /// File name that was inspected.
        name: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        Self::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<regavg_calendar::CalendarError> for IoError {
    fn from(e: regavg_calendar::CalendarError) -> Self {
        Self::Calendar {
            reason: e.to_string(),
        }
    }
}

impl From<regavg_grid::GridError> for IoError {
    fn from(e: regavg_grid::GridError) -> Self {
        Self::Grid {
            reason: e.to_string(),
        }
    }
}

impl From<regavg_aggregate::AggregateError> for IoError {
    fn from(e: regavg_aggregate::AggregateError) -> Self {
        Self::Aggregate {
            reason: e.to_string(),
        }
    }
}
