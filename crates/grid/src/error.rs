//! Error types for regavg-grid.

use std::path::PathBuf;

/// Error type for all fallible operations in the regavg-grid crate.
///
/// Covers grid geometry problems (bad resolutions, coordinates outside the
/// globe, incompatible tiers) as well as region mask and region list parse
/// failures. Parse errors carry the region name or the 1-based entry number
/// so that configuration mistakes can be located without a debugger.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when a resolution does not tile the globe exactly.
    #[error("invalid grid resolution: {resolution} degrees does not tile the globe")]
    InvalidResolution {
        /// The offending resolution in degrees.
        resolution: f64,
    },

    /// Returned when a longitude or latitude lies outside the valid range.
    #[error("{axis} {value} is outside the grid")]
    CoordinateOutOfRange {
        /// Either `"longitude"` or `"latitude"`.
        axis: &'static str,
        /// The rejected coordinate value.
        value: f64,
    },

    /// Returned when two grids cannot be related by an integer block factor.
    #[error("incompatible grids: {reason}")]
    IncompatibleGrids {
        /// Description of the mismatch.
        reason: String,
    },

    /// Returned when a data buffer does not match the grid size.
    #[error("grid data length mismatch: expected {expected}, got {got}")]
    DataLength {
        /// Number of cells of the grid definition.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },

    /// Returned when a region mask cannot be built.
    #[error("Region {name}: {reason}")]
    InvalidMask {
        /// Name of the region.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an entry of a region list is malformed.
    #[error("Illegal region entry {index}: {reason}")]
    InvalidRegionEntry {
        /// 1-based position of the entry in the list.
        index: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a region list references a mask file that does not exist.
    #[error("Mask file not found: {}", path.display())]
    MaskFileNotFound {
        /// Path given in the region list.
        path: PathBuf,
    },

    /// Returned when a mask file exists but cannot be read.
    #[error("failed to read mask file {}: {reason}", path.display())]
    MaskFileRead {
        /// Path given in the region list.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        reason: String,
    },
}
