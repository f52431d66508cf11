//! Source files as seen by the aggregator.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regavg_grid::{ArrayGrid, Grid, GridDef};

use crate::quantity::Quantity;

/// Pixel quality filter: only pixels whose quality grid equals `required`
/// are used.
#[derive(Debug, Clone)]
pub struct QualityFilter {
    pub grid: ArrayGrid,
    pub required: i32,
}

/// Owned pixel grids of one product file, north-up.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub date: NaiveDate,
    pub sst: ArrayGrid,
    pub quality: Option<QualityFilter>,
    /// Reject pixels whose SST is not strictly positive.
    pub require_positive_sst: bool,
    /// Grids of the non-derived quantities present in the file.
    pub quantities: Vec<(Quantity, ArrayGrid)>,
}

impl SourceFile {
    pub fn new(date: NaiveDate, sst: ArrayGrid) -> Self {
        Self {
            date,
            sst,
            quality: None,
            require_positive_sst: false,
            quantities: Vec::new(),
        }
    }

    pub fn with_quality(mut self, grid: ArrayGrid, required: i32) -> Self {
        self.quality = Some(QualityFilter { grid, required });
        self
    }

    pub fn with_positive_sst(mut self) -> Self {
        self.require_positive_sst = true;
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity, grid: ArrayGrid) -> Self {
        self.quantities.push((quantity, grid));
        self
    }

    pub fn grid_def(&self) -> &GridDef {
        self.sst.grid_def()
    }

    pub fn quantity(&self, q: Quantity) -> Option<&ArrayGrid> {
        self.quantities
            .iter()
            .find_map(|(p, g)| (*p == q).then_some(g))
    }
}

/// Supplies the product files of a date range and reads them.
pub trait SourceProvider: Sync {
    type Error: Display;

    /// Files dated in `[start, end)`, in date order.
    fn files(&self, start: NaiveDate, end: NaiveDate) -> Vec<PathBuf>;

    fn read(&self, path: &Path) -> Result<SourceFile, Self::Error>;
}
