//! Sparse cell grids and cross-resolution regridding.

use regavg_grid::{Grid, GridDef};

use crate::cell::{Cell, CellKind, CellResults};
use crate::error::AggregateError;
use crate::quantity::Schema;

/// Dense 2-D array of optional cells over a [`GridDef`], populated lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid<C> {
    def: GridDef,
    cells: Vec<Option<C>>,
}

impl<C> CellGrid<C> {
    pub fn new(def: GridDef) -> Self {
        let mut cells = Vec::with_capacity(def.len());
        cells.resize_with(def.len(), || None);
        Self { def, cells }
    }

    pub fn grid_def(&self) -> &GridDef {
        &self.def
    }

    /// The cell at `(x, y)`; `None` if absent or outside the grid.
    pub fn get_cell(&self, x: usize, y: usize) -> Option<&C> {
        let i = self.slot(x, y)?;
        self.cells[i].as_ref()
    }

    pub fn get_cell_mut(&mut self, x: usize, y: usize) -> Option<&mut C> {
        let i = self.slot(x, y)?;
        self.cells[i].as_mut()
    }

    fn slot(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.def.width() && y < self.def.height()).then(|| self.def.index(x, y))
    }

    /// The cell at `(x, y)`, created with `create` if absent.
    pub fn get_cell_safe(&mut self, x: usize, y: usize, create: impl FnOnce() -> C) -> &mut C {
        let i = self.def.index(x, y);
        self.cells[i].get_or_insert_with(create)
    }

    pub fn insert(&mut self, x: usize, y: usize, cell: C) {
        let i = self.def.index(x, y);
        self.cells[i] = Some(cell);
    }

    /// Number of present cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Present cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &C> + '_ {
        self.cells.iter().flatten()
    }

    pub fn map<D>(&self, f: impl Fn(&C) -> D) -> CellGrid<D> {
        CellGrid {
            def: self.def,
            cells: self.cells.iter().map(|c| c.as_ref().map(&f)).collect(),
        }
    }
}

/// Regrids finalized cells onto a coarser grid of `kind` cells.
///
/// Each non-empty source cell `(x, y)` feeds target cell
/// `(x * tw / sw, y * th / sh)`, weighted by the sea coverage at its own
/// position; `sea_coverage` defines the source grid. Contributions are
/// applied sorted by target and source index, so any ordering of `sources`
/// yields bit-identical targets.
///
/// # Errors
///
/// Returns [`AggregateError::KindMismatch`] if `kind` cannot consume the
/// source cells.
pub fn aggregate_to_coarser<'a>(
    sources: impl IntoIterator<Item = &'a CellResults>,
    sea_coverage: &dyn Grid,
    kind: CellKind,
    schema: &Schema,
    target: GridDef,
) -> Result<CellGrid<Cell>, AggregateError> {
    let mut grid = CellGrid::new(target);
    fold_into_coarser(&mut grid, sources, sea_coverage, kind, schema)?;
    Ok(grid)
}

/// Like [`aggregate_to_coarser`], folding into an existing grid.
pub fn fold_into_coarser<'a>(
    grid: &mut CellGrid<Cell>,
    sources: impl IntoIterator<Item = &'a CellResults>,
    sea_coverage: &dyn Grid,
    kind: CellKind,
    schema: &Schema,
) -> Result<(), AggregateError> {
    let source_def = *sea_coverage.grid_def();
    let target_def = *grid.grid_def();
    let mut contributions: Vec<(usize, usize, &CellResults)> = sources
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(|c| {
            let tx = c.x() * target_def.width() / source_def.width();
            let ty = c.y() * target_def.height() / source_def.height();
            (target_def.index(tx, ty), source_def.index(c.x(), c.y()), c)
        })
        .collect();
    contributions.sort_unstable_by_key(|&(t, s, _)| (t, s));

    for (t, _, child) in contributions {
        let (tx, ty) = (t % target_def.width(), t / target_def.width());
        let weight = sea_coverage.sample_f64(child.x(), child.y());
        grid.get_cell_safe(tx, ty, || Cell::new(kind, tx, ty, schema))
            .accumulate(child, weight)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_population() {
        let mut grid: CellGrid<u32> = CellGrid::new(GridDef::global(90.0).unwrap());
        assert_eq!(grid.cell_count(), 0);
        assert!(grid.get_cell(1, 1).is_none());
        *grid.get_cell_safe(1, 1, || 7) += 1;
        *grid.get_cell_safe(1, 1, || 100) += 1;
        assert_eq!(grid.get_cell(1, 1), Some(&9));
        grid.insert(0, 0, 1);
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), [1, 9]);
        if let Some(c) = grid.get_cell_mut(0, 0) {
            *c = 5;
        }
        assert_eq!(grid.map(|c| c * 2).get_cell(0, 0), Some(&10));
    }

    #[test]
    fn out_of_range_lookups_do_not_wrap() {
        let mut grid: CellGrid<u32> = CellGrid::new(GridDef::global(90.0).unwrap());
        grid.insert(0, 1, 3);
        assert_eq!(grid.get_cell(0, 1), Some(&3));
        assert!(grid.get_cell(4, 0).is_none());
        assert!(grid.get_cell(0, 2).is_none());
        assert!(grid.get_cell_mut(4, 0).is_none());
    }
}
