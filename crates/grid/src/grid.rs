//! Sample accessors over a [`GridDef`].

use crate::def::GridDef;
use crate::error::GridError;

/// Read-only sampler over a grid definition.
///
/// Callers must stay within `0..width` and `0..height`; implementations
/// may panic on out-of-range indices like slice indexing does.
pub trait Grid: Send + Sync {
    fn grid_def(&self) -> &GridDef;

    fn sample_f64(&self, x: usize, y: usize) -> f64;

    /// `true` for any non-zero, non-NaN sample.
    fn sample_bool(&self, x: usize, y: usize) -> bool {
        let v = self.sample_f64(x, y);
        v != 0.0 && !v.is_nan()
    }

    /// Sample truncated to an integer; NaN yields `i32::MIN`.
    fn sample_i32(&self, x: usize, y: usize) -> i32 {
        let v = self.sample_f64(x, y);
        if v.is_nan() { i32::MIN } else { v as i32 }
    }
}

/// In-memory grid backed by a row-major `Vec<f64>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayGrid {
    def: GridDef,
    data: Vec<f64>,
}

impl ArrayGrid {
    /// Wraps `data` laid out row by row from the north.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DataLength`] if `data.len()` differs from the
    /// number of cells in `def`.
    pub fn new(def: GridDef, data: Vec<f64>) -> Result<Self, GridError> {
        if data.len() != def.len() {
            return Err(GridError::DataLength {
                expected: def.len(),
                got: data.len(),
            });
        }
        Ok(Self { def, data })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(def: GridDef, value: f64) -> Self {
        Self {
            data: vec![value; def.len()],
            def,
        }
    }

    pub fn from_fn(def: GridDef, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(def.len());
        for y in 0..def.height() {
            for x in 0..def.width() {
                data.push(f(x, y));
            }
        }
        Self { def, data }
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let i = self.def.index(x, y);
        self.data[i] = value;
    }

    /// Mirrors the rows, turning a south-up layout into north-up.
    pub fn flip_y(mut self) -> Self {
        let w = self.def.width();
        let h = self.def.height();
        for y in 0..h / 2 {
            let (top, bottom) = self.data.split_at_mut((h - 1 - y) * w);
            top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
        self
    }
}

impl Grid for ArrayGrid {
    fn grid_def(&self) -> &GridDef {
        &self.def
    }

    fn sample_f64(&self, x: usize, y: usize) -> f64 {
        self.data[self.def.index(x, y)]
    }
}

/// Block-averages `grid` onto `target`, ignoring NaN samples.
///
/// A block whose samples are all NaN becomes NaN. Used to scale the
/// climatology and the sea-coverage fraction from the native pixel
/// resolution down to each aggregation tier.
///
/// # Errors
///
/// Returns [`GridError::IncompatibleGrids`] if `target` is not an exact
/// integer coarsening of the grid.
pub fn downscale(grid: &dyn Grid, target: &GridDef) -> Result<ArrayGrid, GridError> {
    let source = grid.grid_def();
    let factor = source.scale_to(target)?;
    if factor == 1 {
        return Ok(ArrayGrid::from_fn(*source, |x, y| grid.sample_f64(x, y)));
    }
    let def = source.coarsened(factor);
    let mut sums = vec![0.0; def.len()];
    let mut counts = vec![0u32; def.len()];
    for y in 0..source.height() {
        let row = (y / factor) * def.width();
        for x in 0..source.width() {
            let v = grid.sample_f64(x, y);
            if !v.is_nan() {
                let i = row + x / factor;
                sums[i] += v;
                counts[i] += 1;
            }
        }
    }
    let data = sums
        .into_iter()
        .zip(counts)
        .map(|(s, n)| if n == 0 { f64::NAN } else { s / n as f64 })
        .collect();
    ArrayGrid::new(def, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tiny(width: usize) -> GridDef {
        GridDef::global_with_size(width)
    }

    #[test]
    fn new_checks_length() {
        let err = ArrayGrid::new(tiny(4), vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            GridError::DataLength {
                expected: 8,
                got: 3
            }
        );
    }

    #[test]
    fn samples_and_flags() {
        let g = ArrayGrid::new(tiny(4), vec![0.0, 1.0, f64::NAN, 5.7, 0.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert!(!g.sample_bool(0, 0));
        assert!(g.sample_bool(1, 0));
        assert!(!g.sample_bool(2, 0));
        assert_eq!(g.sample_i32(3, 0), 5);
        assert_eq!(g.sample_i32(2, 0), i32::MIN);
    }

    #[test]
    fn flip_y_reverses_rows() {
        let g = ArrayGrid::from_fn(tiny(4), |x, y| (y * 10 + x) as f64).flip_y();
        assert_eq!(g.sample_f64(0, 0), 10.0);
        assert_eq!(g.sample_f64(3, 1), 3.0);
    }

    #[test]
    fn flip_y_odd_height() {
        let def = GridDef::global(60.0).unwrap();
        let g = ArrayGrid::from_fn(def, |_, y| y as f64).flip_y();
        assert_eq!(g.sample_f64(0, 0), 2.0);
        assert_eq!(g.sample_f64(0, 1), 1.0);
        assert_eq!(g.sample_f64(0, 2), 0.0);
    }

    #[test]
    fn downscale_averages_blocks_ignoring_nan() {
        let fine = GridDef::global(45.0).unwrap();
        let coarse = GridDef::global(90.0).unwrap();
        let g = ArrayGrid::from_fn(fine, |x, y| {
            if (x, y) == (1, 1) { f64::NAN } else { (x + y) as f64 }
        });
        let d = downscale(&g, &coarse).unwrap();
        assert_eq!(d.grid_def(), &coarse);
        // block (0,0): 0, 1, 1, NaN
        assert_relative_eq!(d.sample_f64(0, 0), 2.0 / 3.0);
        // block (1,0): 2, 3, 3, 4
        assert_relative_eq!(d.sample_f64(1, 0), 3.0);
    }

    #[test]
    fn downscale_all_nan_block() {
        let fine = GridDef::global(45.0).unwrap();
        let g = ArrayGrid::filled(fine, f64::NAN);
        let d = downscale(&g, &GridDef::global(90.0).unwrap()).unwrap();
        assert!(d.sample_f64(0, 0).is_nan());
    }

    #[test]
    fn downscale_rejects_incompatible() {
        let g = ArrayGrid::filled(GridDef::global(0.1).unwrap(), 1.0);
        assert!(downscale(&g, &GridDef::global(0.25).unwrap()).is_err());
    }
}
