//! Coverage (sampling) uncertainty from lookup tables.
//!
//! A 5° cell observed by `n` pixels gets `s0 * (1 - (n / 77500)^p)`, with the
//! magnitude `s0` and exponent `p` taken from LUT1 at the cell. A 90° cell
//! built from `n` non-empty 5° cells in calendar month `m` gets
//! `s / sqrt(n)`, with `s` taken from LUT2.

use regavg_grid::{MASK_HEIGHT, MASK_WIDTH};

use crate::error::AggregateError;

/// Pixel count at which a 5° cell counts as fully sampled.
pub const FULL_SAMPLE_COUNT: f64 = 77500.0;

const LUT1_LEN: usize = MASK_WIDTH * MASK_HEIGHT;

/// Per 5° cell magnitude and exponent, row-major from the north.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut1 {
    magnitude: Vec<f64>,
    exponent: Vec<f64>,
}

impl Lut1 {
    /// # Errors
    ///
    /// Returns [`AggregateError::InvalidLut`] unless both tables hold
    /// 72 x 36 values.
    pub fn new(magnitude: Vec<f64>, exponent: Vec<f64>) -> Result<Self, AggregateError> {
        for (what, table) in [("magnitude", &magnitude), ("exponent", &exponent)] {
            if table.len() != LUT1_LEN {
                return Err(AggregateError::InvalidLut {
                    name: "LUT1",
                    reason: format!(
                        "{what} has {} values, expected {MASK_WIDTH} x {MASK_HEIGHT}",
                        table.len()
                    ),
                });
            }
        }
        Ok(Self {
            magnitude,
            exponent,
        })
    }

    /// Same magnitude and exponent everywhere.
    pub fn uniform(magnitude: f64, exponent: f64) -> Self {
        Self {
            magnitude: vec![magnitude; LUT1_LEN],
            exponent: vec![exponent; LUT1_LEN],
        }
    }

    pub fn magnitude(&self, x: usize, y: usize) -> f64 {
        self.magnitude[y * MASK_WIDTH + x]
    }

    pub fn exponent(&self, x: usize, y: usize) -> f64 {
        self.exponent[y * MASK_WIDTH + x]
    }
}

/// Per month weights of the eight 90° cells, indexed `[month0][y * 4 + x]`
/// with `y = 0` the northern row.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut2 {
    weights: [[f64; 8]; 12],
}

impl Lut2 {
    pub fn new(weights: [[f64; 8]; 12]) -> Self {
        Self { weights }
    }

    pub fn uniform(weight: f64) -> Self {
        Self {
            weights: [[weight; 8]; 12],
        }
    }

    pub fn weight(&self, month0: u32, x: usize, y: usize) -> f64 {
        self.weights[month0 as usize % 12][y * 4 + x]
    }

    pub fn weights(&self) -> &[[f64; 8]; 12] {
        &self.weights
    }
}

/// Lookup-table backed coverage uncertainty provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageUncertainty {
    lut1: Lut1,
    lut2: Lut2,
}

impl CoverageUncertainty {
    pub fn new(lut1: Lut1, lut2: Lut2) -> Self {
        Self { lut1, lut2 }
    }

    /// Uncertainty of 5° cell `(x, y)` observed by `n` pixels; NaN for `n == 0`.
    pub fn cell5(&self, x: usize, y: usize, n: u64) -> f64 {
        if n == 0 {
            return f64::NAN;
        }
        let s0 = self.lut1.magnitude(x, y);
        let p = self.lut1.exponent(x, y);
        s0 * (1.0 - (n as f64 / FULL_SAMPLE_COUNT).powf(p))
    }

    /// Uncertainty of 90° cell `(x, y)` built from `n` 5° cells in calendar
    /// month `month0`; NaN for `n == 0`.
    pub fn cell90(&self, month0: u32, x: usize, y: usize, n: u64) -> f64 {
        if n == 0 {
            return f64::NAN;
        }
        self.lut2.weight(month0, x, y) / (n as f64).sqrt()
    }
}
