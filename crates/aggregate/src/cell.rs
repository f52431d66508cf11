//! Aggregation cells and their finalized results.
//!
//! One [`Cell`] type serves every tier; its [`CellKind`] decides which input
//! it consumes and how it is finalized:
//!
//! | Kind | Input | Weight |
//! |------|-------|--------|
//! | `Cell1` | pixels, synoptic quantities only | 1 |
//! | `Cell5` | pixels, plus `Cell1` results for synoptic quantities | sea coverage, `1/25` per 1° area |
//! | `Cell90` | `Cell5` results | samples x sea coverage |
//! | `SameMonth` | `Cell5` or `Cell90` results | sea coverage |
//! | `MultiMonth` | `SameMonth` or `MultiMonth` results | steps |

use std::fmt;

use regavg_grid::{Grid, GridRect};

use crate::accumulator::{NumberAccumulator, Rule};
use crate::coverage::CoverageUncertainty;
use crate::error::AggregateError;
use crate::quantity::{Quantity, Schema};
use crate::source::SourceFile;
use crate::synoptic::SynopticUncertainty;

/// Weight of one 1° area mean within its 5° cell.
pub const SYNOPTIC_AREA_WEIGHT: f64 = 0.04;

/// Tier of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Cell1,
    Cell5,
    Cell90,
    SameMonth,
    MultiMonth,
}

impl CellKind {
    fn accepts(self, child: CellKind) -> bool {
        matches!(
            (self, child),
            (Self::Cell5, Self::Cell1)
                | (Self::Cell90, Self::Cell5)
                | (Self::SameMonth, Self::Cell5 | Self::Cell90)
                | (Self::MultiMonth, Self::SameMonth | Self::MultiMonth)
        )
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pixel grids of one source file together with the climatology and sea
/// coverage resampled to the file's grid.
pub struct PixelContext<'a> {
    source: &'a SourceFile,
    climatology_sst: &'a dyn Grid,
    sea_coverage: &'a dyn Grid,
}

impl<'a> PixelContext<'a> {
    pub fn new(
        source: &'a SourceFile,
        climatology_sst: &'a dyn Grid,
        sea_coverage: &'a dyn Grid,
    ) -> Self {
        Self {
            source,
            climatology_sst,
            sea_coverage,
        }
    }

    /// Sea-coverage weight of a valid pixel, `None` for pixels to skip.
    fn weight(&self, x: usize, y: usize) -> Option<f64> {
        let coverage = self.sea_coverage.sample_f64(x, y);
        if coverage.is_nan() || coverage <= 0.0 {
            return None;
        }
        let sst = self.source.sst.sample_f64(x, y);
        if !sst.is_finite() || (self.source.require_positive_sst && sst <= 0.0) {
            return None;
        }
        if let Some(q) = &self.source.quality {
            if q.grid.sample_i32(x, y) != q.required {
                return None;
            }
        }
        Some(coverage)
    }
}

enum PixelInput<'a> {
    Sst,
    Anomaly,
    Grid(&'a dyn Grid),
    Skip,
}

/// Everything a cell needs to finalize its results.
#[derive(Clone, Copy)]
pub struct ResultsEnv<'a> {
    pub coverage: &'a CoverageUncertainty,
    pub synoptic: Option<&'a SynopticUncertainty>,
    /// Calendar month (0 = January) of the window start.
    pub month0: u32,
}

/// Accumulator state of one cell over one time window.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    kind: CellKind,
    x: usize,
    y: usize,
    sample_count: u64,
    cell_count: u64,
    steps: u32,
    schema: Schema,
    accs: Vec<NumberAccumulator>,
}

impl Cell {
    pub fn new(kind: CellKind, x: usize, y: usize, schema: &Schema) -> Self {
        let accs = schema
            .quantities()
            .iter()
            .map(|q| match kind {
                CellKind::Cell1 => NumberAccumulator::new(Rule::Mean),
                _ => NumberAccumulator::new(q.rule()),
            })
            .collect();
        Self {
            kind,
            x,
            y,
            sample_count: 0,
            cell_count: 0,
            steps: if kind == CellKind::MultiMonth { 0 } else { 1 },
            schema: schema.clone(),
            accs,
        }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Accumulates the valid pixels of `rect` (clipped to the source grid).
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::PixelInput`] for cells above the pixel tier.
    pub fn accumulate_pixels(
        &mut self,
        ctx: &PixelContext<'_>,
        rect: GridRect,
    ) -> Result<(), AggregateError> {
        if !matches!(self.kind, CellKind::Cell1 | CellKind::Cell5) {
            return Err(AggregateError::PixelInput { kind: self.kind });
        }
        let pixel_tier_only = self.kind == CellKind::Cell1;
        let inputs: Vec<PixelInput<'_>> = self
            .schema
            .quantities()
            .iter()
            .map(|&q| {
                if q.is_synoptic() != pixel_tier_only {
                    return PixelInput::Skip;
                }
                match q {
                    Quantity::Sst => PixelInput::Sst,
                    Quantity::SstAnomaly => PixelInput::Anomaly,
                    Quantity::CoverageUncertainty => PixelInput::Skip,
                    _ => ctx
                        .source
                        .quantity(q)
                        .map_or(PixelInput::Skip, |g| PixelInput::Grid(g)),
                }
            })
            .collect();

        let def = ctx.source.grid_def();
        let rect = rect.clip(def.width(), def.height());
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let Some(w) = ctx.weight(x, y) else {
                    continue;
                };
                let w = if pixel_tier_only { 1.0 } else { w };
                self.sample_count += 1;
                for (acc, input) in self.accs.iter_mut().zip(&inputs) {
                    let value = match input {
                        PixelInput::Sst => ctx.source.sst.sample_f64(x, y),
                        PixelInput::Anomaly => {
                            ctx.source.sst.sample_f64(x, y) - ctx.climatology_sst.sample_f64(x, y)
                        }
                        PixelInput::Grid(g) => g.sample_f64(x, y),
                        PixelInput::Skip => continue,
                    };
                    acc.accumulate(value, w);
                }
            }
        }
        Ok(())
    }

    /// Folds finalized child results into this cell.
    ///
    /// Empty children and children whose effective weight is not positive
    /// are ignored. A `Cell5` takes only the synoptic quantities of its
    /// `Cell1` children and keeps its own pixel sample count.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::KindMismatch`] if this kind does not consume
    /// the child's kind.
    pub fn accumulate(&mut self, child: &CellResults, weight: f64) -> Result<(), AggregateError> {
        if !self.kind.accepts(child.kind) {
            return Err(AggregateError::KindMismatch {
                target: self.kind,
                child: child.kind,
            });
        }
        if child.is_empty() {
            return Ok(());
        }
        let weight = match self.kind {
            CellKind::Cell90 => child.sample_count as f64 * weight,
            CellKind::MultiMonth => f64::from(child.steps) * weight,
            _ => weight,
        };
        if !weight.is_finite() || weight <= 0.0 {
            return Ok(());
        }
        let synoptic_only = self.kind == CellKind::Cell5;
        for (acc, &q) in self.accs.iter_mut().zip(self.schema.quantities()) {
            if synoptic_only && !q.is_synoptic() {
                continue;
            }
            acc.accumulate(child.value(q), weight);
        }
        if synoptic_only {
            return Ok(());
        }
        self.sample_count += child.sample_count;
        self.cell_count += 1;
        if self.kind == CellKind::MultiMonth {
            self.steps += child.steps;
        }
        Ok(())
    }

    /// Finalizes the cell. Every value of an empty cell is NaN.
    pub fn results(&self, env: &ResultsEnv<'_>) -> CellResults {
        let values = if self.is_empty() {
            vec![f64::NAN; self.accs.len()]
        } else {
            self.accs
                .iter()
                .zip(self.schema.quantities())
                .map(|(acc, &q)| self.finalize(q, acc, env))
                .collect()
        };
        CellResults {
            kind: self.kind,
            x: self.x,
            y: self.y,
            sample_count: self.sample_count,
            cell_count: self.cell_count,
            steps: self.steps,
            schema: self.schema.clone(),
            values,
        }
    }

    fn finalize(&self, q: Quantity, acc: &NumberAccumulator, env: &ResultsEnv<'_>) -> f64 {
        match (self.kind, q) {
            (CellKind::Cell5, Quantity::CoverageUncertainty) => {
                env.coverage.cell5(self.x, self.y, self.sample_count)
            }
            (CellKind::Cell90, Quantity::CoverageUncertainty) => {
                let u90 = env
                    .coverage
                    .cell90(env.month0, self.x, self.y, self.cell_count);
                let u5 = acc.combine();
                if u5.is_nan() { u90 } else { u5.hypot(u90) }
            }
            (CellKind::Cell5, q) if q.is_synoptic() => match env.synoptic {
                Some(s) => s.apply(self.y, self.sample_count, acc.combine()),
                None => acc.combine(),
            },
            _ => acc.combine(),
        }
    }
}

/// Finalized, immutable results of a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellResults {
    kind: CellKind,
    x: usize,
    y: usize,
    sample_count: u64,
    cell_count: u64,
    steps: u32,
    schema: Schema,
    values: Vec<f64>,
}

impl CellResults {
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// Number of pixels that contributed.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Number of non-empty child cells folded in.
    pub fn cell_count(&self) -> u64 {
        self.cell_count
    }

    /// Number of monthly steps folded in.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Values in schema order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of `q`, NaN if the schema does not track it.
    pub fn value(&self, q: Quantity) -> f64 {
        self.schema
            .position(q)
            .map_or(f64::NAN, |i| self.values[i])
    }
}
