//! Time-window orchestration and regional rollup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use rayon::prelude::*;
use regavg_calendar::{Doy, TemporalResolution, TimeWindow, time_windows};
use regavg_grid::{ArrayGrid, Grid, GridDef, RegionMask, RegionMaskList};
use tracing::{debug, info, info_span, warn};

use crate::cell::{Cell, CellKind, CellResults, PixelContext, ResultsEnv, SYNOPTIC_AREA_WEIGHT};
use crate::cell_grid::{CellGrid, aggregate_to_coarser, fold_into_coarser};
use crate::climatology::Climatology;
use crate::coverage::CoverageUncertainty;
use crate::error::AggregateError;
use crate::quantity::Schema;
use crate::source::{SourceFile, SourceProvider};
use crate::synoptic::SynopticUncertainty;

const SYNOPTIC_RESOLUTION: f64 = 1.0;
const CELL_RESOLUTION: f64 = 5.0;
const ROLLUP_RESOLUTION: f64 = 90.0;

/// One output time step: a window and one aggregation per region, in
/// region-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeStep {
    pub window: TimeWindow,
    pub regions: Vec<CellResults>,
}

impl TimeStep {
    pub fn start(&self) -> NaiveDate {
        self.window.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.window.end()
    }
}

/// Regional averaging driver.
///
/// Auxiliary data is borrowed and shared read-only across windows.
///
/// # Example
///
/// ```ignore
/// let aggregator = Aggregator::new(schema, &regions, &climatology, &coverage)
///     .with_cancel_flag(cancel.clone());
/// let steps = aggregator.run(&store, start, end, TemporalResolution::Monthly)?;
/// ```
pub struct Aggregator<'a> {
    schema: Schema,
    regions: &'a RegionMaskList,
    climatology: &'a Climatology,
    coverage: &'a CoverageUncertainty,
    cancel: Option<Arc<AtomicBool>>,
}

/// Grids shared by every region of one window.
struct Tiers {
    cell5: GridDef,
    cell90: GridDef,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        schema: Schema,
        regions: &'a RegionMaskList,
        climatology: &'a Climatology,
        coverage: &'a CoverageUncertainty,
    ) -> Self {
        Self {
            schema,
            regions,
            climatology,
            coverage,
            cancel: None,
        }
    }

    /// Stops the run with [`AggregateError::Cancelled`] once `flag` is set.
    /// The flag is checked before each file read.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Aggregates every window of `resolution` between `start` and `end`.
    ///
    /// Seasonal and annual windows fold the monthly results of their
    /// months in chronological order.
    ///
    /// # Errors
    ///
    /// Returns calendar errors for an empty range, grid errors for source
    /// grids that do not tile the cell grids, and
    /// [`AggregateError::Cancelled`] when cancelled. Unreadable source
    /// files are logged and skipped.
    pub fn run<P: SourceProvider>(
        &self,
        provider: &P,
        start: NaiveDate,
        end: NaiveDate,
        resolution: TemporalResolution,
    ) -> Result<Vec<TimeStep>, AggregateError> {
        let windows = time_windows(start, end, resolution)?;
        let synoptic = self
            .schema
            .has_synoptic_tier()
            .then(|| SynopticUncertainty::new(CELL_RESOLUTION, resolution));
        info!(
            n_windows = windows.len(),
            %resolution,
            n_regions = self.regions.len(),
            synoptic = synoptic.is_some(),
            "starting regional averaging"
        );

        let mut steps = Vec::with_capacity(windows.len());
        for window in windows {
            let regions = if resolution.is_multi_month() {
                let monthly = window
                    .monthly_windows()?
                    .into_iter()
                    .map(|m| self.aggregate_window(provider, m, synoptic.as_ref()))
                    .collect::<Result<Vec<_>, _>>()?;
                self.fold_months(&monthly)?
            } else {
                self.aggregate_window(provider, window, synoptic.as_ref())?
            };
            steps.push(TimeStep { window, regions });
        }
        Ok(steps)
    }

    /// Aggregates the source files of one daily or monthly window into one
    /// `SameMonth` result per region.
    pub fn aggregate_window<P: SourceProvider>(
        &self,
        provider: &P,
        window: TimeWindow,
        synoptic: Option<&SynopticUncertainty>,
    ) -> Result<Vec<CellResults>, AggregateError> {
        let span = info_span!("window", start = %window.start(), end = %window.end());
        let _guard = span.enter();

        let files = provider.files(window.start(), window.end());
        info!(n_files = files.len(), "aggregating time window");

        let tiers = Tiers {
            cell5: GridDef::global(CELL_RESOLUTION)?,
            cell90: GridDef::global(ROLLUP_RESOLUTION)?,
        };
        let mut grid5 = CellGrid::new(tiers.cell5);
        let mut grid1 = match synoptic {
            Some(_) => Some(CellGrid::new(GridDef::global(SYNOPTIC_RESOLUTION)?)),
            None => None,
        };

        for path in &files {
            self.check_cancelled()?;
            let source = match provider.read(path) {
                Ok(source) => source,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable source file");
                    continue;
                }
            };
            debug!(path = %path.display(), date = %source.date, "accumulating source file");
            self.accumulate_source(&source, &tiers, &mut grid5, grid1.as_mut())?;
        }

        let env = ResultsEnv {
            coverage: self.coverage,
            synoptic,
            month0: window.month0(),
        };
        if let Some(grid1) = &grid1 {
            let results1: Vec<CellResults> = grid1.iter().map(|c| c.results(&env)).collect();
            // 1° areas count equally, whatever their sea fraction.
            let area_weights = ArrayGrid::filled(*grid1.grid_def(), SYNOPTIC_AREA_WEIGHT);
            fold_into_coarser(
                &mut grid5,
                &results1,
                &area_weights,
                CellKind::Cell5,
                &self.schema,
            )?;
        }
        let results5 = grid5.map(|c| c.results(&env));

        let seacov5 = self.climatology.sea_coverage(&tiers.cell5)?;
        let seacov90 = self.climatology.sea_coverage(&tiers.cell90)?;
        self.regions
            .masks()
            .par_iter()
            .map(|mask| {
                self.aggregate_region(mask, &results5, &*seacov5, &*seacov90, &tiers, &env)
            })
            .collect()
    }

    fn accumulate_source(
        &self,
        source: &SourceFile,
        tiers: &Tiers,
        grid5: &mut CellGrid<Cell>,
        mut grid1: Option<&mut CellGrid<Cell>>,
    ) -> Result<(), AggregateError> {
        let def = *source.grid_def();
        let clim_sst = self.climatology.sst(Doy::from_date(source.date), &def)?;
        let seacov = self.climatology.sea_coverage(&def)?;
        let ctx = PixelContext::new(source, &*clim_sst, &*seacov);

        for (x5, y5) in self.regions.combined().set_cells() {
            let rect = def.grid_rectangle(&tiers.cell5.lon_lat_rectangle(x5, y5))?;
            grid5
                .get_cell_safe(x5, y5, || Cell::new(CellKind::Cell5, x5, y5, &self.schema))
                .accumulate_pixels(&ctx, rect)?;

            if let Some(grid1) = grid1.as_deref_mut() {
                let def1 = *grid1.grid_def();
                let n = def1.width() / tiers.cell5.width();
                for y1 in y5 * n..(y5 + 1) * n {
                    for x1 in x5 * n..(x5 + 1) * n {
                        let rect = def.grid_rectangle(&def1.lon_lat_rectangle(x1, y1))?;
                        grid1
                            .get_cell_safe(x1, y1, || Cell::new(CellKind::Cell1, x1, y1, &self.schema))
                            .accumulate_pixels(&ctx, rect)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn aggregate_region(
        &self,
        mask: &RegionMask,
        results5: &CellGrid<CellResults>,
        seacov5: &dyn Grid,
        seacov90: &dyn Grid,
        tiers: &Tiers,
        env: &ResultsEnv<'_>,
    ) -> Result<CellResults, AggregateError> {
        let cells = results5.iter().filter(|c| mask.is_set(c.x(), c.y()));
        let mut aggregation = Cell::new(CellKind::SameMonth, 0, 0, &self.schema);
        if mask.coverage().uses_90_degree_rollup() {
            let grid90 =
                aggregate_to_coarser(cells, seacov5, CellKind::Cell90, &self.schema, tiers.cell90)?;
            for cell90 in grid90.iter().filter(|c| !c.is_empty()) {
                let r = cell90.results(env);
                aggregation.accumulate(&r, seacov90.sample_f64(r.x(), r.y()))?;
            }
        } else {
            for cell5 in cells {
                aggregation.accumulate(cell5, seacov5.sample_f64(cell5.x(), cell5.y()))?;
            }
        }
        let results = aggregation.results(env);
        debug!(
            region = mask.name(),
            coverage = %mask.coverage(),
            samples = results.sample_count(),
            "region aggregated"
        );
        Ok(results)
    }

    /// Folds monthly region results into one `MultiMonth` result per region.
    fn fold_months(&self, monthly: &[Vec<CellResults>]) -> Result<Vec<CellResults>, AggregateError> {
        (0..self.regions.len())
            .map(|r| fold_multi_month(monthly.iter().map(|m| &m[r]), &self.schema, self.coverage))
            .collect()
    }

    fn check_cancelled(&self) -> Result<(), AggregateError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(AggregateError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Folds per-region results of consecutive steps into one `MultiMonth`
/// result.
///
/// Each input is weighted by its number of steps, so folding
/// `[a, b, c]` equals folding `[fold([a, b]), c]`.
pub fn fold_multi_month<'r>(
    results: impl IntoIterator<Item = &'r CellResults>,
    schema: &Schema,
    coverage: &CoverageUncertainty,
) -> Result<CellResults, AggregateError> {
    let mut aggregation = Cell::new(CellKind::MultiMonth, 0, 0, schema);
    for r in results {
        aggregation.accumulate(r, 1.0)?;
    }
    Ok(aggregation.results(&ResultsEnv {
        coverage,
        synoptic: None,
        month0: 0,
    }))
}
