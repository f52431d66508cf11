//! Reference SST climatology and sea-coverage fractions.

use std::sync::{Arc, Mutex};

use regavg_calendar::Doy;
use regavg_grid::{ArrayGrid, Grid, GridDef, downscale};
use tracing::debug;

use crate::error::AggregateError;

/// Resolutions at which sea coverage is precomputed.
const TIER_RESOLUTIONS: [f64; 3] = [1.0, 5.0, 90.0];

/// Supplies the daily climatological SST fields on demand.
pub trait ClimatologySource: Send + Sync {
    /// Number of daily fields: 365, or 1 for a field used on every day.
    fn days(&self) -> usize;

    /// Field of the 0-based `day`, north-up at the native resolution.
    fn read_sst(&self, day: usize) -> Result<ArrayGrid, AggregateError>;
}

impl ClimatologySource for Vec<ArrayGrid> {
    fn days(&self) -> usize {
        self.len()
    }

    fn read_sst(&self, day: usize) -> Result<ArrayGrid, AggregateError> {
        self.get(day)
            .cloned()
            .ok_or_else(|| AggregateError::InvalidClimatology {
                reason: format!("no SST field for day index {day}"),
            })
    }
}

struct CachedSst {
    day: usize,
    def: GridDef,
    grid: Arc<ArrayGrid>,
}

/// Daily (or constant) SST climatology plus the sea-coverage fraction at
/// the aggregation tiers.
///
/// SST fields are loaded lazily; the most recently requested field is kept,
/// which suits source files processed in date order. Sea coverage is kept
/// at every resolution requested so far.
pub struct Climatology {
    source: Box<dyn ClimatologySource>,
    def: GridDef,
    /// Native sea coverage first, then one entry per resolution.
    sea_tiers: Mutex<Vec<Arc<ArrayGrid>>>,
    cache: Mutex<Option<CachedSst>>,
}

impl Climatology {
    /// # Errors
    ///
    /// Returns [`AggregateError::InvalidClimatology`] if the source has
    /// neither 1 nor 365 fields, and a grid error if the sea coverage cannot
    /// be block-averaged to the 1°, 5° and 90° tiers.
    pub fn new(
        source: impl ClimatologySource + 'static,
        sea_coverage: ArrayGrid,
    ) -> Result<Self, AggregateError> {
        let days = source.days();
        if days != 1 && days != 365 {
            return Err(AggregateError::InvalidClimatology {
                reason: format!("expected 1 or 365 daily SST fields, got {days}"),
            });
        }
        let def = *sea_coverage.grid_def();
        let mut sea_tiers = Vec::with_capacity(TIER_RESOLUTIONS.len() + 1);
        for res in TIER_RESOLUTIONS {
            let target = GridDef::global(res)?;
            if target != def {
                sea_tiers.push(Arc::new(downscale(&sea_coverage, &target)?));
            }
        }
        sea_tiers.insert(0, Arc::new(sea_coverage));
        debug!(resolution = def.resolution(), days, "climatology ready");
        Ok(Self {
            source: Box::new(source),
            def,
            sea_tiers: Mutex::new(sea_tiers),
            cache: Mutex::new(None),
        })
    }

    /// Native grid of the climatology.
    pub fn grid_def(&self) -> &GridDef {
        &self.def
    }

    pub fn days(&self) -> usize {
        self.source.days()
    }

    /// Climatological SST of `doy`, block-averaged to `def`.
    ///
    /// # Errors
    ///
    /// Returns the source's read error, or
    /// [`AggregateError::InvalidClimatology`] if the field does not match the
    /// sea-coverage grid.
    pub fn sst(&self, doy: Doy, def: &GridDef) -> Result<Arc<ArrayGrid>, AggregateError> {
        let day = if self.source.days() == 1 { 0 } else { doy.index() };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(c) = cache.as_ref().filter(|c| c.day == day && c.def == *def) {
            return Ok(Arc::clone(&c.grid));
        }

        let field = self.source.read_sst(day)?;
        if field.grid_def() != self.grid_def() {
            return Err(AggregateError::InvalidClimatology {
                reason: format!(
                    "SST field at {}° does not match the {}° sea coverage",
                    field.grid_def().resolution(),
                    self.grid_def().resolution()
                ),
            });
        }
        let grid = if field.grid_def() == def {
            field
        } else {
            downscale(&field, def)?
        };
        debug!(day, resolution = def.resolution(), "climatology SST loaded");
        let grid = Arc::new(grid);
        *cache = Some(CachedSst {
            day,
            def: *def,
            grid: Arc::clone(&grid),
        });
        Ok(grid)
    }

    /// Sea-coverage fraction at `def`, block-averaged from the native grid
    /// on first request.
    ///
    /// # Errors
    ///
    /// Returns a grid error if `def` is not a coarsening of the native grid.
    pub fn sea_coverage(&self, def: &GridDef) -> Result<Arc<ArrayGrid>, AggregateError> {
        let mut tiers = self.sea_tiers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tier) = tiers.iter().find(|t| t.grid_def() == def) {
            return Ok(Arc::clone(tier));
        }
        let Some(native) = tiers.first() else {
            return Err(AggregateError::InvalidClimatology {
                reason: "no sea coverage loaded".to_string(),
            });
        };
        let tier = Arc::new(downscale(&**native, def)?);
        debug!(resolution = def.resolution(), "sea coverage tier added");
        tiers.push(Arc::clone(&tier));
        Ok(tier)
    }
}
