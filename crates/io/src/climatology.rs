//! Loading of the daily OSTIA-style SST climatology.
//!
//! A climatology directory holds either 365 files `D001*.nc` … `D365*.nc`,
//! one per day of the year, or a single `D*.nc` file used for every day.
//! Each file carries `analysed_sst` and a `mask` whose bit `0x01` flags sea.

use std::path::{Path, PathBuf};

use regavg_aggregate::{AggregateError, Climatology, ClimatologySource};
use regavg_grid::{ArrayGrid, Grid, GridDef};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read::{GridReader, open_file, require_variable};

const DAYS: usize = 365;
const SST_VAR: &[&str] = &["analysed_sst"];
const MASK_VAR: &[&str] = &["mask"];
const SEA_BIT: i32 = 0x01;

/// Daily climatology files read lazily from disk.
#[derive(Debug, Clone)]
pub struct NetcdfClimatology {
    files: Vec<PathBuf>,
    def: GridDef,
}

impl NetcdfClimatology {
    /// Indexes the climatology files of `dir` and checks the grid of the
    /// first one.
    pub fn scan(dir: &Path) -> Result<Self, IoError> {
        if !dir.is_dir() {
            return Err(IoError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }
        let invalid = |reason: String| IoError::InvalidClimatology {
            dir: dir.to_path_buf(),
            reason,
        };

        let entries = std::fs::read_dir(dir).map_err(|e| IoError::Io {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut named: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?.to_string();
                (name.starts_with('D') && name.ends_with(".nc")).then_some((name, p))
            })
            .collect();
        named.sort();

        let files = match named.len() {
            0 => return Err(invalid("no D*.nc files".to_string())),
            1 => named.into_iter().map(|(_, p)| p).collect(),
            DAYS => {
                let mut files: Vec<Option<PathBuf>> = vec![None; DAYS];
                for (name, path) in named {
                    let day = name
                        .get(1..4)
                        .and_then(|d| d.parse::<usize>().ok())
                        .filter(|d| (1..=DAYS).contains(d))
                        .ok_or_else(|| invalid(format!("'{name}' does not start with D001..D365")))?;
                    if files[day - 1].replace(path).is_some() {
                        return Err(invalid(format!("more than one file for day {day:03}")));
                    }
                }
                files.into_iter().flatten().collect()
            }
            n => {
                let present: Vec<&str> = named
                    .iter()
                    .filter_map(|(name, _)| name.get(..4))
                    .collect();
                let missing: Vec<String> = (1..=DAYS)
                    .map(|d| format!("D{d:03}"))
                    .filter(|d| !present.contains(&d.as_str()))
                    .collect();
                return Err(invalid(format!(
                    "expected {DAYS} daily files, but found {n}; missing {}",
                    missing.join(", ")
                )));
            }
        };

        let def = native_grid(&files[0])?;
        info!(
            dir = %dir.display(),
            n_files = files.len(),
            resolution = def.resolution(),
            "climatology indexed"
        );
        Ok(Self { files, def })
    }

    pub fn grid_def(&self) -> &GridDef {
        &self.def
    }

    /// Sea fraction (0 or 1) from the `mask` of the first file.
    pub fn read_sea_mask(&self) -> Result<ArrayGrid, IoError> {
        let path = &self.files[0];
        let file = open_file(path)?;
        let mask = GridReader::new(&file, path, self.def, true).read(MASK_VAR, 0)?;
        Ok(ArrayGrid::from_fn(self.def, |x, y| {
            let v = mask.sample_f64(x, y);
            if !v.is_nan() && (v as i32) & SEA_BIT != 0 {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn read_day(&self, day: usize) -> Result<ArrayGrid, IoError> {
        let path = self.files.get(day).ok_or_else(|| IoError::InvalidClimatology {
            dir: self.files[0].parent().map(Path::to_path_buf).unwrap_or_default(),
            reason: format!("no file for day index {day}"),
        })?;
        debug!(path = %path.display(), "reading climatological SST");
        let file = open_file(path)?;
        GridReader::new(&file, path, self.def, true).read(SST_VAR, 0)
    }
}

impl ClimatologySource for NetcdfClimatology {
    fn days(&self) -> usize {
        self.files.len()
    }

    fn read_sst(&self, day: usize) -> Result<ArrayGrid, AggregateError> {
        self.read_day(day)
            .map_err(|e| AggregateError::InvalidClimatology {
                reason: e.to_string(),
            })
    }
}

/// Indexes `dir`, reads the sea mask and builds the [`Climatology`].
///
/// # Errors
///
/// Returns [`IoError::InvalidClimatology`] when the directory holds neither
/// one nor 365 `D*.nc` files, and the NetCDF errors of the first file.
pub fn read_climatology(dir: &Path) -> Result<Climatology, IoError> {
    let source = NetcdfClimatology::scan(dir)?;
    let sea = source.read_sea_mask()?;
    Ok(Climatology::new(source, sea)?)
}

fn native_grid(path: &Path) -> Result<GridDef, IoError> {
    let file = open_file(path)?;
    let var = require_variable(&file, SST_VAR, path)?;
    let width = var
        .dimensions()
        .last()
        .map(|d| d.len())
        .unwrap_or_default();
    Ok(GridDef::global_with_size(width))
}
