//! Registry of the supported SST product types.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use regavg_aggregate::{Quantity, Schema, SourceFile, SstDepth};
use regavg_calendar::{datetime_from_seconds_since_1981, parse_compact_date};
use regavg_grid::GridDef;

use crate::error::IoError;
use crate::netcdf_read::{GridReader, open_file, read_1d_f64};

/// Quality level a CCI L3 pixel must carry to be used.
const CCI_BEST_QUALITY: i32 = 5;
/// Length of the `ATS_AVG_3PAARC` prefix preceding the date in ARC names.
const ARC_DATE_OFFSET: usize = 14;

/// Supported product types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    ArcL3U,
    CciL3U,
    CciL3C,
    CciL4,
}

impl ProductType {
    /// Every registered product type.
    pub const ALL: [ProductType; 4] = [Self::ArcL3U, Self::CciL3U, Self::CciL3C, Self::CciL4];

    pub fn name(self) -> &'static str {
        match self {
            Self::ArcL3U => "ARC_L3U",
            Self::CciL3U => "CCI_L3U",
            Self::CciL3C => "CCI_L3C",
            Self::CciL4 => "CCI_L4",
        }
    }

    /// Data processing centre named in output files.
    pub fn rdac(self) -> &'static str {
        match self {
            Self::ArcL3U => "ARC",
            _ => "ESACCI",
        }
    }

    pub fn level(self) -> &'static str {
        match self {
            Self::ArcL3U | Self::CciL3U => "L3U",
            Self::CciL3C => "L3C",
            Self::CciL4 => "L4",
        }
    }

    /// Native pixel grid of the product.
    pub fn grid_def(self) -> GridDef {
        match self {
            Self::ArcL3U => GridDef::global_with_size(3600),
            _ => GridDef::global_with_size(7200),
        }
    }

    /// Whether rows are stored from the south when the file has no
    /// latitude axis to tell.
    fn south_up(self) -> bool {
        !matches!(self, Self::ArcL3U)
    }

    /// Pattern a product file name must match in full.
    pub fn filename_regex(self) -> &'static str {
        match self {
            Self::ArcL3U => r"AT[12S]_AVG_3PAARC\d{8}_[DTEM]_[nd][ND][23][bms][.]nc",
            Self::CciL3U | Self::CciL3C => {
                r"\d{14}-ESACCI-L3[CU]_GHRSST-SST((skin)|(subskin)|(depth)|(fnd))-((ATSR1)|(ATSR2)|(AATSR)|(AMSRE)|(AVHRR_MTA)|(SEVIRI_SST)|(TMI))-((LT)|(DM))-v\d{1,2}\.\d{1}-fv\d{1,2}\.\d{1}.nc"
            }
            Self::CciL4 => {
                r"\d{14}-ESACCI-L4_GHRSST-SST[a-z]{3,7}-[A-Z1-2_]{3,10}-[DMLT]{2}-v\d{1,2}\.\d{1}-fv\d{1,2}\.\d{1}.nc"
            }
        }
    }

    /// Quantities aggregated for this product, in output order.
    pub fn schema(self) -> Schema {
        use Quantity::*;
        match self {
            Self::ArcL3U => Schema::new([Sst, SstAnomaly, CoverageUncertainty, ArcUncertainty]),
            Self::CciL3U | Self::CciL3C => Schema::new([
                Sst,
                SstAnomaly,
                CoverageUncertainty,
                UncorrelatedUncertainty,
                LargeScaleCorrelatedUncertainty,
                SynopticallyCorrelatedUncertainty,
                AdjustmentUncertainty,
            ]),
            Self::CciL4 => Schema::new([
                Sst,
                SstAnomaly,
                SeaIceFraction,
                CoverageUncertainty,
                AnalysisError,
            ]),
        }
    }

    /// Date encoded in a product file name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidFileName`] if the name is too short or the
    /// digits at the date position are not a valid `yyyyMMdd` date.
    pub fn parse_date(self, file_name: &str) -> Result<NaiveDate, IoError> {
        let range = match self {
            Self::ArcL3U => ARC_DATE_OFFSET..ARC_DATE_OFFSET + 8,
            _ => 0..8,
        };
        file_name
            .get(range)
            .and_then(|s| parse_compact_date(s).ok())
            .ok_or_else(|| IoError::InvalidFileName {
                name: file_name.to_string(),
            })
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProductType {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| IoError::UnknownProductType {
                name: name.to_string(),
                known: Self::ALL.map(ProductType::name).join(", "),
            })
    }
}

/// Reads product files into owned [`SourceFile`] grids.
#[derive(Debug, Clone, Copy)]
pub struct ProductReader {
    product: ProductType,
    depth: SstDepth,
    def: GridDef,
}

impl ProductReader {
    pub fn new(product: ProductType, depth: SstDepth) -> Self {
        Self {
            product,
            depth,
            def: product.grid_def(),
        }
    }

    /// Overrides the pixel grid files are expected on.
    pub fn with_grid_def(mut self, def: GridDef) -> Self {
        self.def = def;
        self
    }

    pub fn product(&self) -> ProductType {
        self.product
    }

    pub fn depth(&self) -> SstDepth {
        self.depth
    }

    /// Reads the SST, quality and uncertainty grids of one file.
    ///
    /// The file is closed before returning, on success and on error.
    pub fn read(&self, path: &Path) -> Result<SourceFile, IoError> {
        let file = open_file(path)?;
        let grids = GridReader::new(&file, path, self.def, self.product.south_up());
        match self.product {
            ProductType::ArcL3U => {
                let sst = match self.depth {
                    SstDepth::Skin => grids.read(&["sst_skin"], 0)?,
                    SstDepth::Depth20 => grids.read(&["sst_depth"], 0)?,
                    SstDepth::Depth100 => grids.read(&["sst_depth"], 1)?,
                };
                let date = read_arc_date(&file, path)?;
                Ok(SourceFile::new(date, sst)
                    .with_quantity(Quantity::ArcUncertainty, grids.read(&["uncertainty"], 0)?))
            }
            ProductType::CciL3U | ProductType::CciL3C => {
                let sst = match self.depth {
                    SstDepth::Skin => grids.read(&["sea_surface_temperature"], 0)?,
                    _ => grids.read(&["sea_surface_temperature_depth"], 0)?,
                };
                let mut source = SourceFile::new(self.file_date(path)?, sst)
                    .with_quality(grids.read(&["quality_level"], 0)?, CCI_BEST_QUALITY)
                    .with_positive_sst()
                    .with_quantity(
                        Quantity::UncorrelatedUncertainty,
                        grids.read(&["uncorrelated_uncertainty"], 0)?,
                    )
                    .with_quantity(
                        Quantity::LargeScaleCorrelatedUncertainty,
                        grids.read(&["large_scale_correlated_uncertainty"], 0)?,
                    )
                    .with_quantity(
                        Quantity::SynopticallyCorrelatedUncertainty,
                        grids.read(&["synoptically_correlated_uncertainty"], 0)?,
                    );
                if let Some(adjustment) = grids.read_optional(&["adjustment_uncertainty"], 0)? {
                    source = source.with_quantity(Quantity::AdjustmentUncertainty, adjustment);
                }
                Ok(source)
            }
            ProductType::CciL4 => Ok(SourceFile::new(
                self.file_date(path)?,
                grids.read(&["analysed_sst"], 0)?,
            )
            .with_quantity(Quantity::AnalysisError, grids.read(&["analysis_error"], 0)?)
            .with_quantity(
                Quantity::SeaIceFraction,
                grids.read(&["sea_ice_fraction"], 0)?,
            )),
        }
    }

    fn file_date(&self, path: &Path) -> Result<NaiveDate, IoError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.product.parse_date(name)
    }
}

/// ARC files carry their date as seconds since 1981-01-01 in `time`.
fn read_arc_date(file: &netcdf::File, path: &Path) -> Result<NaiveDate, IoError> {
    let time = read_1d_f64(file, &["time"], path)?;
    let seconds = time.first().copied().ok_or_else(|| IoError::InvalidTime {
        reason: format!("empty 'time' variable in {}", path.display()),
    })?;
    Ok(datetime_from_seconds_since_1981(seconds)?.date())
}
