//! # regavg-io
//!
//! Reads SST product files, the climatology and the coverage-uncertainty
//! lookup tables from NetCDF and text, and writes one NetCDF time series
//! (plus an optional text table) per region. Bridges external file formats
//! into the owned grids of `regavg-aggregate`.

mod climatology;
mod error;
mod file_store;
mod lut;
mod netcdf_read;
mod output_read;
mod product;
mod source;
mod writer;

pub use climatology::{NetcdfClimatology, read_climatology};
pub use error::IoError;
pub use file_store::FileStore;
pub use lut::{parse_lut2, read_lut1, read_lut2};
pub use output_read::{OutputSeries, read_output};
pub use product::{ProductReader, ProductType};
pub use source::ProductSource;
pub use writer::{OutputMetadata, OutputWriter};
