//! # regavg-aggregate
//!
//! Regional averaging engine for gridded SST products: pixels are folded
//! into 5° cells (and 1° cells for synoptically correlated uncertainties),
//! 5° cells are rolled up into 90° cells for global and hemispheric
//! regions, cells are folded into one result per region and month, and
//! monthly results are folded into seasonal or annual results.
//!
//! ## Aggregation Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["SourceProvider"] -->|"read()"| B["SourceFile pixels"]
//!     B -->|"accumulate_pixels()"| C["Cell5 / Cell1"]
//!     C -->|"results()"| D["CellResults"]
//!     D -->|"aggregate_to_coarser()"| E["Cell90"]
//!     D -->|"accumulate()"| F["SameMonth per region"]
//!     E -->|"accumulate()"| F
//!     F -->|"fold_multi_month()"| G["MultiMonth"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use regavg_aggregate::{Aggregator, Climatology, CoverageUncertainty, Schema};
//! use regavg_calendar::TemporalResolution;
//!
//! let aggregator = Aggregator::new(schema, &regions, &climatology, &coverage);
//! let steps = aggregator.run(&provider, start, end, TemporalResolution::Monthly)?;
//! for step in &steps {
//!     println!("{} {}", step.start(), step.regions[0].sample_count());
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `accumulator` | Weighted mean and uncertainty accumulators |
//! | `quantity` | Output quantities, SST depth and product schemas |
//! | `cell` | Cells of every tier and their finalized results |
//! | `cell_grid` | Lazily populated cell grids and regridding |
//! | `coverage` | LUT1/LUT2 coverage uncertainty |
//! | `synoptic` | Effective sample count of correlated 1° areas |
//! | `climatology` | Reference SST and sea coverage |
//! | `source` | Source files and the provider trait |
//! | `driver` | Time windows, region rollup and multi-month folding |
//! | `error` | Error types |

mod accumulator;
mod cell;
mod cell_grid;
mod climatology;
mod coverage;
mod driver;
mod error;
mod quantity;
mod source;
mod synoptic;

pub use accumulator::{NumberAccumulator, Rule};
pub use cell::{Cell, CellKind, CellResults, PixelContext, ResultsEnv, SYNOPTIC_AREA_WEIGHT};
pub use cell_grid::{CellGrid, aggregate_to_coarser, fold_into_coarser};
pub use climatology::{Climatology, ClimatologySource};
pub use coverage::{CoverageUncertainty, FULL_SAMPLE_COUNT, Lut1, Lut2};
pub use driver::{Aggregator, TimeStep, fold_multi_month};
pub use error::AggregateError;
pub use quantity::{Quantity, Schema, SstDepth};
pub use source::{QualityFilter, SourceFile, SourceProvider};
pub use synoptic::SynopticUncertainty;
