//! # regavg-grid
//!
//! Regular lon/lat grid geometry, in-memory sample grids and the 5° region
//! masks that select which cells feed a regional average.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["GridDef (0.05°…90°)"] -->|".lon_lat_rectangle(x, y)"| B["LonLatRect"]
//!     B -->|"finer.grid_rectangle()"| C["GridRect of pixels"]
//!     D["ArrayGrid"] -->|"downscale()"| D
//!     E["region list text"] -->|"RegionMaskList::parse()"| F["RegionMask (72 x 36)"]
//!     F -->|"RegionMask::combine()"| G["combined mask"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use regavg_grid::{Coverage, GridDef, RegionMaskList};
//!
//! let regions = RegionMaskList::parse("Global=-180,90,180,-90;Box=0,10,10,0").unwrap();
//! assert_eq!(regions.masks()[0].coverage(), Coverage::Globe);
//!
//! let cells = GridDef::global(5.0).unwrap();
//! let pixels = GridDef::global(0.05).unwrap();
//! let rect = pixels.grid_rectangle(&cells.lon_lat_rectangle(36, 16)).unwrap();
//! assert_eq!((rect.width, rect.height), (100, 100));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `def` | Grid geometry and cross-resolution rectangles |
//! | `grid` | `Grid` sampler trait, `ArrayGrid`, block-average downscaling |
//! | `mask` | 72 x 36 region masks and their coverage class |
//! | `region_list` | `NAME=W,N,E,S` / `NAME=file` region list parsing |
//! | `error` | Error types |

mod def;
mod error;
mod grid;
mod mask;
mod region_list;

pub use def::{GridDef, GridRect, LonLatRect};
pub use error::GridError;
pub use grid::{ArrayGrid, Grid, downscale};
pub use mask::{Coverage, MASK_HEIGHT, MASK_WIDTH, RegionMask};
pub use region_list::{DEFAULT_REGIONS, RegionMaskList};
