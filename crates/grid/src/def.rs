//! Regular lon/lat grid geometry.

use crate::error::GridError;

/// Index values closer than this to an integer are snapped to it, so that
/// tile edges computed from decimal resolutions map to exact indices.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Geographic bounds of a rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatRect {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

/// Rectangle of cell indices: `x..x + width`, `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl GridRect {
    /// Number of cells covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Clips the rectangle to `width x height` cells starting at the origin.
    pub fn clip(&self, width: usize, height: usize) -> GridRect {
        let x_end = (self.x + self.width).min(width);
        let y_end = (self.y + self.height).min(height);
        GridRect {
            x: self.x.min(width),
            y: self.y.min(height),
            width: x_end.saturating_sub(self.x),
            height: y_end.saturating_sub(self.y),
        }
    }
}

/// Immutable definition of a regular lon/lat grid.
///
/// Row `y = 0` touches the north pole, column `x = 0` starts at the
/// western origin (`-180` for global grids).
///
/// # Example
///
/// ```
/// use regavg_grid::GridDef;
///
/// let def = GridDef::global(5.0).unwrap();
/// assert_eq!((def.width(), def.height()), (72, 36));
/// assert_eq!(def.grid_x(-177.5, false).unwrap(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDef {
    width: usize,
    height: usize,
    easting: f64,
    northing: f64,
    resolution: f64,
}

impl GridDef {
    /// Creates a global grid with the given resolution in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidResolution`] unless `360 / resolution` and
    /// `180 / resolution` are whole numbers.
    pub fn global(resolution: f64) -> Result<Self, GridError> {
        if !(resolution > 0.0) || resolution > 180.0 {
            return Err(GridError::InvalidResolution { resolution });
        }
        let width = snap(360.0 / resolution);
        let height = snap(180.0 / resolution);
        if width.fract() != 0.0 || height.fract() != 0.0 {
            return Err(GridError::InvalidResolution { resolution });
        }
        Ok(Self::global_with_size(width as usize))
    }

    /// Creates a global grid that is `width` cells wide and `width / 2` high.
    pub fn global_with_size(width: usize) -> Self {
        let width = width.max(2);
        Self {
            width,
            height: width / 2,
            easting: -180.0,
            northing: 90.0,
            resolution: 360.0 / width as f64,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// A grid always has at least one cell; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major linear index of `(x, y)`.
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Maps a longitude to a column index.
    ///
    /// With `crop` set, indices beyond the grid are clamped to the edge
    /// columns (so `lon = 180` lands in the last column); otherwise they are
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CoordinateOutOfRange`] if `lon` is outside
    /// `[-180, 180]`, or outside the grid when `crop` is false.
    pub fn grid_x(&self, lon: f64, crop: bool) -> Result<usize, GridError> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GridError::CoordinateOutOfRange {
                axis: "longitude",
                value: lon,
            });
        }
        let x = snap((lon - self.easting) / self.resolution).floor() as i64;
        to_index(x, self.width, crop).ok_or(GridError::CoordinateOutOfRange {
            axis: "longitude",
            value: lon,
        })
    }

    /// Maps a latitude to a row index; see [`GridDef::grid_x`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CoordinateOutOfRange`] if `lat` is outside
    /// `[-90, 90]`, or outside the grid when `crop` is false.
    pub fn grid_y(&self, lat: f64, crop: bool) -> Result<usize, GridError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GridError::CoordinateOutOfRange {
                axis: "latitude",
                value: lat,
            });
        }
        let y = snap((self.northing - lat) / self.resolution).floor() as i64;
        to_index(y, self.height, crop).ok_or(GridError::CoordinateOutOfRange {
            axis: "latitude",
            value: lat,
        })
    }

    /// Western edge of column `x`.
    pub fn lon(&self, x: usize) -> f64 {
        self.easting + self.resolution * x as f64
    }

    /// Northern edge of row `y`, clamped to the poles.
    pub fn lat(&self, y: usize) -> f64 {
        (self.northing - self.resolution * y as f64).clamp(-90.0, 90.0)
    }

    pub fn center_lon(&self, x: usize) -> f64 {
        self.lon(x) + 0.5 * self.resolution
    }

    pub fn center_lat(&self, y: usize) -> f64 {
        self.northing - self.resolution * (y as f64 + 0.5)
    }

    /// Geographic bounds of cell `(x, y)`.
    pub fn lon_lat_rectangle(&self, x: usize, y: usize) -> LonLatRect {
        LonLatRect {
            west: self.lon(x),
            north: self.lat(y),
            east: self.lon(x + 1),
            south: self.lat(y + 1),
        }
    }

    /// Cells of this grid whose area lies inside `rect`.
    ///
    /// West and north edges are inclusive, east and south edges exclusive,
    /// so adjacent rectangles never share a cell. The result is cropped to
    /// the grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CoordinateOutOfRange`] for bounds outside the
    /// globe.
    pub fn grid_rectangle(&self, rect: &LonLatRect) -> Result<GridRect, GridError> {
        let x1 = self.grid_x(rect.west, true)?;
        let y1 = self.grid_y(rect.north, true)?;
        let x2 = self.last_index_before(rect.east, true)?;
        let y2 = self.last_index_before(rect.south, false)?;
        Ok(GridRect {
            x: x1,
            y: y1,
            width: (x2 + 1).saturating_sub(x1),
            height: (y2 + 1).saturating_sub(y1),
        })
    }

    /// Exclusive edge index: the last column (or row) that ends at or
    /// before `value`.
    pub(crate) fn last_index_before(&self, value: f64, is_lon: bool) -> Result<usize, GridError> {
        let (axis, offset, size, range) = if is_lon {
            ("longitude", value - self.easting, self.width, 180.0)
        } else {
            ("latitude", self.northing - value, self.height, 90.0)
        };
        if !(-range..=range).contains(&value) {
            return Err(GridError::CoordinateOutOfRange { axis, value });
        }
        let edge = snap(offset / self.resolution).ceil() as i64 - 1;
        Ok(edge.clamp(0, size as i64 - 1) as usize)
    }

    /// Integer block factor between this grid and a coarser global grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IncompatibleGrids`] unless `coarser` is an exact
    /// integer multiple of this grid in both directions.
    pub fn scale_to(&self, coarser: &GridDef) -> Result<usize, GridError> {
        let ratio = snap(coarser.resolution / self.resolution);
        let factor = ratio as usize;
        if ratio.fract() != 0.0
            || factor == 0
            || self.width != coarser.width * factor
            || self.height != coarser.height * factor
        {
            return Err(GridError::IncompatibleGrids {
                reason: format!(
                    "{}° grid cannot be block-averaged to {}°",
                    self.resolution, coarser.resolution
                ),
            });
        }
        Ok(factor)
    }

    /// The grid obtained by merging `factor x factor` blocks.
    pub(crate) fn coarsened(&self, factor: usize) -> GridDef {
        GridDef {
            width: self.width / factor,
            height: self.height / factor,
            easting: self.easting,
            northing: self.northing,
            resolution: self.resolution * factor as f64,
        }
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_TOLERANCE { r } else { v }
}

fn to_index(i: i64, size: usize, crop: bool) -> Option<usize> {
    if crop {
        Some(i.clamp(0, size as i64 - 1) as usize)
    } else if (0..size as i64).contains(&i) {
        Some(i as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn global_sizes() {
        let def = GridDef::global(0.05).unwrap();
        assert_eq!((def.width(), def.height()), (7200, 3600));
        let def = GridDef::global(90.0).unwrap();
        assert_eq!((def.width(), def.height()), (4, 2));
    }

    #[test]
    fn global_rejects_non_tiling_resolution() {
        assert!(GridDef::global(7.0).is_err());
        assert!(GridDef::global(0.0).is_err());
        assert!(GridDef::global(-1.0).is_err());
    }

    #[test]
    fn grid_x_and_y() {
        let def = GridDef::global(5.0).unwrap();
        assert_eq!(def.grid_x(-180.0, false).unwrap(), 0);
        assert_eq!(def.grid_x(-175.0, false).unwrap(), 1);
        assert_eq!(def.grid_x(179.9, false).unwrap(), 71);
        assert_eq!(def.grid_y(90.0, false).unwrap(), 0);
        assert_eq!(def.grid_y(-89.9, false).unwrap(), 35);
    }

    #[test]
    fn grid_x_crop_at_east_edge() {
        let def = GridDef::global(5.0).unwrap();
        assert_eq!(def.grid_x(180.0, true).unwrap(), 71);
        assert!(def.grid_x(180.0, false).is_err());
        assert_eq!(def.grid_y(-90.0, true).unwrap(), 35);
    }

    #[test]
    fn grid_x_out_of_range() {
        let def = GridDef::global(1.0).unwrap();
        assert!(matches!(
            def.grid_x(-181.0, true),
            Err(GridError::CoordinateOutOfRange { axis: "longitude", .. })
        ));
        assert!(def.grid_y(91.0, true).is_err());
    }

    #[test]
    fn lon_lat_inverse() {
        let def = GridDef::global(5.0).unwrap();
        let r = def.lon_lat_rectangle(0, 0);
        assert_relative_eq!(r.west, -180.0);
        assert_relative_eq!(r.north, 90.0);
        assert_relative_eq!(r.east, -175.0);
        assert_relative_eq!(r.south, 85.0);
        assert_relative_eq!(def.center_lat(35), -87.5);
    }

    #[test]
    fn cell_to_pixel_rectangle_is_exact() {
        let cells = GridDef::global(5.0).unwrap();
        let pixels = GridDef::global(0.05).unwrap();
        for &(x, y) in &[(0, 0), (1, 0), (36, 18), (71, 35)] {
            let rect = pixels
                .grid_rectangle(&cells.lon_lat_rectangle(x, y))
                .unwrap();
            assert_eq!(
                rect,
                GridRect {
                    x: x * 100,
                    y: y * 100,
                    width: 100,
                    height: 100
                }
            );
        }
    }

    #[test]
    fn adjacent_rectangles_do_not_overlap() {
        let cells = GridDef::global(1.0).unwrap();
        let pixels = GridDef::global(0.1).unwrap();
        let a = pixels.grid_rectangle(&cells.lon_lat_rectangle(3, 7)).unwrap();
        let b = pixels.grid_rectangle(&cells.lon_lat_rectangle(4, 7)).unwrap();
        assert_eq!(a.x + a.width, b.x);
        assert_eq!(a.width, 10);
    }

    #[test]
    fn scale_factors() {
        let fine = GridDef::global(0.05).unwrap();
        let coarse = GridDef::global(5.0).unwrap();
        assert_eq!(fine.scale_to(&coarse).unwrap(), 100);
        assert_eq!(coarse.scale_to(&GridDef::global(90.0).unwrap()).unwrap(), 18);
        let odd = GridDef::global(0.25).unwrap();
        assert!(GridDef::global(0.1).unwrap().scale_to(&odd).is_err());
    }

    #[test]
    fn rect_clip() {
        let r = GridRect {
            x: 5,
            y: 5,
            width: 10,
            height: 10,
        };
        assert_eq!(
            r.clip(8, 20),
            GridRect {
                x: 5,
                y: 5,
                width: 3,
                height: 10
            }
        );
    }
}
