//! Boolean region masks over the fixed 72 x 36 grid of 5° cells.

use std::fmt;

use crate::def::{GridDef, LonLatRect};
use crate::error::GridError;
use crate::grid::Grid;

/// Columns of the region mask grid.
pub const MASK_WIDTH: usize = 72;
/// Rows of the region mask grid.
pub const MASK_HEIGHT: usize = 36;

/// Geometric class of a region mask.
///
/// Global and hemispheric regions are rolled up through a fully tiled 90°
/// grid before the regional fold; every other region is folded directly
/// from its 5° cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    Empty,
    Globe,
    NorthernHemisphere,
    SouthernHemisphere,
    Other,
}

impl Coverage {
    /// Whether regional results must be built from 90° cells.
    pub fn uses_90_degree_rollup(self) -> bool {
        matches!(
            self,
            Coverage::Globe | Coverage::NorthernHemisphere | Coverage::SouthernHemisphere
        )
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Coverage::Empty => "EMPTY",
            Coverage::Globe => "GLOBE",
            Coverage::NorthernHemisphere => "N_HEMISPHERE",
            Coverage::SouthernHemisphere => "S_HEMISPHERE",
            Coverage::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// A named selection of 5° cells.
///
/// Immutable once built; the [`Coverage`] class is derived at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    name: String,
    def: GridDef,
    cells: Vec<bool>,
    coverage: Coverage,
}

impl RegionMask {
    /// The 5° grid every region mask is defined on.
    pub fn grid_def_5() -> GridDef {
        GridDef::global_with_size(MASK_WIDTH)
    }

    /// Builds a mask from row-major cell flags.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DataLength`] unless exactly 72 x 36 flags are
    /// given.
    pub fn from_cells(name: impl Into<String>, cells: Vec<bool>) -> Result<Self, GridError> {
        if cells.len() != MASK_WIDTH * MASK_HEIGHT {
            return Err(GridError::DataLength {
                expected: MASK_WIDTH * MASK_HEIGHT,
                got: cells.len(),
            });
        }
        let coverage = classify(&cells);
        Ok(Self {
            name: name.into(),
            def: Self::grid_def_5(),
            cells,
            coverage,
        })
    }

    /// A mask selecting every cell.
    pub fn globe(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            def: Self::grid_def_5(),
            cells: vec![true; MASK_WIDTH * MASK_HEIGHT],
            coverage: Coverage::Globe,
        }
    }

    /// Builds a mask covering the box west/north/east/south (degrees).
    ///
    /// East and south edges are exclusive. A box with `west > east`
    /// crosses the anti-meridian and selects the two wrapped column ranges;
    /// `west == east` wraps all the way round and selects the whole
    /// latitude band.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidMask`] if `north < south`, and
    /// [`GridError::CoordinateOutOfRange`] for coordinates outside the globe.
    pub fn from_wnes(
        name: impl Into<String>,
        west: f64,
        north: f64,
        east: f64,
        south: f64,
    ) -> Result<Self, GridError> {
        let name = name.into();
        if north < south {
            return Err(GridError::InvalidMask {
                name,
                reason: "N must not be less than S.".to_string(),
            });
        }
        // -180 and 180 are the same meridian; as an east edge it means 180.
        let east = if east == -180.0 { 180.0 } else { east };

        let def = Self::grid_def_5();
        let mut cells = vec![false; MASK_WIDTH * MASK_HEIGHT];
        let mut mark_columns = |x_range: std::ops::RangeInclusive<usize>,
                                y_range: std::ops::RangeInclusive<usize>| {
            for y in y_range {
                for x in x_range.clone() {
                    cells[y * MASK_WIDTH + x] = true;
                }
            }
        };

        if west < east {
            let rect = def.grid_rectangle(&LonLatRect {
                west,
                north,
                east,
                south,
            })?;
            if rect.area() > 0 {
                mark_columns(
                    rect.x..=rect.x + rect.width - 1,
                    rect.y..=rect.y + rect.height - 1,
                );
            }
        } else {
            let eastern = def.grid_rectangle(&LonLatRect {
                west,
                north,
                east: 180.0,
                south,
            })?;
            let western = def.grid_rectangle(&LonLatRect {
                west: -180.0,
                north,
                east,
                south,
            })?;
            for rect in [eastern, western] {
                if rect.area() > 0 {
                    mark_columns(
                        rect.x..=rect.x + rect.width - 1,
                        rect.y..=rect.y + rect.height - 1,
                    );
                }
            }
        }
        Self::from_cells(name, cells)
    }

    /// Parses the text bitmap format: 36 lines of 72 `'0'`/`'1'` characters,
    /// northernmost row first. Blank lines and lines starting with `#` are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidMask`] naming the offending line.
    pub fn from_text(name: impl Into<String>, text: &str) -> Result<Self, GridError> {
        let name = name.into();
        let mut cells = Vec::with_capacity(MASK_WIDTH * MASK_HEIGHT);
        let mut rows = 0usize;
        let mut last_line = 0usize;

        for (i, raw) in text.split('\n').enumerate() {
            if !raw.is_empty() {
                last_line = i + 1;
            }
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = i + 1;
            let n_chars = line.chars().count();
            if n_chars != MASK_WIDTH {
                return Err(GridError::InvalidMask {
                    name,
                    reason: format!(
                        "Illegal mask format in line {line_no}: Line must contain exactly \
                         {MASK_WIDTH} characters, but found {n_chars}."
                    ),
                });
            }
            for c in line.chars() {
                match c {
                    '0' => cells.push(false),
                    '1' => cells.push(true),
                    _ => {
                        return Err(GridError::InvalidMask {
                            name,
                            reason: format!(
                                "Illegal mask format in line {line_no}: Only use characters \
                                 '0' and '1'."
                            ),
                        });
                    }
                }
            }
            rows += 1;
        }

        if rows != MASK_HEIGHT {
            return Err(GridError::InvalidMask {
                name,
                reason: format!(
                    "Illegal mask format in line {last_line}: Exactly {MASK_HEIGHT} lines are \
                     required, but found {rows}."
                ),
            });
        }
        Self::from_cells(name, cells)
    }

    /// Union of `masks`, named `"Combined"`. A single mask is returned as is.
    pub fn combine(masks: &[RegionMask]) -> RegionMask {
        if let [single] = masks {
            return single.clone();
        }
        let mut cells = vec![false; MASK_WIDTH * MASK_HEIGHT];
        for mask in masks {
            for (c, &m) in cells.iter_mut().zip(&mask.cells) {
                *c |= m;
            }
        }
        let coverage = classify(&cells);
        RegionMask {
            name: "Combined".to_string(),
            def: Self::grid_def_5(),
            cells,
            coverage,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.cells[y * MASK_WIDTH + x]
    }

    /// Number of selected cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Selected cells as `(x, y)`, row-major from the north.
    pub fn set_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(|(i, _)| (i % MASK_WIDTH, i / MASK_WIDTH))
    }
}

impl Grid for RegionMask {
    fn grid_def(&self) -> &GridDef {
        &self.def
    }

    fn sample_f64(&self, x: usize, y: usize) -> f64 {
        if self.is_set(x, y) { 1.0 } else { 0.0 }
    }

    fn sample_bool(&self, x: usize, y: usize) -> bool {
        self.is_set(x, y)
    }
}

fn classify(cells: &[bool]) -> Coverage {
    let total = cells.len();
    let n_set = cells.iter().filter(|&&c| c).count();
    if n_set == 0 {
        return Coverage::Empty;
    }
    if n_set == total {
        return Coverage::Globe;
    }
    let half = (MASK_HEIGHT / 2) * MASK_WIDTH;
    if n_set == total / 2 {
        if cells[..half].iter().all(|&c| c) {
            return Coverage::NorthernHemisphere;
        }
        if cells[half..].iter().all(|&c| c) {
            return Coverage::SouthernHemisphere;
        }
    }
    Coverage::Other
}
