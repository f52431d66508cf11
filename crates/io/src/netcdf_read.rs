//! Low-level NetCDF extraction helpers.

use std::path::Path;

use netcdf::AttributeValue;
use regavg_grid::{ArrayGrid, GridDef};

use crate::error::IoError;

const LATITUDE_ALIASES: &[&str] = &["lat", "latitude", "LAT"];

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// First variable matching one of `aliases`, or `None`.
pub(crate) fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[&str],
) -> Option<netcdf::Variable<'f>> {
    aliases.iter().find_map(|&alias| file.variable(alias))
}

/// Like [`find_variable`], returning [`IoError::MissingVariable`] with the
/// first alias as the name when nothing matches.
pub(crate) fn require_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<netcdf::Variable<'f>, IoError> {
    find_variable(file, aliases).ok_or_else(|| IoError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })
}

/// Read a 1-D `f64` variable, trying each alias in order.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = require_variable(file, aliases, path)?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Numeric attribute of `var` widened to `f64`.
pub(crate) fn attribute_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            AttributeValue::Double(d) => Some(d),
            AttributeValue::Float(f) => Some(f as f64),
            AttributeValue::Short(s) => Some(s as f64),
            AttributeValue::Ushort(s) => Some(s as f64),
            AttributeValue::Int(i) => Some(i as f64),
            AttributeValue::Uint(i) => Some(i as f64),
            AttributeValue::Schar(b) => Some(b as f64),
            AttributeValue::Uchar(b) => Some(b as f64),
            AttributeValue::Doubles(d) => d.first().copied(),
            AttributeValue::Floats(f) => f.first().map(|&f| f as f64),
            _ => None,
        })
}

/// Whether the file's latitude axis runs from south to north, or `None`
/// when the file has no usable latitude variable.
pub(crate) fn latitude_ascends(file: &netcdf::File) -> Option<bool> {
    let lat = find_variable(file, LATITUDE_ALIASES)?
        .get_values::<f64, _>(..)
        .ok()?;
    match lat.as_slice() {
        [first, second, ..] => Some(first < second),
        _ => None,
    }
}

/// Reads 2-D fields of one open file onto a fixed global grid.
///
/// Fields come back north-up: when the file stores rows from the south
/// (an ascending latitude axis, or `default_south_up` when the file has no
/// latitude variable) the rows are flipped.
pub(crate) struct GridReader<'f> {
    file: &'f netcdf::File,
    path: &'f Path,
    def: GridDef,
    south_up: bool,
}

impl<'f> GridReader<'f> {
    pub(crate) fn new(
        file: &'f netcdf::File,
        path: &'f Path,
        def: GridDef,
        default_south_up: bool,
    ) -> Self {
        let south_up = latitude_ascends(file).unwrap_or(default_south_up);
        Self {
            file,
            path,
            def,
            south_up,
        }
    }

    /// Reads layer `z` of the first variable matching `aliases`.
    pub(crate) fn read(&self, aliases: &[&str], z: usize) -> Result<ArrayGrid, IoError> {
        let var = require_variable(self.file, aliases, self.path)?;
        self.read_variable(&var, z)
    }

    /// Like [`GridReader::read`], returning `None` when the variable is absent.
    pub(crate) fn read_optional(
        &self,
        aliases: &[&str],
        z: usize,
    ) -> Result<Option<ArrayGrid>, IoError> {
        find_variable(self.file, aliases)
            .map(|var| self.read_variable(&var, z))
            .transpose()
    }

    fn read_variable(&self, var: &netcdf::Variable, z: usize) -> Result<ArrayGrid, IoError> {
        let grid = ArrayGrid::new(self.def, read_layer(var, &self.def, z)?)?;
        Ok(if self.south_up { grid.flip_y() } else { grid })
    }
}

/// Reads the trailing 2-D layer `z` of `var` and unpacks it.
///
/// The last two dimensions must be (height, width) of `def`. `z` indexes
/// the dimension before them; any further leading dimension (time) is
/// taken at index 0. Raw values equal to `_FillValue` become NaN, all others
/// are scaled by `scale_factor` and shifted by `add_offset`.
pub(crate) fn read_layer(
    var: &netcdf::Variable,
    def: &GridDef,
    z: usize,
) -> Result<Vec<f64>, IoError> {
    let name = var.name();
    let dims = var.dimensions();
    let rank = dims.len();
    if !(2..=4).contains(&rank) {
        return Err(IoError::DimensionMismatch {
            name: format!("{name} rank"),
            expected: 3,
            got: rank,
        });
    }
    let (h, w) = (dims[rank - 2].len(), dims[rank - 1].len());
    if h != def.height() {
        return Err(IoError::DimensionMismatch {
            name: dims[rank - 2].name(),
            expected: def.height(),
            got: h,
        });
    }
    if w != def.width() {
        return Err(IoError::DimensionMismatch {
            name: dims[rank - 1].name(),
            expected: def.width(),
            got: w,
        });
    }
    let layers = if rank >= 3 { dims[rank - 3].len() } else { 1 };
    if z >= layers {
        return Err(IoError::DimensionMismatch {
            name: format!("{name} layers"),
            expected: z + 1,
            got: layers,
        });
    }

    let raw = match rank {
        2 => var.get_values::<f64, _>(..)?,
        3 => var.get_values::<f64, _>((z, .., ..))?,
        _ => var.get_values::<f64, _>((0, z, .., ..))?,
    };

    let fill = attribute_f64(var, "_FillValue");
    let scale = attribute_f64(var, "scale_factor").unwrap_or(1.0);
    let offset = attribute_f64(var, "add_offset").unwrap_or(0.0);
    Ok(raw
        .into_iter()
        .map(|v| {
            if v.is_nan() || fill.is_some_and(|f| v == f) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect())
}
