//! Coverage-uncertainty lookup tables.
//!
//! LUT1 is a NetCDF file holding the `magnitude` and `exponent` fields of
//! the 5° coverage formula. LUT2 is a plain-text table of 90° weights, two
//! rows of four values per calendar month starting with January:
//!
//! ```text
//! # January
//! 1.10 1.20 1.30 1.40
//! 1.50 1.60 1.70 1.80
//! # February
//! ...
//! ```

use std::path::Path;

use regavg_aggregate::{Lut1, Lut2};
use regavg_grid::GridDef;
use tracing::debug;

use crate::error::IoError;
use crate::netcdf_read::{GridReader, open_file};

const LUT2_MONTHS: usize = 12;
const LUT2_ROWS: usize = 2 * LUT2_MONTHS;
const LUT2_COLUMNS: usize = 4;

/// Reads LUT1 from a NetCDF file with 72 x 36 `magnitude`/`exponent` fields.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file,
/// [`IoError::MissingVariable`] if either field is absent and
/// [`IoError::DimensionMismatch`] if a field is not on the 5° grid.
pub fn read_lut1(path: &Path) -> Result<Lut1, IoError> {
    let file = open_file(path)?;
    let reader = GridReader::new(&file, path, GridDef::global(5.0)?, false);
    let magnitude = reader.read(&["magnitude", "MAGNITUDE"], 0)?;
    let exponent = reader.read(&["exponent", "EXPONENT"], 0)?;
    debug!(path = %path.display(), "LUT1 loaded");
    Ok(Lut1::new(
        magnitude.data().to_vec(),
        exponent.data().to_vec(),
    )?)
}

/// Reads LUT2 from a text file; see [`parse_lut2`].
pub fn read_lut2(path: &Path) -> Result<Lut2, IoError> {
    if !path.is_file() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| IoError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let lut2 = parse_lut2(&text, path)?;
    debug!(path = %path.display(), "LUT2 loaded");
    Ok(lut2)
}

/// Parses LUT2 text: `#` comments and blank lines are skipped; exactly 24
/// data lines of 4 whitespace-separated numbers must remain.
///
/// # Errors
///
/// Returns [`IoError::LutFormat`] naming the first bad line, or line 0 when
/// the number of data lines is wrong.
pub fn parse_lut2(text: &str, path: &Path) -> Result<Lut2, IoError> {
    let format_error = |line: usize, reason: String| IoError::LutFormat {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut weights = [[0.0; 2 * LUT2_COLUMNS]; LUT2_MONTHS];
    let mut row = 0;
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if row == LUT2_ROWS {
            return Err(format_error(
                i + 1,
                format!("more than {LUT2_ROWS} data lines"),
            ));
        }
        let values = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format_error(i + 1, e.to_string()))?;
        if values.len() != LUT2_COLUMNS {
            return Err(format_error(
                i + 1,
                format!("expected {LUT2_COLUMNS} values, found {}", values.len()),
            ));
        }
        let (month, half) = (row / 2, row % 2);
        weights[month][half * LUT2_COLUMNS..(half + 1) * LUT2_COLUMNS].copy_from_slice(&values);
        row += 1;
    }
    if row != LUT2_ROWS {
        return Err(format_error(
            0,
            format!("expected {LUT2_ROWS} data lines, found {row}"),
        ));
    }
    Ok(Lut2::new(weights))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lut2_text() -> String {
        let mut text = String::from("# LUT2 test table\n\n");
        for m in 0..12 {
            text.push_str(&format!("# month {}\n", m + 1));
            for half in 0..2 {
                let row: Vec<String> = (0..4)
                    .map(|x| format!("{}", m * 100 + half * 10 + x))
                    .collect();
                text.push_str(&row.join("  "));
                text.push('\n');
            }
        }
        text
    }

    #[test]
    fn parses_months_north_row_first() {
        let lut2 = parse_lut2(&lut2_text(), Path::new("lut2.txt")).unwrap();
        assert_eq!(lut2.weight(0, 0, 0), 0.0);
        assert_eq!(lut2.weight(0, 3, 0), 3.0);
        assert_eq!(lut2.weight(0, 2, 1), 12.0);
        assert_eq!(lut2.weight(11, 1, 1), 1111.0);
    }

    #[test]
    fn bad_value_names_line() {
        let text = lut2_text().replacen("101", "1o1", 1);
        let err = parse_lut2(&text, Path::new("lut2.txt")).unwrap_err();
        // 2 header lines, then month 1 (comment + 2 rows), month 2 comment.
        assert!(matches!(err, IoError::LutFormat { line: 7, .. }), "{err}");
    }

    #[test]
    fn wrong_column_count() {
        let text = lut2_text().replacen("0  1  2  3", "0  1  2", 1);
        let err = parse_lut2(&text, Path::new("lut2.txt")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "lut2.txt: line 4: expected 4 values, found 3"
        );
    }

    #[test]
    fn too_few_lines() {
        let text: String = lut2_text().lines().take(20).collect::<Vec<_>>().join("\n");
        let err = parse_lut2(&text, Path::new("lut2.txt")).unwrap_err();
        assert!(matches!(err, IoError::LutFormat { line: 0, .. }));
    }

    #[test]
    fn too_many_lines() {
        let text = format!("{}1 2 3 4\n", lut2_text());
        let err = parse_lut2(&text, Path::new("lut2.txt")).unwrap_err();
        assert!(err.to_string().contains("more than 24 data lines"));
    }
}
