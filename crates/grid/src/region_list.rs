//! The region list mini-language.
//!
//! ```text
//! Global=-180,90,180,-90; Nino34=-170,5,-120,-5; Arctic=masks/arctic.txt
//! ```
//!
//! Each entry is `NAME=W,N,E,S` or `NAME=path-to-mask-file`; entries are
//! separated by `;`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::GridError;
use crate::mask::RegionMask;

/// Region list used when none is configured.
pub const DEFAULT_REGIONS: &str = "Global=-180,90,180,-90";

/// Ordered, immutable list of named region masks.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMaskList {
    masks: Vec<RegionMask>,
    combined: RegionMask,
}

impl RegionMaskList {
    /// Parses a region list, resolving relative mask file paths against the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidRegionEntry`] with the 1-based entry
    /// number for syntax errors, [`GridError::MaskFileNotFound`] for missing
    /// mask files, and the mask errors of [`RegionMask`] otherwise.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        Self::parse_relative_to(text, Path::new(""))
    }

    /// Like [`RegionMaskList::parse`], resolving relative mask file paths
    /// against `base_dir`.
    pub fn parse_relative_to(text: &str, base_dir: &Path) -> Result<Self, GridError> {
        let mut masks = Vec::new();
        let entries = text.split(';').map(str::trim).filter(|e| !e.is_empty());
        for (i, entry) in entries.enumerate() {
            masks.push(parse_entry(i + 1, entry, base_dir)?);
        }
        Ok(Self::new(masks))
    }

    pub fn new(masks: Vec<RegionMask>) -> Self {
        let combined = RegionMask::combine(&masks);
        Self { masks, combined }
    }

    pub fn masks(&self) -> &[RegionMask] {
        &self.masks
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionMask> {
        self.masks.iter()
    }

    /// Union of all regions; restricts which cells get populated during
    /// aggregation.
    pub fn combined(&self) -> &RegionMask {
        &self.combined
    }
}

impl Default for RegionMaskList {
    fn default() -> Self {
        Self::new(vec![RegionMask::globe("Global")])
    }
}

impl<'a> IntoIterator for &'a RegionMaskList {
    type Item = &'a RegionMask;
    type IntoIter = std::slice::Iter<'a, RegionMask>;

    fn into_iter(self) -> Self::IntoIter {
        self.masks.iter()
    }
}

fn parse_entry(index: usize, entry: &str, base_dir: &Path) -> Result<RegionMask, GridError> {
    let entry_error = |reason: &str| GridError::InvalidRegionEntry {
        index,
        reason: reason.to_string(),
    };

    let (name, spec) = entry
        .split_once('=')
        .ok_or_else(|| entry_error("is missing the '=' character."))?;
    let name = name.trim();
    let spec = spec.trim();
    if name.is_empty() {
        return Err(entry_error("Name is empty."));
    }
    if spec.is_empty() {
        return Err(entry_error("Mask is empty."));
    }

    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [w, n, e, s] => {
            let coords: Result<Vec<f64>, _> = [w, n, e, s].iter().map(|p| p.parse()).collect();
            let coords = coords.map_err(|_| entry_error("Failed to parse W,N,E,S coordinates."))?;
            let (west, north, east, south) = (coords[0], coords[1], coords[2], coords[3]);
            if north < south {
                return Err(entry_error("N must not be less than S."));
            }
            debug!(region = name, west, north, east, south, "region from coordinates");
            RegionMask::from_wnes(name, west, north, east, south)
        }
        [path] => {
            let path = base_dir.join(path);
            read_mask_file(name, path)
        }
        _ => Err(entry_error("Failed to parse W,N,E,S coordinates.")),
    }
}

fn read_mask_file(name: &str, path: PathBuf) -> Result<RegionMask, GridError> {
    if !path.is_file() {
        return Err(GridError::MaskFileNotFound { path });
    }
    let text = std::fs::read_to_string(&path).map_err(|e| GridError::MaskFileRead {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(region = name, path = %path.display(), "region from mask file");
    RegionMask::from_text(name, &text)
}
