//! Date index over a directory tree of product files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::IoError;
use crate::product::ProductType;

/// Product files found below a directory, indexed by date.
#[derive(Debug, Clone)]
pub struct FileStore {
    product: ProductType,
    files: BTreeMap<NaiveDate, Vec<PathBuf>>,
}

impl FileStore {
    /// Walks `dir` recursively and indexes every file whose name matches
    /// `pattern` in full (the product's own pattern when `None`).
    ///
    /// Matching names the product cannot take a date from are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if `dir` is not a directory and
    /// [`IoError::InvalidRegex`] if the pattern does not compile.
    pub fn scan(dir: &Path, product: ProductType, pattern: Option<&str>) -> Result<Self, IoError> {
        if !dir.is_dir() {
            return Err(IoError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }
        let pattern = pattern.unwrap_or(product.filename_regex());
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| IoError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut files: BTreeMap<NaiveDate, Vec<PathBuf>> = BTreeMap::new();
        let mut n_files = 0;
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !regex.is_match(name) {
                continue;
            }
            match product.parse_date(name) {
                Ok(date) => {
                    files.entry(date).or_default().push(entry.into_path());
                    n_files += 1;
                }
                Err(e) => debug!(path = %entry.path().display(), "{e}, ignored"),
            }
        }
        for paths in files.values_mut() {
            paths.sort();
        }
        info!(dir = %dir.display(), product = %product, n_files, "product files indexed");
        Ok(Self { product, files })
    }

    pub fn product(&self) -> ProductType {
        self.product
    }

    /// Total number of indexed files.
    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files dated in `[start, end)`, in date order.
    pub fn files(&self, start: NaiveDate, end: NaiveDate) -> Vec<PathBuf> {
        if end <= start {
            return Vec::new();
        }
        self.files
            .range(start..end)
            .flat_map(|(_, paths)| paths.iter().cloned())
            .collect()
    }
}
