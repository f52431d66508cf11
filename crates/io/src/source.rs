//! [`SourceProvider`] over a product directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regavg_aggregate::{SourceFile, SourceProvider};

use crate::error::IoError;
use crate::file_store::FileStore;
use crate::product::ProductReader;

/// Product files of a [`FileStore`] read with a [`ProductReader`].
#[derive(Debug, Clone)]
pub struct ProductSource {
    store: FileStore,
    reader: ProductReader,
}

impl ProductSource {
    pub fn new(store: FileStore, reader: ProductReader) -> Self {
        Self { store, reader }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn reader(&self) -> &ProductReader {
        &self.reader
    }
}

impl SourceProvider for ProductSource {
    type Error = IoError;

    fn files(&self, start: NaiveDate, end: NaiveDate) -> Vec<PathBuf> {
        self.store.files(start, end)
    }

    fn read(&self, path: &Path) -> Result<SourceFile, IoError> {
        self.reader.read(path)
    }
}
