//! Dataset loading
//!
//! A dataset is any CSV with a header row. Values are kept as the strings
//! that appear in the file; rows are numbered from zero in file order.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::{Error, Result};

/// One input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    index: usize,
    values: Vec<String>,
}

impl DatasetRow {
    /// Zero-based position in the source file.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Column values as strings, in header order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// An in-memory table of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    headers: Vec<String>,
    rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Load a CSV file. The dataset is named after the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if the file cannot be opened or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Dataset(format!("Failed to open {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        Self::from_reader(name, file)
    }

    /// Parse CSV from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] on malformed CSV, including rows whose
    /// width differs from the header.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| Error::Dataset(format!("Failed to read header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| Error::Dataset(format!("Failed to read row {index}: {e}")))?;
            rows.push(DatasetRow {
                index,
                values: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    /// Display name (the file name when loaded from disk).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the file has a header but no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render a row as a two-line CSV document (header + values), the
    /// payload uploaded to the off-chain store.
    ///
    /// # Errors
    ///
    /// Returns error if CSV serialization fails.
    pub fn row_csv(&self, row: &DatasetRow) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        writer.write_record(row.values())?;
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Dataset(format!("Failed to flush row {}: {e}", row.index)))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Dataset(format!("Row {} is not UTF-8: {e}", row.index)))
    }

    /// `(column, value)` pairs of a row, for progress display.
    pub fn labelled<'a>(&'a self, row: &'a DatasetRow) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(row.values.iter().map(String::as_str))
    }
}

/// Copy an uploaded dataset into `datasets_dir`, keeping its file name.
///
/// Returns the stored path, or `None` after logging the error when the copy
/// fails.
pub fn save_upload<P: AsRef<Path>, Q: AsRef<Path>>(source: P, datasets_dir: Q) -> Option<PathBuf> {
    match try_save_upload(source.as_ref(), datasets_dir.as_ref()) {
        Ok(path) => {
            info!(path = %path.display(), "dataset saved");
            Some(path)
        }
        Err(e) => {
            error!("Error saving file: {e}");
            None
        }
    }
}

fn try_save_upload(source: &Path, datasets_dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("Not a file: {}", source.display())))?;
    std::fs::create_dir_all(datasets_dir)?;
    let target = datasets_dir.join(file_name);
    if target != source {
        std::fs::copy(source, &target)?;
    }
    Ok(target)
}
