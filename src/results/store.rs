//! Results Store - fixed-path CSV persistence for measurement records
//!
//! Each run replaces the whole file. There is no incremental write: records
//! only reach disk once the run has finished.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::experiment::MeasurementRecord;
use crate::Result;

/// File name inside the results directory
pub const RESULTS_FILE_NAME: &str = "output.csv";

/// CSV header written even when there are no records
const HEADER: [&str; 6] = [
    "contract_name",
    "index",
    "add_gas_used",
    "add_time",
    "delete_gas_used",
    "delete_time",
];

/// CSV store at a fixed path.
///
/// `save` and `load` never fail: errors are logged and reported as `None`,
/// so a persistence problem does not crash the caller. The `try_` variants
/// return the error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    /// Store writing `<results_dir>/output.csv`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(results_dir: P) -> Self {
        Self {
            path: results_dir.as_ref().join(RESULTS_FILE_NAME),
        }
    }

    /// Results file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the results file with `records`.
    ///
    /// Returns the path on success; logs the error and returns `None`
    /// otherwise.
    #[must_use = "a None result means nothing was saved"]
    pub fn save(&self, records: &[MeasurementRecord]) -> Option<PathBuf> {
        match self.try_save(records) {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    records = records.len(),
                    "Experiment results saved successfully!"
                );
                Some(path)
            }
            Err(e) => {
                error!("Error saving experiment results: {e}");
                None
            }
        }
    }

    /// Overwrite the results file with `records`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the file written.
    pub fn try_save(&self, records: &[MeasurementRecord]) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(self.path.clone())
    }

    /// Read every record back.
    ///
    /// `None` with a warning when no file exists yet, `None` with an error
    /// when it cannot be parsed.
    #[must_use]
    pub fn load(&self) -> Option<Vec<MeasurementRecord>> {
        match self.try_load() {
            Ok(Some(records)) => Some(records),
            Ok(None) => {
                warn!(
                    path = %self.path.display(),
                    "No experiment data found. Please run an experiment first."
                );
                None
            }
            Err(e) => {
                error!("Error loading experiment data: {e}");
                None
            }
        }
    }

    /// Read every record back; `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a row is malformed.
    pub fn try_load(&self) -> Result<Option<Vec<MeasurementRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<MeasurementRecord>, _>>()?;
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::builder("BasicContract", 0)
                .add(143_512, 12.25)
                .delete(31_002, 7.5)
                .build(),
            MeasurementRecord::builder("LightweightContract", 0)
                .add(98_220, 10.125)
                .delete(22_410, 6.0)
                .build(),
        ]
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path().join("results"));

        let path = store.save(&sample()).unwrap();
        assert_eq!(path, dir.path().join("results").join("output.csv"));
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path());

        store.save(&sample()).unwrap();
        store.save(&sample()[..1]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_save_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path());

        store.save(&[]).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.trim_end(), HEADER.join(","));
        assert_eq!(store.load().unwrap(), Vec::new());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path());
        assert!(store.load().is_none());
        assert!(store.try_load().unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(dir.path());
        std::fs::write(store.path(), "contract_name,index\nBasicContract,abc\n").unwrap();

        assert!(store.load().is_none());
        assert!(store.try_load().is_err());
    }

    #[test]
    fn test_save_into_unwritable_location_is_none() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the results directory should be
        let blocker = dir.path().join("results");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = ResultsStore::new(&blocker);
        assert!(store.save(&sample()).is_none());
    }
}
