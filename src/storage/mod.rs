//! Baseline Store - no-fault recordings per machine
//!
//! Baselines live in one flat directory, one file per machine:
//!
//! ```text
//! machine_data/
//! ├── gearbox_a_no_fault.csv
//! └── pump_3_no_fault.csv
//! ```
//!
//! The store is read-only. Registering a new machine means dropping a
//! `<machine>_no_fault.csv` file into the directory.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::acquisition::{load_csv, LoadError};
use crate::types::Dataset;

/// File name suffix that marks a machine's baseline recording.
pub const BASELINE_SUFFIX: &str = "_no_fault.csv";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to list baseline directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid machine name '{0}'")]
    InvalidMachineName(String),

    #[error("failed to load baseline for '{machine}': {source}")]
    Load {
        machine: String,
        #[source]
        source: LoadError,
    },
}

/// Directory of per-machine baselines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registered machine names, sorted.
    ///
    /// A missing directory means no machines yet and is not an error.
    pub fn machines(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            debug!(dir = %self.dir.display(), "Baseline directory does not exist");
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut machines: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name();
                let name = file_name.to_str()?;
                name.strip_suffix(BASELINE_SUFFIX)
                    .filter(|machine| !machine.is_empty())
                    .map(str::to_string)
            })
            .collect();
        machines.sort();

        debug!(dir = %self.dir.display(), count = machines.len(), "Listed machines");
        Ok(machines)
    }

    /// Path where a machine's baseline is (or would be) stored.
    pub fn baseline_path(&self, machine: &str) -> Result<PathBuf, StoreError> {
        validate_machine_name(machine)?;
        Ok(self.dir.join(format!("{machine}{BASELINE_SUFFIX}")))
    }

    pub fn has_baseline(&self, machine: &str) -> Result<bool, StoreError> {
        Ok(self.baseline_path(machine)?.is_file())
    }

    /// Load a machine's baseline, `None` when the machine is not registered.
    pub fn load_baseline(&self, machine: &str) -> Result<Option<Dataset>, StoreError> {
        let path = self.baseline_path(machine)?;
        if !path.is_file() {
            info!(machine, path = %path.display(), "No baseline registered");
            return Ok(None);
        }

        let dataset = load_csv(&path).map_err(|source| StoreError::Load {
            machine: machine.to_string(),
            source,
        })?;
        Ok(Some(dataset))
    }
}

fn validate_machine_name(machine: &str) -> Result<(), StoreError> {
    let trimmed = machine.trim();
    let bad = trimmed.is_empty()
        || trimmed != machine
        || machine == "."
        || machine == ".."
        || machine.contains(['/', '\\']);
    if bad {
        return Err(StoreError::InvalidMachineName(machine.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_machines_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in [
            "pump_no_fault.csv",
            "gearbox_no_fault.csv",
            "gearbox_run2.csv",
            "_no_fault.csv",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "sensor1\n1.0\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("fan_no_fault.csv")).unwrap();

        let store = BaselineStore::new(dir.path());
        assert_eq!(store.machines().unwrap(), vec!["gearbox", "pump"]);
    }

    #[test]
    fn test_missing_directory_has_no_machines() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::new(dir.path().join("absent"));
        assert!(store.machines().unwrap().is_empty());
    }

    #[test]
    fn test_load_baseline() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("gearbox_no_fault.csv"),
            "time,sensor1\n0.0,1.0\n0.001,2.0\n",
        )
        .unwrap();
        let store = BaselineStore::new(dir.path());

        let dataset = store.load_baseline("gearbox").unwrap().expect("registered");
        assert_eq!(dataset.samples("sensor1"), Some(&[1.0, 2.0][..]));
        assert!(store.load_baseline("unknown").unwrap().is_none());
        assert!(store.has_baseline("gearbox").unwrap());
    }

    #[test]
    fn test_invalid_machine_names_rejected() {
        let store = BaselineStore::new("machine_data");
        for bad in ["", " pump", "../etc", "a/b", ".."] {
            assert!(matches!(
                store.baseline_path(bad),
                Err(StoreError::InvalidMachineName(_))
            ));
        }
        assert_eq!(
            store.baseline_path("pump_3").unwrap(),
            PathBuf::from("machine_data/pump_3_no_fault.csv")
        );
    }

    #[test]
    fn test_unparseable_baseline_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad_no_fault.csv"), "label\nfoo\n").unwrap();
        let store = BaselineStore::new(dir.path());
        assert!(matches!(
            store.load_baseline("bad"),
            Err(StoreError::Load { source: LoadError::NoNumericData, .. })
        ));
    }
}
