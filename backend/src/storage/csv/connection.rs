//! Connection handle for the CSV storage backend.
//!
//! A `CsvConnection` owns nothing but the base directory path; repositories
//! clone it freely. The directory is created eagerly so that a missing or
//! unwritable storage location fails at `init` time, not on the first write.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::storage::traits::{
    BaselineStorage, Connection, EntryStorage, GoalStorage, SettingsStorage,
};

use super::{BaselineRepository, EntryRepository, GoalRepository, SettingsRepository};

#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Open a connection rooted at `base_directory`, creating it if needed.
    pub fn new(base_directory: &Path) -> Result<Self> {
        fs::create_dir_all(base_directory).with_context(|| {
            format!("failed to create data directory {:?}", base_directory)
        })?;
        debug!("Opened CSV storage at {:?}", base_directory);
        Ok(Self {
            base_directory: base_directory.to_path_buf(),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn entries_file_path(&self) -> PathBuf {
        self.base_directory.join("entries.csv")
    }

    pub fn goals_file_path(&self) -> PathBuf {
        self.base_directory.join("goals.csv")
    }

    pub fn baselines_file_path(&self) -> PathBuf {
        self.base_directory.join("baselines.csv")
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join("settings.yaml")
    }

    /// Create a CSV file with the given header if it does not exist yet.
    pub(crate) fn ensure_csv_file_exists(&self, path: &Path, header: &str) -> Result<()> {
        if !path.exists() {
            fs::write(path, format!("{}\n", header))
                .with_context(|| format!("failed to create {:?}", path))?;
            debug!("Created CSV file: {:?}", path);
        }
        Ok(())
    }
}

impl Connection for CsvConnection {
    fn entry_storage(&self) -> Arc<dyn EntryStorage> {
        Arc::new(EntryRepository::new(self.clone()))
    }

    fn goal_storage(&self) -> Arc<dyn GoalStorage> {
        Arc::new(GoalRepository::new(self.clone()))
    }

    fn baseline_storage(&self) -> Arc<dyn BaselineStorage> {
        Arc::new(BaselineRepository::new(self.clone()))
    }

    fn settings_storage(&self) -> Arc<dyn SettingsStorage> {
        Arc::new(SettingsRepository::new(self.clone()))
    }
}
