//! YAML-backed settings repository.
//!
//! The day-window configuration lives in a single `settings.yaml` at the root
//! of the data directory and must survive restarts exactly like the entry
//! table does.
//!
//! ## YAML Format
//!
//! ```yaml
//! day_window:
//!   end_of_day_hour: 3
//!   week_start_day: 1
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::storage::traits::SettingsStorage;
use shared::DayWindowSettings;

/// On-disk settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsDocument {
    day_window: DayWindowSettings,
    /// Data format version for future migrations
    data_format_version: String,
    created_at: String,
    updated_at: String,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            day_window: DayWindowSettings::default(),
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// YAML-based settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load the settings document, creating defaults if it doesn't exist
    fn load_or_create(&self) -> Result<SettingsDocument> {
        let path = self.connection.settings_file_path();

        if path.exists() {
            let yaml_content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {:?}", path))?;
            let document: SettingsDocument = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("failed to parse {:?}", path))?;
            debug!("Loaded settings from {:?}", path);
            Ok(document)
        } else {
            let document = SettingsDocument::default();
            self.save(&document)?;
            info!("Created default settings at {:?}", path);
            Ok(document)
        }
    }

    /// Save the settings document with an atomic temp-file write
    fn save(&self, document: &SettingsDocument) -> Result<()> {
        let path = self.connection.settings_file_path();
        let yaml_content = serde_yaml::to_string(document)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to replace {:?}", path))?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_day_window(&self) -> Result<DayWindowSettings> {
        Ok(self.load_or_create()?.day_window)
    }

    fn update_day_window(&self, settings: &DayWindowSettings) -> Result<()> {
        let mut document = self.load_or_create()?;
        document.day_window = settings.clone();
        document.updated_at = Utc::now().to_rfc3339();
        self.save(&document)?;
        info!(
            "Updated day window: end_of_day_hour={}, week_start_day={}",
            settings.end_of_day_hour, settings.week_start_day
        );
        Ok(())
    }
}
