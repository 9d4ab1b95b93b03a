//! Entry service domain logic for the drink ledger.
//!
//! Owns validation and CRUD orchestration for drink entries. Dates are
//! assigned here: a plain add computes today's effective date from the
//! persisted day-window settings, while field updates deliberately leave the
//! stored date untouched (only the explicit update-date operation moves an
//! entry to another day).

use chrono::{Local, Utc};
use log::info;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::commands::entries::{
    AddEntryCommand, AddEntryWithDateCommand, EntryListResult, EntryRangeQuery,
    UpdateEntryCommand, UpdateEntryDateCommand,
};
use crate::domain::day_window;
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::models::entry::DrinkEntry;
use crate::storage::traits::{Connection, EntryStorage, SettingsStorage};

pub struct EntryService {
    entry_repository: Arc<dyn EntryStorage>,
    settings_repository: Arc<dyn SettingsStorage>,
}

impl EntryService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            entry_repository: connection.entry_storage(),
            settings_repository: connection.settings_storage(),
        }
    }

    /// Today's effective date under the persisted end-of-day hour.
    pub fn effective_today(&self) -> LedgerResult<chrono::NaiveDate> {
        let window = self
            .settings_repository
            .get_day_window()
            .map_err(LedgerError::storage)?;
        let now = Local::now().naive_local();
        Ok(day_window::effective_date(now, window.end_of_day_hour))
    }

    pub fn add_entry(&self, command: AddEntryCommand) -> LedgerResult<DrinkEntry> {
        validate_entry_fields(&command.name, command.alcohol_percentage, command.volume_ml)?;

        let date = self.effective_today()?;
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| LedgerError::Storage(e.to_string()))?
            .as_millis() as u64;

        let entry = DrinkEntry {
            id: DrinkEntry::generate_id(now_millis),
            name: command.name,
            alcohol_percentage: command.alcohol_percentage,
            volume_ml: command.volume_ml,
            date,
            notes: command.notes,
            created_at: Utc::now(),
        };

        self.entry_repository
            .store_entry(&entry)
            .map_err(LedgerError::storage)?;

        info!("Added entry {} for {}", entry.id, entry.date);
        Ok(entry)
    }

    pub fn add_entry_with_date(&self, command: AddEntryWithDateCommand) -> LedgerResult<DrinkEntry> {
        if command.id.trim().is_empty() {
            return Err(LedgerError::InvalidField("Entry id cannot be empty".to_string()));
        }
        validate_entry_fields(&command.name, command.alcohol_percentage, command.volume_ml)?;

        let existing = self
            .entry_repository
            .get_entry(&command.id)
            .map_err(LedgerError::storage)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateId(command.id));
        }

        let entry = DrinkEntry {
            id: command.id,
            name: command.name,
            alcohol_percentage: command.alcohol_percentage,
            volume_ml: command.volume_ml,
            date: command.date,
            notes: command.notes,
            created_at: Utc::now(),
        };

        self.entry_repository
            .store_entry(&entry)
            .map_err(LedgerError::storage)?;

        info!("Added entry {} with explicit date {}", entry.id, entry.date);
        Ok(entry)
    }

    /// Full replacement of all mutable fields. The stored date and creation
    /// timestamp are preserved.
    pub fn update_entry(&self, command: UpdateEntryCommand) -> LedgerResult<DrinkEntry> {
        validate_entry_fields(&command.name, command.alcohol_percentage, command.volume_ml)?;

        let existing = self
            .entry_repository
            .get_entry(&command.id)
            .map_err(LedgerError::storage)?
            .ok_or_else(|| LedgerError::NotFound(command.id.clone()))?;

        let updated = DrinkEntry {
            id: existing.id,
            name: command.name,
            alcohol_percentage: command.alcohol_percentage,
            volume_ml: command.volume_ml,
            date: existing.date,
            notes: command.notes,
            created_at: existing.created_at,
        };

        let found = self
            .entry_repository
            .update_entry(&updated)
            .map_err(LedgerError::storage)?;
        if !found {
            return Err(LedgerError::NotFound(updated.id));
        }

        info!("Updated entry {}", updated.id);
        Ok(updated)
    }

    pub fn update_entry_date(&self, command: UpdateEntryDateCommand) -> LedgerResult<DrinkEntry> {
        let mut entry = self
            .entry_repository
            .get_entry(&command.id)
            .map_err(LedgerError::storage)?
            .ok_or_else(|| LedgerError::NotFound(command.id.clone()))?;

        entry.date = command.date;

        let found = self
            .entry_repository
            .update_entry(&entry)
            .map_err(LedgerError::storage)?;
        if !found {
            return Err(LedgerError::NotFound(entry.id));
        }

        info!("Moved entry {} to {}", entry.id, entry.date);
        Ok(entry)
    }

    /// Store an already-built entry, keeping its creation timestamp.
    /// Used by import so re-imported data keeps its original ordering.
    pub fn import_entry(&self, entry: DrinkEntry) -> LedgerResult<DrinkEntry> {
        if entry.id.trim().is_empty() {
            return Err(LedgerError::InvalidField("Entry id cannot be empty".to_string()));
        }
        validate_entry_fields(&entry.name, entry.alcohol_percentage, entry.volume_ml)?;

        let existing = self
            .entry_repository
            .get_entry(&entry.id)
            .map_err(LedgerError::storage)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateId(entry.id));
        }

        self.entry_repository
            .store_entry(&entry)
            .map_err(LedgerError::storage)?;
        Ok(entry)
    }

    pub fn delete_entry(&self, entry_id: &str) -> LedgerResult<()> {
        let deleted = self
            .entry_repository
            .delete_entry(entry_id)
            .map_err(LedgerError::storage)?;
        if !deleted {
            return Err(LedgerError::NotFound(entry_id.to_string()));
        }
        info!("Deleted entry {}", entry_id);
        Ok(())
    }

    pub fn delete_all_entries(&self) -> LedgerResult<()> {
        self.entry_repository
            .delete_all_entries()
            .map_err(LedgerError::storage)?;
        info!("Deleted all entries");
        Ok(())
    }

    pub fn entries_in_range(&self, query: EntryRangeQuery) -> LedgerResult<EntryListResult> {
        if query.start_date > query.end_date {
            return Err(LedgerError::InvalidField(
                "Range start must not be after range end".to_string(),
            ));
        }
        let entries = self
            .entry_repository
            .list_entries_in_range(query.start_date, query.end_date)
            .map_err(LedgerError::storage)?;
        Ok(EntryListResult { entries })
    }

    pub fn list_all_entries(&self) -> LedgerResult<Vec<DrinkEntry>> {
        self.entry_repository
            .list_entries()
            .map_err(LedgerError::storage)
    }
}

fn validate_entry_fields(name: &str, alcohol_percentage: f64, volume_ml: f64) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::InvalidField("Name cannot be empty".to_string()));
    }
    if !(0.0..=100.0).contains(&alcohol_percentage) {
        return Err(LedgerError::InvalidField(
            "Alcohol percentage must be between 0 and 100".to_string(),
        ));
    }
    if volume_ml <= 0.0 {
        return Err(LedgerError::InvalidField("Volume must be positive".to_string()));
    }
    Ok(())
}
