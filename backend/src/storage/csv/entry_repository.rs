//! CSV-backed entry repository.
//!
//! Entries live in a single `entries.csv`. Reads load the whole file,
//! mutations rewrite it atomically. File order is insertion order, which is
//! what the most-recent-first tie-break in range queries leans on.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, Writer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::entry::DrinkEntry;
use crate::storage::traits::EntryStorage;

const ENTRIES_HEADER: &str = "id,name,alcohol_percentage,volume_ml,date,notes,created_at";

/// CSV record structure for entries
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    id: String,
    name: String,
    alcohol_percentage: f64,
    volume_ml: f64,
    date: NaiveDate,
    notes: String,
    created_at: DateTime<Utc>,
}

impl From<DrinkEntry> for EntryRecord {
    fn from(entry: DrinkEntry) -> Self {
        EntryRecord {
            id: entry.id,
            name: entry.name,
            alcohol_percentage: entry.alcohol_percentage,
            volume_ml: entry.volume_ml,
            date: entry.date,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }
}

impl From<EntryRecord> for DrinkEntry {
    fn from(record: EntryRecord) -> Self {
        DrinkEntry {
            id: record.id,
            name: record.name,
            alcohol_percentage: record.alcohol_percentage,
            volume_ml: record.volume_ml,
            date: record.date,
            notes: record.notes,
            created_at: record.created_at,
        }
    }
}

/// CSV-based entry repository
#[derive(Clone)]
pub struct EntryRepository {
    connection: CsvConnection,
}

impl EntryRepository {
    /// Create a new CSV entry repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all entries from the CSV file in insertion order
    fn read_entries(&self) -> Result<Vec<DrinkEntry>> {
        let file_path = self.connection.entries_file_path();
        self.connection
            .ensure_csv_file_exists(&file_path, ENTRIES_HEADER)?;

        let file = File::open(&file_path)
            .with_context(|| format!("failed to open {:?}", file_path))?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut entries = Vec::new();
        for result in csv_reader.deserialize::<EntryRecord>() {
            match result {
                Ok(record) => entries.push(DrinkEntry::from(record)),
                Err(e) => {
                    warn!("Failed to parse entry record: {}. Skipping.", e);
                    continue;
                }
            }
        }

        Ok(entries)
    }

    /// Write all entries back to the CSV file atomically
    fn write_entries(&self, entries: &[DrinkEntry]) -> Result<()> {
        let file_path = self.connection.entries_file_path();
        let temp_file_path = file_path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_file_path)
                .with_context(|| format!("failed to create {:?}", temp_file_path))?;
            let writer = BufWriter::new(temp_file);
            let mut csv_writer = Writer::from_writer(writer);

            for entry in entries {
                let record = EntryRecord::from(entry.clone());
                csv_writer.serialize(record)?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_file_path, &file_path)
            .with_context(|| format!("failed to replace {:?}", file_path))?;

        debug!("Wrote {} entries to {:?}", entries.len(), file_path);
        Ok(())
    }
}

impl EntryStorage for EntryRepository {
    fn store_entry(&self, entry: &DrinkEntry) -> Result<()> {
        let mut entries = self.read_entries()?;
        if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
            entries[pos] = entry.clone();
        } else {
            entries.push(entry.clone());
        }
        self.write_entries(&entries)
    }

    fn get_entry(&self, entry_id: &str) -> Result<Option<DrinkEntry>> {
        Ok(self
            .read_entries()?
            .into_iter()
            .find(|e| e.id == entry_id))
    }

    fn list_entries(&self) -> Result<Vec<DrinkEntry>> {
        self.read_entries()
    }

    fn list_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DrinkEntry>> {
        let entries = self.read_entries()?;

        // Keep the insertion index around so same-date, same-timestamp rows
        // still come back newest-insertion-first.
        let mut in_range: Vec<(usize, DrinkEntry)> = entries
            .into_iter()
            .enumerate()
            .filter(|(_, e)| e.date >= start && e.date <= end)
            .collect();

        in_range.sort_by(|(index_a, a), (index_b, b)| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(index_b.cmp(index_a))
        });

        Ok(in_range.into_iter().map(|(_, e)| e).collect())
    }

    fn update_entry(&self, entry: &DrinkEntry) -> Result<bool> {
        let mut entries = self.read_entries()?;
        if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
            entries[pos] = entry.clone();
            self.write_entries(&entries)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let mut entries = self.read_entries()?;
        let original_len = entries.len();
        entries.retain(|e| e.id != entry_id);

        if entries.len() < original_len {
            self.write_entries(&entries)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn delete_all_entries(&self) -> Result<()> {
        self.write_entries(&[])
    }
}
