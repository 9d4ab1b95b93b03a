//! Commands and queries for entry CRUD.
use chrono::NaiveDate;

use crate::domain::models::entry::DrinkEntry;

/// Create an entry attributed to today's effective date.
#[derive(Debug, Clone)]
pub struct AddEntryCommand {
    pub name: String,
    pub alcohol_percentage: f64,
    pub volume_ml: f64,
    pub notes: String,
}

/// Create an entry with a caller-supplied id and explicit date.
/// Used by imports and by backfilling past days from the calendar.
#[derive(Debug, Clone)]
pub struct AddEntryWithDateCommand {
    pub id: String,
    pub name: String,
    pub alcohol_percentage: f64,
    pub volume_ml: f64,
    pub date: NaiveDate,
    pub notes: String,
}

/// Full replacement of an entry's mutable fields. The effective date is not
/// recomputed here; only `UpdateEntryDateCommand` changes it.
#[derive(Debug, Clone)]
pub struct UpdateEntryCommand {
    pub id: String,
    pub name: String,
    pub alcohol_percentage: f64,
    pub volume_ml: f64,
    pub notes: String,
}

/// Move an entry to a different effective date.
#[derive(Debug, Clone)]
pub struct UpdateEntryDateCommand {
    pub id: String,
    pub date: NaiveDate,
}

/// Inclusive date-range query.
#[derive(Debug, Clone)]
pub struct EntryRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Entries ordered by date descending, insertion order descending within a
/// date (most recent first).
#[derive(Debug, Clone)]
pub struct EntryListResult {
    pub entries: Vec<DrinkEntry>,
}
