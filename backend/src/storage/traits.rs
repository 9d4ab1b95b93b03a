//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. The
//! durable CSV backend and the in-memory fallback both implement these, so
//! every aggregate runs identical domain code regardless of which path is
//! active.
//!
//! All operations are synchronous; the ledger is a blocking-call API over
//! local storage and the embedding application owns any thread scheduling.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::models::baseline::DomainBaseline;
use crate::domain::models::entry::DrinkEntry;
use crate::domain::models::goal::DomainGoal;
use shared::DayWindowSettings;

/// Trait defining the interface for entry storage operations
pub trait EntryStorage: Send + Sync {
    /// Store an entry. An existing entry with the same id is replaced;
    /// duplicate-id rejection is the service layer's job.
    fn store_entry(&self, entry: &DrinkEntry) -> Result<()>;

    /// Retrieve a specific entry by id
    fn get_entry(&self, entry_id: &str) -> Result<Option<DrinkEntry>>;

    /// List every entry in insertion order (oldest first)
    fn list_entries(&self) -> Result<Vec<DrinkEntry>>;

    /// List entries whose date falls inside the inclusive range, ordered by
    /// date descending with insertion order descending within a date
    /// (most recent first)
    fn list_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DrinkEntry>>;

    /// Replace an existing entry wholesale.
    /// Returns true if the entry was found and updated, false otherwise.
    fn update_entry(&self, entry: &DrinkEntry) -> Result<bool>;

    /// Delete a single entry.
    /// Returns true if the entry was found and deleted, false otherwise.
    fn delete_entry(&self, entry_id: &str) -> Result<bool>;

    /// Remove every entry. Safe to call on an already-empty store.
    fn delete_all_entries(&self) -> Result<()>;
}

/// Trait defining the interface for goal storage operations
///
/// Goals are versioned: every set appends a new record and the current goal
/// is the most recently appended row.
pub trait GoalStorage: Send + Sync {
    /// Append a new goal record
    fn append_goal(&self, goal: &DomainGoal) -> Result<()>;

    /// Get the current goal (the latest record), if any
    fn get_current_goal(&self) -> Result<Option<DomainGoal>>;

    /// List all goal records, most recent first
    fn list_goals(&self) -> Result<Vec<DomainGoal>>;

    /// Remove the full goal history
    fn delete_all_goals(&self) -> Result<()>;
}

/// Trait defining the interface for baseline storage operations
///
/// Baselines are versioned like goals; clearing appends a `cleared` revision
/// rather than deleting history.
pub trait BaselineStorage: Send + Sync {
    /// Append a new baseline record
    fn append_baseline(&self, baseline: &DomainBaseline) -> Result<()>;

    /// Get the current baseline: the latest record, but only while its state
    /// is active
    fn get_current_baseline(&self) -> Result<Option<DomainBaseline>>;

    /// Remove the full baseline history
    fn delete_all_baselines(&self) -> Result<()>;
}

/// Trait defining the interface for persisted day-window settings
pub trait SettingsStorage: Send + Sync {
    /// Get the day-window configuration, creating defaults on first read
    fn get_day_window(&self) -> Result<DayWindowSettings>;

    /// Replace the day-window configuration
    fn update_day_window(&self, settings: &DayWindowSettings) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// A connection hands out repository handles for one physical store. The
/// domain layer only ever sees the trait objects, so the durable and
/// in-memory backends are interchangeable at startup.
pub trait Connection: Send + Sync {
    fn entry_storage(&self) -> Arc<dyn EntryStorage>;
    fn goal_storage(&self) -> Arc<dyn GoalStorage>;
    fn baseline_storage(&self) -> Arc<dyn BaselineStorage>;
    fn settings_storage(&self) -> Arc<dyn SettingsStorage>;
}
