//! # In-Memory Storage Module
//!
//! Implements the same storage traits as the CSV backend over plain vectors.
//! The ledger falls back to this backend when the durable store cannot be
//! opened, so reads keep working while writes are rejected at the facade.
//! Tests also use it to prove the aggregate read path returns identical
//! results over both backends.
//!
//! Ordering semantics mirror the CSV repositories operation for operation:
//! vector order is insertion order, range queries come back most recent
//! first, goal/baseline histories are append-only with the latest row
//! winning.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::models::baseline::{BaselineState, DomainBaseline};
use crate::domain::models::entry::DrinkEntry;
use crate::domain::models::goal::DomainGoal;
use crate::storage::traits::{
    BaselineStorage, Connection, EntryStorage, GoalStorage, SettingsStorage,
};
use shared::DayWindowSettings;

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<Vec<DrinkEntry>>,
    goals: Mutex<Vec<DomainGoal>>,
    baselines: Mutex<Vec<DomainBaseline>>,
    day_window: Mutex<DayWindowSettings>,
}

/// In-memory connection; clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    store: Arc<MemoryStore>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
        mutex
            .lock()
            .map_err(|_| anyhow!("{} store lock poisoned", what))
    }
}

impl EntryStorage for MemoryConnection {
    fn store_entry(&self, entry: &DrinkEntry) -> Result<()> {
        let mut entries = Self::lock(&self.store.entries, "entry")?;
        if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
            entries[pos] = entry.clone();
        } else {
            entries.push(entry.clone());
        }
        Ok(())
    }

    fn get_entry(&self, entry_id: &str) -> Result<Option<DrinkEntry>> {
        let entries = Self::lock(&self.store.entries, "entry")?;
        Ok(entries.iter().find(|e| e.id == entry_id).cloned())
    }

    fn list_entries(&self) -> Result<Vec<DrinkEntry>> {
        let entries = Self::lock(&self.store.entries, "entry")?;
        Ok(entries.clone())
    }

    fn list_entries_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DrinkEntry>> {
        let entries = Self::lock(&self.store.entries, "entry")?;

        let mut in_range: Vec<(usize, DrinkEntry)> = entries
            .iter()
            .cloned()
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
        let mut entries = Self::lock(&self.store.entries, "entry")?;
        if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
            entries[pos] = entry.clone();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let mut entries = Self::lock(&self.store.entries, "entry")?;
        let original_len = entries.len();
        entries.retain(|e| e.id != entry_id);
        Ok(entries.len() < original_len)
    }

    fn delete_all_entries(&self) -> Result<()> {
        let mut entries = Self::lock(&self.store.entries, "entry")?;
        entries.clear();
        Ok(())
    }
}

impl GoalStorage for MemoryConnection {
    fn append_goal(&self, goal: &DomainGoal) -> Result<()> {
        let mut goals = Self::lock(&self.store.goals, "goal")?;
        goals.push(goal.clone());
        Ok(())
    }

    fn get_current_goal(&self) -> Result<Option<DomainGoal>> {
        let goals = Self::lock(&self.store.goals, "goal")?;
        Ok(goals.last().cloned())
    }

    fn list_goals(&self) -> Result<Vec<DomainGoal>> {
        let goals = Self::lock(&self.store.goals, "goal")?;
        Ok(goals.iter().rev().cloned().collect())
    }

    fn delete_all_goals(&self) -> Result<()> {
        let mut goals = Self::lock(&self.store.goals, "goal")?;
        goals.clear();
        Ok(())
    }
}

impl BaselineStorage for MemoryConnection {
    fn append_baseline(&self, baseline: &DomainBaseline) -> Result<()> {
        let mut baselines = Self::lock(&self.store.baselines, "baseline")?;
        baselines.push(baseline.clone());
        Ok(())
    }

    fn get_current_baseline(&self) -> Result<Option<DomainBaseline>> {
        let baselines = Self::lock(&self.store.baselines, "baseline")?;
        Ok(baselines
            .last()
            .filter(|b| b.state == BaselineState::Active)
            .cloned())
    }

    fn delete_all_baselines(&self) -> Result<()> {
        let mut baselines = Self::lock(&self.store.baselines, "baseline")?;
        baselines.clear();
        Ok(())
    }
}

impl SettingsStorage for MemoryConnection {
    fn get_day_window(&self) -> Result<DayWindowSettings> {
        let day_window = Self::lock(&self.store.day_window, "settings")?;
        Ok(day_window.clone())
    }

    fn update_day_window(&self, settings: &DayWindowSettings) -> Result<()> {
        let mut day_window = Self::lock(&self.store.day_window, "settings")?;
        *day_window = settings.clone();
        Ok(())
    }
}

impl Connection for MemoryConnection {
    fn entry_storage(&self) -> Arc<dyn EntryStorage> {
        Arc::new(self.clone())
    }

    fn goal_storage(&self) -> Arc<dyn GoalStorage> {
        Arc::new(self.clone())
    }

    fn baseline_storage(&self) -> Arc<dyn BaselineStorage> {
        Arc::new(self.clone())
    }

    fn settings_storage(&self) -> Arc<dyn SettingsStorage> {
        Arc::new(self.clone())
    }
}
