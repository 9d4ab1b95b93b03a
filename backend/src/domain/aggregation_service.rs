//! Aggregation service for the drink ledger.
//!
//! Sums entry volume over date ranges. One rule is load-bearing everywhere:
//! entries with `alcohol_percentage <= 0` are stored and listed by CRUD
//! queries but excluded from every volume aggregate, so logging an
//! alcohol-free drink never pollutes consumption statistics.
//!
//! The service runs over the `EntryStorage` trait, so the durable and
//! in-memory backends share one aggregation code path and cannot drift.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::errors::{LedgerError, LedgerResult};
use crate::storage::traits::{Connection, EntryStorage};

pub struct AggregationService {
    entry_repository: Arc<dyn EntryStorage>,
}

impl AggregationService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            entry_repository: connection.entry_storage(),
        }
    }

    /// Total qualifying volume for a single effective date.
    pub fn daily_total(&self, date: NaiveDate) -> LedgerResult<f64> {
        self.range_total(date, date)
    }

    /// Total qualifying volume over an inclusive date range.
    pub fn range_total(&self, start: NaiveDate, end: NaiveDate) -> LedgerResult<f64> {
        let entries = self
            .entry_repository
            .list_entries_in_range(start, end)
            .map_err(LedgerError::storage)?;

        Ok(entries
            .iter()
            .filter(|e| e.counts_toward_consumption())
            .map(|e| e.volume_ml)
            .sum())
    }

    /// Per-date qualifying totals over an inclusive range, for charting.
    /// Dates with no qualifying entries are absent; callers default to 0.
    pub fn daily_totals_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<BTreeMap<NaiveDate, f64>> {
        let entries = self
            .entry_repository
            .list_entries_in_range(start, end)
            .map_err(LedgerError::storage)?;

        let mut totals = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.counts_toward_consumption()) {
            *totals.entry(entry.date).or_insert(0.0) += entry.volume_ml;
        }
        Ok(totals)
    }

    /// Count of entries in the range that qualify for aggregates.
    pub fn qualifying_entry_count(&self, start: NaiveDate, end: NaiveDate) -> LedgerResult<usize> {
        let entries = self
            .entry_repository
            .list_entries_in_range(start, end)
            .map_err(LedgerError::storage)?;

        Ok(entries
            .iter()
            .filter(|e| e.counts_toward_consumption())
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::entry::DrinkEntry;
    use crate::storage::csv::CsvConnection;
    use crate::storage::memory::MemoryConnection;
    use crate::storage::traits::{Connection, EntryStorage};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: &str, strength: f64, volume: f64, on: NaiveDate) -> DrinkEntry {
        DrinkEntry {
            id: id.to_string(),
            name: "Test".to_string(),
            alcohol_percentage: strength,
            volume_ml: volume,
            date: on,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn seed(storage: &dyn EntryStorage) {
        storage.store_entry(&entry("a", 5.0, 500.0, date(2024, 5, 10))).unwrap();
        storage.store_entry(&entry("b", 0.0, 330.0, date(2024, 5, 10))).unwrap();
        storage.store_entry(&entry("c", 4.2, 250.0, date(2024, 5, 11))).unwrap();
        storage.store_entry(&entry("d", 7.5, 150.0, date(2024, 5, 13))).unwrap();
    }

    #[test]
    fn daily_total_sums_only_qualifying_entries() {
        let connection = MemoryConnection::new();
        seed(&connection);
        let service = AggregationService::new(&connection);

        // The zero-strength 330 ml entry must not count.
        assert_eq!(service.daily_total(date(2024, 5, 10)).unwrap(), 500.0);
    }

    #[test]
    fn daily_total_for_empty_day_is_zero() {
        let connection = MemoryConnection::new();
        seed(&connection);
        let service = AggregationService::new(&connection);

        assert_eq!(service.daily_total(date(2024, 5, 12)).unwrap(), 0.0);
    }

    #[test]
    fn range_total_is_inclusive_on_both_ends() {
        let connection = MemoryConnection::new();
        seed(&connection);
        let service = AggregationService::new(&connection);

        let total = service
            .range_total(date(2024, 5, 10), date(2024, 5, 13))
            .unwrap();
        assert_eq!(total, 500.0 + 250.0 + 150.0);
    }

    #[test]
    fn daily_totals_by_date_omits_empty_dates() {
        let connection = MemoryConnection::new();
        seed(&connection);
        let service = AggregationService::new(&connection);

        let totals = service
            .daily_totals_by_date(date(2024, 5, 10), date(2024, 5, 13))
            .unwrap();

        assert_eq!(totals.len(), 3);
        assert_eq!(totals[&date(2024, 5, 10)], 500.0);
        assert_eq!(totals[&date(2024, 5, 11)], 250.0);
        assert_eq!(totals[&date(2024, 5, 13)], 150.0);
        assert!(!totals.contains_key(&date(2024, 5, 12)));
    }

    #[test]
    fn qualifying_count_ignores_zero_strength_entries() {
        let connection = MemoryConnection::new();
        seed(&connection);
        let service = AggregationService::new(&connection);

        let count = service
            .qualifying_entry_count(date(2024, 5, 10), date(2024, 5, 10))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn csv_and_memory_backends_agree() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let csv_connection = CsvConnection::new(temp_dir.path()).unwrap();
        let memory_connection = MemoryConnection::new();

        seed(csv_connection.entry_storage().as_ref());
        seed(&memory_connection);

        let csv_service = AggregationService::new(&csv_connection);
        let memory_service = AggregationService::new(&memory_connection);

        let start = date(2024, 5, 10);
        let end = date(2024, 5, 13);

        assert_eq!(
            csv_service.range_total(start, end).unwrap(),
            memory_service.range_total(start, end).unwrap()
        );
        assert_eq!(
            csv_service.daily_totals_by_date(start, end).unwrap(),
            memory_service.daily_totals_by_date(start, end).unwrap()
        );
        for day in [start, date(2024, 5, 11), date(2024, 5, 12), end] {
            assert_eq!(
                csv_service.daily_total(day).unwrap(),
                memory_service.daily_total(day).unwrap()
            );
        }
    }
}
