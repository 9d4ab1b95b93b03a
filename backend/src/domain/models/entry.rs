//! Domain model for a logged drink.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    pub id: String,
    pub name: String,
    /// Percent ABV. Entries at or below zero are stored but never counted
    /// toward consumption aggregates.
    pub alcohol_percentage: f64,
    pub volume_ml: f64,
    /// Effective date the entry is attributed to, already shifted by the
    /// end-of-day hour at creation time. Field updates leave it untouched.
    pub date: NaiveDate,
    pub notes: String,
    /// Insertion timestamp, used as the tie-break for most-recent-first
    /// ordering within a date.
    pub created_at: DateTime<Utc>,
}

impl DrinkEntry {
    /// Generate a unique entry ID from the current timestamp.
    /// Format: dr-<timestamp_ms>-<random_suffix>
    /// Example: dr-1715000000123-af3c
    pub fn generate_id(timestamp_ms: u64) -> String {
        let random_suffix = Self::generate_random_suffix(4);
        format!("dr-{}-{}", timestamp_ms, random_suffix)
    }

    /// True when the entry counts toward volume aggregates.
    pub fn counts_toward_consumption(&self) -> bool {
        self.alcohol_percentage > 0.0
    }

    /// Generate a random hex suffix for entry IDs.
    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_timestamp_and_suffix() {
        let id = DrinkEntry::generate_id(1715000000123);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "dr");
        assert_eq!(parts[1], "1715000000123");
        assert!(!parts[2].is_empty());
    }

    #[test]
    fn zero_strength_entries_do_not_count() {
        let entry = DrinkEntry {
            id: "dr-1-0000".to_string(),
            name: "Alcohol-free lager".to_string(),
            alcohol_percentage: 0.0,
            volume_ml: 330.0,
            date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            notes: String::new(),
            created_at: Utc::now(),
        };
        assert!(!entry.counts_toward_consumption());
    }
}
