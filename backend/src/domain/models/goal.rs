//! Domain model for a consumption goal.
//!
//! Goals are stored as append-only versioned rows; the current goal is the
//! most recently created row. Setting a new goal replaces the old one by
//! appending, which preserves the full history for future features.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainGoal {
    pub id: String,
    /// Daily consumption ceiling in millilitres; 0 means unset
    pub daily_target_ml: f64,
    /// Weekly consumption ceiling in millilitres; 0 means unset
    pub weekly_target_ml: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// RFC 3339 creation timestamp; the newest row wins
    pub created_at: String,
}

impl DomainGoal {
    pub fn generate_id(now_millis: u64) -> String {
        format!("goal::{}", now_millis)
    }
}
