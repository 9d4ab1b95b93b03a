//! Domain model for a consumption baseline.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a baseline row in the append-only store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BaselineState {
    Active,
    Cleared,
}

impl BaselineState {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineState::Active => "active",
            BaselineState::Cleared => "cleared",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BaselineState::Active),
            "cleared" => Ok(BaselineState::Cleared),
            _ => Err(format!("Invalid baseline state: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBaseline {
    pub id: String,
    pub average_daily_ml: f64,
    /// Derived: `average_daily_ml * 7`
    pub average_weekly_ml: f64,
    /// Effective date the baseline was recorded on
    pub calculated_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub state: BaselineState,
    /// RFC 3339 creation timestamp; the newest row wins
    pub created_at: String,
}

impl DomainBaseline {
    pub fn generate_id(now_millis: u64) -> String {
        format!("baseline::{}", now_millis)
    }
}
