use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single logged drink.
///
/// Entry ID format: `dr-<epoch_millis>-<hex suffix>` for entries minted by
/// the core, or any caller-supplied opaque string for imported data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    pub id: String,
    /// Drink label as entered by the user (non-empty)
    pub name: String,
    /// Percent alcohol by volume; `<= 0` marks a non-alcoholic drink
    pub alcohol_percentage: f64,
    /// Volume in millilitres (strictly positive)
    pub volume_ml: f64,
    /// Effective date the entry is attributed to (ISO 8601, `YYYY-MM-DD`)
    pub date: NaiveDate,
    /// Free-text notes, may be empty
    pub notes: String,
}

/// The active consumption goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionGoal {
    pub id: String,
    /// Daily ceiling in millilitres; 0 means "no daily goal"
    pub daily_target_ml: f64,
    /// Weekly ceiling in millilitres; 0 means "no weekly goal"
    pub weekly_target_ml: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A historical average used as the comparison point for progress tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub id: String,
    pub average_daily_ml: f64,
    /// Always `average_daily_ml * 7`
    pub average_weekly_ml: f64,
    /// Effective date the baseline was recorded on
    pub calculated_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Derived progress figures comparing current consumption to the baseline.
///
/// The "current averages" are trailing-window totals: the last 1, 7, and 30
/// effective days ending today. Reduction percentages are
/// `(baseline - current) / baseline * 100`, defined as `0.0` when the
/// corresponding baseline average is zero. Negative values mean consumption
/// went up and are reported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub current_daily_average: f64,
    pub current_weekly_average: f64,
    pub current_monthly_average: f64,
    pub reduction_percentage_daily: f64,
    pub reduction_percentage_weekly: f64,
    pub reduction_percentage_monthly: f64,
    pub days_since_baseline: i64,
    pub baseline_daily_average: f64,
    pub baseline_weekly_average: f64,
    /// `baseline_daily_average * 30`
    pub baseline_monthly_average: f64,
}

/// Day-attribution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWindowSettings {
    /// Hour of day (0-23) before which a timestamp belongs to the previous
    /// calendar date. Drinks logged at 1am count toward yesterday's session.
    pub end_of_day_hour: u8,
    /// First day of the week, Monday=1 .. Sunday=7
    pub week_start_day: u8,
}

impl Default for DayWindowSettings {
    fn default() -> Self {
        Self {
            end_of_day_hour: 3,
            week_start_day: 1,
        }
    }
}

/// Ordered list of entries returned by range queries (most recent first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<DrinkEntry>,
}

/// Response containing the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDataResponse {
    /// Full delimited-text document, one entry per line after the header
    pub csv_content: String,
    /// Suggested filename, e.g. `drinklog_export_20250607.csv`
    pub filename: String,
    pub entry_count: usize,
}

/// Response after writing an export document to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub entry_count: usize,
}

/// Outcome of an import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDataResult {
    /// Entries actually added to the store
    pub imported_count: usize,
    /// Lines skipped (malformed or duplicate id)
    pub skipped_count: usize,
}

/// Result of initializing the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitStatus {
    /// Durable storage opened successfully
    Ready,
    /// init was called on an already-initialized ledger; state unchanged
    AlreadyInitialized,
    /// Durable storage unavailable; serving from the in-memory fallback
    Degraded,
}

/// Current state of the ledger handle, for collaborator display logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub initialized: bool,
    /// True when reads are served from the in-memory fallback and writes are
    /// rejected
    pub degraded: bool,
    pub storage_path: Option<String>,
}
