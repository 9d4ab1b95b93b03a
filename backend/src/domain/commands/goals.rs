//! Commands for goal, baseline, and day-window configuration.
use chrono::NaiveDate;

/// Replace the current goal wholesale.
#[derive(Debug, Clone)]
pub struct SetGoalCommand {
    pub daily_target_ml: f64,
    pub weekly_target_ml: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Set the baseline directly from user-supplied figures.
///
/// Exactly one of `total_consumption_ml` / `daily_average_ml` is interpreted;
/// the total takes precedence when both are given.
#[derive(Debug, Clone)]
pub struct SetBaselineCommand {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_consumption_ml: Option<f64>,
    pub daily_average_ml: Option<f64>,
}

/// Update the persisted day-window configuration.
#[derive(Debug, Clone)]
pub struct SetDayWindowCommand {
    /// 0-23
    pub end_of_day_hour: u8,
    /// Monday=1 .. Sunday=7
    pub week_start_day: u8,
}
