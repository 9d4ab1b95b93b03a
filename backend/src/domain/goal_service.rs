//! Goal and baseline domain logic for the drink ledger.
//!
//! This module owns the single current goal and baseline plus the derived
//! progress metrics.
//!
//! ## Business Rules
//!
//! - Goals and baselines are process-wide singletons: setting a new one
//!   replaces the old wholesale (stored as an append-only history; only the
//!   latest row is ever served).
//! - A baseline computed from a period divides the gated volume total by the
//!   inclusive day count; a period with no qualifying entries is rejected
//!   rather than producing a zero average by accident.
//! - Reduction percentages are `(baseline - current) / baseline * 100` with
//!   a zero baseline defined as 0.0 reduction. Negative values mean
//!   consumption went up and are reported unchanged.

use chrono::Utc;
use log::info;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::aggregation_service::AggregationService;
use crate::domain::commands::goals::{SetBaselineCommand, SetGoalCommand};
use crate::domain::day_window;
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::models::baseline::{BaselineState, DomainBaseline};
use crate::domain::models::goal::DomainGoal;
use crate::storage::traits::{BaselineStorage, Connection, GoalStorage, SettingsStorage};
use shared::ProgressMetrics;

/// Days the baseline daily average is scaled by for the monthly comparison.
const BASELINE_MONTH_DAYS: f64 = 30.0;

pub struct GoalService {
    goal_repository: Arc<dyn GoalStorage>,
    baseline_repository: Arc<dyn BaselineStorage>,
    settings_repository: Arc<dyn SettingsStorage>,
    aggregation_service: AggregationService,
}

impl GoalService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            goal_repository: connection.goal_storage(),
            baseline_repository: connection.baseline_storage(),
            settings_repository: connection.settings_storage(),
            aggregation_service: AggregationService::new(connection),
        }
    }

    /// Replace the current goal wholesale.
    pub fn set_goal(&self, command: SetGoalCommand) -> LedgerResult<DomainGoal> {
        if command.daily_target_ml < 0.0 {
            return Err(LedgerError::InvalidField(
                "Daily target must be non-negative".to_string(),
            ));
        }
        if command.weekly_target_ml < 0.0 {
            return Err(LedgerError::InvalidField(
                "Weekly target must be non-negative".to_string(),
            ));
        }
        if command.start_date > command.end_date {
            return Err(LedgerError::InvalidField(
                "Goal start must not be after goal end".to_string(),
            ));
        }

        let goal = DomainGoal {
            id: DomainGoal::generate_id(now_millis()?),
            daily_target_ml: command.daily_target_ml,
            weekly_target_ml: command.weekly_target_ml,
            start_date: command.start_date,
            end_date: command.end_date,
            created_at: Utc::now().to_rfc3339(),
        };

        self.goal_repository
            .append_goal(&goal)
            .map_err(LedgerError::storage)?;

        info!("Set goal {}: {} ml/day, {} ml/week", goal.id, goal.daily_target_ml, goal.weekly_target_ml);
        Ok(goal)
    }

    pub fn current_goal(&self) -> LedgerResult<Option<DomainGoal>> {
        self.goal_repository
            .get_current_goal()
            .map_err(LedgerError::storage)
    }

    /// Derive the baseline from what was actually logged over a period.
    pub fn set_baseline_from_period(
        &self,
        period_start: chrono::NaiveDate,
        period_end: chrono::NaiveDate,
    ) -> LedgerResult<DomainBaseline> {
        if period_start > period_end {
            return Err(LedgerError::InvalidField(
                "Baseline period start must not be after period end".to_string(),
            ));
        }

        let qualifying = self
            .aggregation_service
            .qualifying_entry_count(period_start, period_end)?;
        if qualifying == 0 {
            return Err(LedgerError::EmptyPeriod(format!(
                "No entries found between {} and {}",
                period_start, period_end
            )));
        }

        let total = self
            .aggregation_service
            .range_total(period_start, period_end)?;
        let days = day_window::days_in_period(period_start, period_end) as f64;
        let average_daily = total / days;

        self.record_baseline(average_daily, period_start, period_end)
    }

    /// Set the baseline from user-supplied figures. The total takes
    /// precedence when both inputs are given.
    pub fn set_baseline_direct(&self, command: SetBaselineCommand) -> LedgerResult<DomainBaseline> {
        if command.period_start > command.period_end {
            return Err(LedgerError::InvalidField(
                "Baseline period start must not be after period end".to_string(),
            ));
        }

        let days = day_window::days_in_period(command.period_start, command.period_end) as f64;
        let average_daily = match (command.total_consumption_ml, command.daily_average_ml) {
            (Some(total), _) => total / days,
            (None, Some(daily_average)) => daily_average,
            (None, None) => {
                return Err(LedgerError::MissingInput(
                    "Either total consumption or daily average must be provided".to_string(),
                ))
            }
        };

        self.record_baseline(average_daily, command.period_start, command.period_end)
    }

    pub fn current_baseline(&self) -> LedgerResult<Option<DomainBaseline>> {
        self.baseline_repository
            .get_current_baseline()
            .map_err(LedgerError::storage)
    }

    /// Clear the current baseline by appending a cleared revision. A no-op
    /// when no baseline is active.
    pub fn clear_baseline(&self) -> LedgerResult<()> {
        let current = self
            .baseline_repository
            .get_current_baseline()
            .map_err(LedgerError::storage)?;

        if let Some(mut baseline) = current {
            baseline.state = BaselineState::Cleared;
            baseline.created_at = Utc::now().to_rfc3339();
            self.baseline_repository
                .append_baseline(&baseline)
                .map_err(LedgerError::storage)?;
            info!("Cleared baseline {}", baseline.id);
        }
        Ok(())
    }

    /// Progress metrics against the current baseline, or `None` when no
    /// baseline is set.
    pub fn progress_metrics(&self) -> LedgerResult<Option<ProgressMetrics>> {
        let baseline = match self.current_baseline()? {
            Some(b) => b,
            None => return Ok(None),
        };

        let today = self.effective_today()?;

        // The "current averages" are trailing-window totals over the last
        // 1, 7, and 30 effective days.
        let current_daily = self.aggregation_service.daily_total(today)?;
        let current_weekly = self
            .aggregation_service
            .range_total(day_window::week_window_start(today), today)?;
        let current_monthly = self
            .aggregation_service
            .range_total(day_window::month_window_start(today), today)?;

        let baseline_monthly = baseline.average_daily_ml * BASELINE_MONTH_DAYS;
        let days_since_baseline = (today - baseline.calculated_date).num_days();

        Ok(Some(ProgressMetrics {
            current_daily_average: current_daily,
            current_weekly_average: current_weekly,
            current_monthly_average: current_monthly,
            reduction_percentage_daily: reduction_percentage(
                baseline.average_daily_ml,
                current_daily,
            ),
            reduction_percentage_weekly: reduction_percentage(
                baseline.average_weekly_ml,
                current_weekly,
            ),
            reduction_percentage_monthly: reduction_percentage(baseline_monthly, current_monthly),
            days_since_baseline,
            baseline_daily_average: baseline.average_daily_ml,
            baseline_weekly_average: baseline.average_weekly_ml,
            baseline_monthly_average: baseline_monthly,
        }))
    }

    fn record_baseline(
        &self,
        average_daily: f64,
        period_start: chrono::NaiveDate,
        period_end: chrono::NaiveDate,
    ) -> LedgerResult<DomainBaseline> {
        let baseline = DomainBaseline {
            id: DomainBaseline::generate_id(now_millis()?),
            average_daily_ml: average_daily,
            average_weekly_ml: average_daily * 7.0,
            calculated_date: self.effective_today()?,
            period_start,
            period_end,
            state: BaselineState::Active,
            created_at: Utc::now().to_rfc3339(),
        };

        self.baseline_repository
            .append_baseline(&baseline)
            .map_err(LedgerError::storage)?;

        info!(
            "Recorded baseline {}: {:.1} ml/day over {}..{}",
            baseline.id, baseline.average_daily_ml, period_start, period_end
        );
        Ok(baseline)
    }

    fn effective_today(&self) -> LedgerResult<chrono::NaiveDate> {
        let window = self
            .settings_repository
            .get_day_window()
            .map_err(LedgerError::storage)?;
        let now = chrono::Local::now().naive_local();
        Ok(day_window::effective_date(now, window.end_of_day_hour))
    }
}

/// Relative decrease of `current` vs `baseline`, as a percentage. Defined as
/// 0.0 for a zero baseline; negative when consumption increased.
fn reduction_percentage(baseline: f64, current: f64) -> f64 {
    if baseline > 0.0 {
        (baseline - current) / baseline * 100.0
    } else {
        0.0
    }
}

fn now_millis() -> LedgerResult<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Storage(e.to_string()))?
        .as_millis() as u64)
}
