//! Day-window calculations for the drink ledger.
//!
//! This module contains the pure date logic every aggregate depends on:
//! translating a raw timestamp into the "effective date" it belongs to, and
//! computing week and trailing-month window bounds. Two knobs drive it, both
//! persisted in settings:
//!
//! - `end_of_day_hour`: a timestamp whose clock hour is strictly below this
//!   value is attributed to the previous calendar date, so a drink logged at
//!   1am counts toward the prior evening's session.
//! - `week_start_day`: Monday=1 .. Sunday=7; the week window starts at the
//!   most recent occurrence of that weekday.
//!
//! Everything here is a pure function of its inputs. No clocks, no storage.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Days covered by the trailing "month" window (fixed, not a calendar month).
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Effective date for a raw timestamp under the given end-of-day hour.
///
/// Hours strictly below the threshold roll back to the previous date; the
/// threshold hour itself already belongs to the new day.
pub fn effective_date(timestamp: NaiveDateTime, end_of_day_hour: u8) -> NaiveDate {
    if timestamp.hour() < u32::from(end_of_day_hour) {
        timestamp.date() - Duration::days(1)
    } else {
        timestamp.date()
    }
}

/// Start of the week containing `today`.
///
/// `week_start_day` uses Monday=1 .. Sunday=7. The result is 0-6 days back:
/// `today - ((weekday - week_start_day + 7) % 7)`.
pub fn week_start(today: NaiveDate, week_start_day: u8) -> NaiveDate {
    let today_weekday = today.weekday().number_from_monday(); // Monday=1 .. Sunday=7
    let days_back = (i64::from(today_weekday) - i64::from(week_start_day) + 7) % 7;
    today - Duration::days(days_back)
}

/// First date of the trailing 30-day window ending at `today` (inclusive).
pub fn month_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(MONTH_WINDOW_DAYS - 1)
}

/// First date of the trailing 7-day window ending at `today` (inclusive).
pub fn week_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(6)
}

/// Inclusive day count of a period. `start == end` is one day.
pub fn days_in_period(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
