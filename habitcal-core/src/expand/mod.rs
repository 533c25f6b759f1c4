//! Granularity expanders.
//!
//! Each expander turns one content bucket of a schedule (days, weeks or
//! months) into a date-keyed [`Mapping`]. They share the cycle plan below:
//! how many cycles to materialize, and which dates a bounded series admits.
//!
//! Infinite series are materialized over a bounded generation horizon (one
//! year for day and week content, two years for month content by default),
//! extended to reach `until` when the caller asks for a later date.

mod day;
mod month;
mod week;

pub use day::expand_daily;
pub use month::expand_monthly;
pub use week::expand_weekly;

use chrono::{Duration, NaiveDate, Weekday};
use tracing::debug;

use crate::schedule::{RepeatBound, ScheduleDefinition};

/// Default lookahead for infinite day and week content.
pub const DEFAULT_DAY_HORIZON_DAYS: i64 = 365;

/// Default lookahead for infinite month content.
pub const DEFAULT_MONTH_HORIZON_DAYS: i64 = 730;

/// Hard ceiling on cycles materialized in one call.
pub const MAX_GENERATED_CYCLES: i64 = 36_500;

/// Knobs shared by all expanders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Last date the caller is interested in. Infinite series are generated
    /// at least this far.
    pub until: Option<NaiveDate>,
    /// First day of the host calendar's week.
    pub first_weekday: Weekday,
    pub day_horizon_days: i64,
    pub month_horizon_days: i64,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions {
            until: None,
            first_weekday: Weekday::Mon,
            day_horizon_days: DEFAULT_DAY_HORIZON_DAYS,
            month_horizon_days: DEFAULT_MONTH_HORIZON_DAYS,
        }
    }
}

impl ExpandOptions {
    pub fn until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }
}

/// How many cycles to generate and which dates are admitted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CyclePlan {
    pub cycles: i64,
    max_date: Option<NaiveDate>,
}

impl CyclePlan {
    /// `stride_days` is the length of one expander cycle in days;
    /// `cycles_to_until` is how many cycles reach the caller's `until`.
    pub fn new(
        schedule: &ScheduleDefinition,
        start: NaiveDate,
        stride_days: i64,
        horizon_days: i64,
        cycles_to_until: Option<i64>,
    ) -> Self {
        let stride_days = stride_days.max(1);

        let cycles = match schedule.repeat {
            RepeatBound::Forever => {
                let lookahead = (horizon_days / stride_days).max(1);
                lookahead.max(cycles_to_until.unwrap_or(0))
            }
            RepeatBound::Count(n) => i64::from(n),
            RepeatBound::HorizonDays(days) => (i64::from(days) / stride_days).max(1),
        };

        let total_days = match schedule.repeat {
            RepeatBound::Forever => None,
            RepeatBound::Count(n) => Some(schedule.cycle_days() * i64::from(n)),
            RepeatBound::HorizonDays(days) => Some(i64::from(days)),
        };
        let max_date = total_days.and_then(|days| start.checked_add_signed(Duration::days(days)));

        CyclePlan {
            cycles: cycles.min(MAX_GENERATED_CYCLES),
            max_date,
        }
    }

    /// Whether a candidate date falls inside the series. Only the upper
    /// bound is checked: week and month windows are calendar-aligned, so the
    /// first cycle may land before the start date.
    pub fn admits(&self, date: NaiveDate) -> bool {
        self.max_date.is_none_or(|max| date <= max)
    }
}

/// Number of `stride_days` cycles from `anchor` needed to reach `until`.
pub(crate) fn cycles_spanning(anchor: NaiveDate, until: Option<NaiveDate>, stride_days: i64) -> Option<i64> {
    let until = until?;
    let days = (until - anchor).num_days();
    if days < 0 {
        return Some(0);
    }
    Some(days / stride_days.max(1) + 1)
}

/// Entries with index 0 cannot be placed; they are skipped.
pub(crate) fn usable_index(bucket: &str, index: u32) -> bool {
    if index == 0 {
        debug!(bucket, "Skipping entry with index 0");
        return false;
    }
    true
}
