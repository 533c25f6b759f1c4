//! Day content expansion.

use chrono::{Duration, NaiveDate};

use super::{CyclePlan, ExpandOptions, cycles_spanning, usable_index};
use crate::occurrence::{Mapping, Occurrence, StepDisplay, StepTiming, insert_merged};
use crate::schedule::{DayEntry, ScheduleDefinition, StartTime};

/// Expand the day bucket of a schedule.
///
/// The i-th day entry lands on `start + cycle * cycle_days + (i - 1)`.
pub fn expand_daily(
    schedule: &ScheduleDefinition,
    start: &StartTime,
    options: &ExpandOptions,
) -> Mapping {
    let mut mapping = Mapping::new();

    let entries: Vec<&DayEntry> = schedule
        .days
        .iter()
        .filter(|entry| usable_index("days", entry.index))
        .collect();
    if entries.is_empty() {
        return mapping;
    }

    let first_day = effective_start(schedule, start);
    let cycle_days = schedule.cycle_days();
    let plan = CyclePlan::new(
        schedule,
        first_day,
        cycle_days,
        options.day_horizon_days,
        cycles_spanning(first_day, options.until, cycle_days),
    );

    for cycle in 0..plan.cycles {
        for entry in &entries {
            let offset = cycle * cycle_days + i64::from(entry.index - 1);
            let Some(date) = first_day.checked_add_signed(Duration::days(offset)) else {
                continue;
            };
            if !plan.admits(date) {
                continue;
            }

            let steps = entry
                .steps
                .iter()
                .map(|step| StepDisplay {
                    text: step.text.clone(),
                    timing: StepTiming::Clock(step.clock_time),
                })
                .collect();

            insert_merged(
                &mut mapping,
                Occurrence::new(date, &entry.title, "", steps, &entry.reminders),
            );
        }
    }

    mapping
}

/// The day the first cycle starts on.
///
/// When the start carries a time of day and a step of the index-1 entry is
/// scheduled earlier than that time, the whole series begins the next day.
/// Only index 1 is inspected.
fn effective_start(schedule: &ScheduleDefinition, start: &StartTime) -> NaiveDate {
    let day = start.date();
    let Some(start_time) = start.time_of_day() else {
        return day;
    };

    let missed_first_step = schedule
        .days
        .iter()
        .filter(|entry| entry.index == 1)
        .flat_map(|entry| &entry.steps)
        .filter_map(|step| step.clock_time)
        .any(|clock| clock.0 < start_time);

    if missed_first_step {
        day.succ_opt().unwrap_or(day)
    } else {
        day
    }
}
