//! Month content expansion.

use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use super::{CyclePlan, ExpandOptions, usable_index};
use crate::occurrence::{Mapping, Occurrence, StepDisplay, StepTiming, insert_merged};
use crate::resolve::{DaySpec, first_of_month, parse_day_spec, resolve_month_day};
use crate::schedule::{MonthEntry, ScheduleDefinition, Span, StartTime};

/// Approximate month length used to size cycles.
const MONTH_DAYS: i64 = 30;

/// Expand the month bucket of a schedule.
///
/// The i-th month entry covers the month `cycle * stride + (i - 1)` months
/// after the start month. Each distinct day spec named by the entry's steps
/// becomes one occurrence holding those steps.
pub fn expand_monthly(
    schedule: &ScheduleDefinition,
    start: &StartTime,
    options: &ExpandOptions,
) -> Mapping {
    let mut mapping = Mapping::new();

    let entries: Vec<&MonthEntry> = schedule
        .months
        .iter()
        .filter(|entry| usable_index("months", entry.index))
        .collect();
    if entries.is_empty() {
        return mapping;
    }

    let first_day = start.date();
    let anchor = first_of_month(first_day);
    let stride = month_stride(schedule);
    let cycles_to_until = options
        .until
        .map(|until| (months_between(anchor, until) / stride + 1).max(0));
    let plan = CyclePlan::new(
        schedule,
        first_day,
        stride * MONTH_DAYS,
        options.month_horizon_days,
        cycles_to_until,
    );

    for cycle in 0..plan.cycles {
        for entry in &entries {
            let months = cycle * stride + i64::from(entry.index - 1);
            let Some(month_start) = u32::try_from(months)
                .ok()
                .and_then(|m| anchor.checked_add_months(Months::new(m)))
            else {
                continue;
            };

            for (date, steps) in steps_by_date(entry, month_start, cycle == 0) {
                if plan.admits(date) {
                    insert_merged(
                        &mut mapping,
                        Occurrence::new(
                            date,
                            &entry.title,
                            &entry.description,
                            steps,
                            &entry.reminders,
                        ),
                    );
                }
            }
        }
    }

    mapping
}

/// Months between consecutive cycles.
fn month_stride(schedule: &ScheduleDefinition) -> i64 {
    let span_value = i64::from(schedule.span_value.max(1));
    match schedule.span {
        Span::Month => span_value,
        Span::Year => span_value * 12,
        _ => (schedule.cycle_days() / MONTH_DAYS).max(1),
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Group an entry's steps by resolved date, in order of first appearance.
/// Distinct specs that clamp to the same day (e.g. "31" and "end_of_month"
/// in April) share one occurrence.
fn steps_by_date(
    entry: &MonthEntry,
    month_start: NaiveDate,
    log_skips: bool,
) -> Vec<(NaiveDate, Vec<StepDisplay>)> {
    let mut grouped: Vec<(NaiveDate, Vec<StepDisplay>)> = Vec::new();

    for step in &entry.steps {
        let Some(date) = parse_day_spec(&step.day)
            .and_then(|spec: DaySpec| resolve_month_day(spec, month_start))
        else {
            if log_skips {
                debug!(
                    index = entry.index,
                    day = ?step.day,
                    "Skipping month step with unrecognized day"
                );
            }
            continue;
        };

        let display = StepDisplay {
            text: step.text.clone(),
            timing: StepTiming::DayOfMonth(date.day()),
        };

        match grouped.iter_mut().find(|(d, _)| *d == date) {
            Some((_, steps)) => steps.push(display),
            None => grouped.push((date, vec![display])),
        }
    }

    grouped
}
