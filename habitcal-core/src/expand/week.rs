//! Week content expansion.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use super::{CyclePlan, ExpandOptions, cycles_spanning, usable_index};
use crate::occurrence::{Mapping, Occurrence, StepDisplay, StepTiming, insert_merged};
use crate::resolve::{resolve_weekday, week_start_for};
use crate::schedule::{ScheduleDefinition, Span, StartTime, WeekEntry};

/// Expand the week bucket of a schedule.
///
/// The i-th week entry covers the calendar week `cycle * stride + (i - 1)`
/// weeks after the week containing the start date. Each distinct weekday
/// named by the entry's steps becomes one occurrence holding those steps.
pub fn expand_weekly(
    schedule: &ScheduleDefinition,
    start: &StartTime,
    options: &ExpandOptions,
) -> Mapping {
    let mut mapping = Mapping::new();

    let entries: Vec<&WeekEntry> = schedule
        .weeks
        .iter()
        .filter(|entry| usable_index("weeks", entry.index))
        .collect();
    if entries.is_empty() {
        return mapping;
    }

    let first_day = start.date();
    let anchor = week_start_for(first_day, options.first_weekday);
    let stride = week_stride(schedule);
    let plan = CyclePlan::new(
        schedule,
        first_day,
        stride * 7,
        options.day_horizon_days,
        cycles_spanning(anchor, options.until, stride * 7),
    );

    for cycle in 0..plan.cycles {
        for entry in &entries {
            let weeks = cycle * stride + i64::from(entry.index - 1);
            let Some(week_start) = anchor.checked_add_signed(Duration::weeks(weeks)) else {
                continue;
            };

            for (date, steps) in steps_by_date(entry, week_start, cycle == 0) {
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

/// Weeks between consecutive cycles.
fn week_stride(schedule: &ScheduleDefinition) -> i64 {
    match schedule.span {
        Span::Week => i64::from(schedule.span_value.max(1)),
        _ => (schedule.cycle_days() / 7).max(1),
    }
}

/// Group an entry's steps by the date their weekday resolves to, in order of
/// first appearance.
fn steps_by_date(
    entry: &WeekEntry,
    week_start: NaiveDate,
    log_skips: bool,
) -> Vec<(NaiveDate, Vec<StepDisplay>)> {
    let mut grouped: Vec<(NaiveDate, Vec<StepDisplay>)> = Vec::new();

    for step in &entry.steps {
        let Some(date) = resolve_weekday(&step.weekday, week_start) else {
            if log_skips {
                debug!(
                    index = entry.index,
                    weekday = %step.weekday,
                    "Skipping week step with unknown weekday"
                );
            }
            continue;
        };

        let display = StepDisplay {
            text: step.text.clone(),
            timing: StepTiming::Weekday(date.weekday()),
        };

        match grouped.iter_mut().find(|(d, _)| *d == date) {
            Some((_, steps)) => steps.push(display),
            None => grouped.push((date, vec![display])),
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{RepeatBound, WeekStep};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week_entry(index: u32, title: &str, steps: &[(&str, &str)]) -> WeekEntry {
        WeekEntry {
            index,
            title: title.to_string(),
            description: String::new(),
            steps: steps
                .iter()
                .map(|(text, weekday)| WeekStep {
                    text: text.to_string(),
                    weekday: weekday.to_string(),
                })
                .collect(),
            reminders: Vec::new(),
        }
    }

    #[test]
    fn test_bounded_weekly_series() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(4))
            .with_week(week_entry(1, "Long run", &[("Run 10k", "Monday")]));
        // 2024-01-01 is a Monday
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        let dates: Vec<NaiveDate> = mapping.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]
        );
        assert!(dates.iter().all(|d| d.weekday() == Weekday::Mon));
    }

    #[test]
    fn test_until_does_not_extend_bounded_series() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(4))
            .with_week(week_entry(1, "Weekly review", &[("Review", "Monday")]));
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(
            &schedule,
            &start,
            &ExpandOptions::default().until(date(2025, 1, 1)),
        );

        assert_eq!(mapping.len(), 4);
        assert!(mapping.keys().all(|d| *d <= date(2024, 1, 22)));
    }

    #[test]
    fn test_schedule_json_with_horizon() {
        let schedule: ScheduleDefinition = serde_json::from_str(
            r#"{
                "span": "week",
                "span_value": 1,
                "schedule_horizon_days": 21,
                "weeks": [
                    {
                        "index": 1,
                        "title": "Strength",
                        "steps": [
                            { "text": "Squats", "weekday": "tue" },
                            { "text": "Rows", "weekday": "Thursday" }
                        ]
                    }
                ]
            }"#,
        )
        .expect("Should parse schedule JSON");
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        let dates: Vec<NaiveDate> = mapping.keys().copied().collect();

        assert_eq!(
            dates,
            vec![
                date(2024, 1, 2),
                date(2024, 1, 4),
                date(2024, 1, 9),
                date(2024, 1, 11),
                date(2024, 1, 16),
                date(2024, 1, 18),
            ]
        );
    }

    #[test]
    fn test_distinct_weekdays_become_separate_occurrences() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(1))
            .with_week(week_entry(
                1,
                "Gym",
                &[("Squats", "mon"), ("Bench", "Thursday"), ("Rows", "MONDAY")],
            ));
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        assert_eq!(mapping.len(), 2);

        let monday = &mapping[&date(2024, 1, 1)];
        let texts: Vec<&str> = monday.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Squats", "Rows"]);
        assert_eq!(monday.steps[0].timing, StepTiming::Weekday(Weekday::Mon));

        assert_eq!(mapping[&date(2024, 1, 4)].steps[0].text, "Bench");
    }

    #[test]
    fn test_unknown_weekday_is_skipped() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(1))
            .with_week(week_entry(1, "Mixed", &[("Good", "fri"), ("Bad", "funday")]));
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&date(2024, 1, 5)].steps.len(), 1);
    }

    #[test]
    fn test_every_other_week_with_second_index() {
        let schedule = ScheduleDefinition::new(Span::Week, 2)
            .with_repeat(RepeatBound::Count(2))
            .with_week(week_entry(1, "Plan", &[("Plan", "mon")]))
            .with_week(week_entry(2, "Review", &[("Review", "fri")]));
        let start = StartTime::Date(date(2024, 1, 1));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        let titles: Vec<(NaiveDate, &str)> = mapping
            .iter()
            .map(|(d, o)| (*d, o.title.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![
                (date(2024, 1, 1), "Plan"),
                (date(2024, 1, 12), "Review"),
                (date(2024, 1, 15), "Plan"),
                (date(2024, 1, 26), "Review"),
            ]
        );
    }

    #[test]
    fn test_first_week_keeps_days_before_start() {
        // Wednesday start, Monday step: the aligned week begins on the Monday
        // before the start.
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(2))
            .with_week(week_entry(1, "Plan", &[("Plan", "mon"), ("Check", "fri")]));
        let start = StartTime::Date(date(2024, 1, 3));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        let dates: Vec<NaiveDate> = mapping.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 5), date(2024, 1, 8), date(2024, 1, 12)]
        );
    }

    #[test]
    fn test_counted_mondays_from_midweek_start() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(4))
            .with_week(week_entry(1, "Plan", &[("Plan", "Monday")]));
        // Wednesday
        let start = StartTime::Date(date(2024, 1, 3));

        let mapping = expand_weekly(&schedule, &start, &ExpandOptions::default());
        let dates: Vec<NaiveDate> = mapping.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]
        );
    }

    #[test]
    fn test_sunday_first_week_alignment() {
        let schedule = ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(1))
            .with_week(week_entry(1, "Prep", &[("Prep", "sat")]));
        // Sunday 2024-01-07
        let start = StartTime::Date(date(2024, 1, 7));
        let options = ExpandOptions {
            first_weekday: Weekday::Sun,
            ..ExpandOptions::default()
        };

        let mapping = expand_weekly(&schedule, &start, &options);
        assert!(mapping.contains_key(&date(2024, 1, 13)));
    }
}
