//! Combining granularities into one mapping per calendar view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HabitCalError;
use crate::expand::{ExpandOptions, expand_daily, expand_monthly, expand_weekly};
use crate::occurrence::{Mapping, merge_mappings};
use crate::schedule::{ScheduleDefinition, StartTime};

/// Which calendar cell a mapping is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    /// Day, week and month content.
    #[default]
    Daily,
    /// Week and month content; day entries are too fine for a week cell.
    Weekly,
    /// Month content only.
    Monthly,
}

type Expander = fn(&ScheduleDefinition, &StartTime, &ExpandOptions) -> Mapping;

const DAILY_EXPANDERS: &[Expander] = &[expand_daily, expand_weekly, expand_monthly];
const WEEKLY_EXPANDERS: &[Expander] = &[expand_weekly, expand_monthly];
const MONTHLY_EXPANDERS: &[Expander] = &[expand_monthly];

impl ViewType {
    /// Expanders included in this view, in merge order.
    fn expanders(self) -> &'static [Expander] {
        match self {
            ViewType::Daily => DAILY_EXPANDERS,
            ViewType::Weekly => WEEKLY_EXPANDERS,
            ViewType::Monthly => MONTHLY_EXPANDERS,
        }
    }

    pub fn all() -> [ViewType; 3] {
        [ViewType::Daily, ViewType::Weekly, ViewType::Monthly]
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewType::Daily => write!(f, "daily"),
            ViewType::Weekly => write!(f, "weekly"),
            ViewType::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for ViewType {
    type Err = HabitCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(ViewType::Daily),
            "weekly" | "week" => Ok(ViewType::Weekly),
            "monthly" | "month" => Ok(ViewType::Monthly),
            _ => Err(HabitCalError::Parse(format!(
                "Unknown view '{}'. Expected daily, weekly or monthly",
                s
            ))),
        }
    }
}

/// Expand a schedule for one view and merge the granularities it includes.
///
/// Colliding dates follow [`crate::occurrence::Occurrence::merge`]: day
/// content first, then week, then month.
pub fn combine_for_view(
    schedule: &ScheduleDefinition,
    start: &StartTime,
    view: ViewType,
    options: &ExpandOptions,
) -> Mapping {
    merge_mappings(
        view.expanders()
            .iter()
            .map(|expand| expand(schedule, start, options)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{
        ClockTime, DayEntry, DayOfMonth, DayStep, MonthEntry, MonthStep, Reminder, RepeatBound,
        Span, WeekEntry, WeekStep,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn water_reminder() -> Reminder {
        Reminder {
            time: ClockTime::new(8, 0),
            message: Some("Drink water".into()),
        }
    }

    /// Monday 2024-01-01 gets day, week and month content.
    fn layered_schedule() -> ScheduleDefinition {
        ScheduleDefinition::new(Span::Week, 1)
            .with_repeat(RepeatBound::Count(4))
            .with_day(DayEntry {
                index: 1,
                title: "Day one".into(),
                steps: vec![DayStep {
                    text: "Stretch".into(),
                    clock_time: None,
                }],
                reminders: vec![water_reminder()],
            })
            .with_week(WeekEntry {
                index: 1,
                title: "Week one".into(),
                description: "Build the base".into(),
                steps: vec![WeekStep {
                    text: "Stretch".into(),
                    weekday: "Monday".into(),
                }],
                reminders: vec![water_reminder()],
            })
            .with_month(MonthEntry {
                index: 1,
                title: "".into(),
                description: "Month focus".into(),
                steps: vec![MonthStep {
                    text: "Measure".into(),
                    day: DayOfMonth::Named("start_of_month".into()),
                }],
                reminders: Vec::new(),
            })
    }

    #[test]
    fn test_daily_view_merges_all_granularities() {
        let start = StartTime::Date(date(2024, 1, 1));
        let mapping = combine_for_view(
            &layered_schedule(),
            &start,
            ViewType::Daily,
            &ExpandOptions::default(),
        );

        let monday = &mapping[&date(2024, 1, 1)];
        assert_eq!(monday.title, "Day one | Week one");
        assert_eq!(monday.description, "Build the base | Month focus");
        let texts: Vec<&str> = monday.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Stretch", "Stretch", "Measure"]);
        assert_eq!(monday.reminders.len(), 1, "Identical reminders collapse");
    }

    #[test]
    fn test_weekly_view_suppresses_day_content() {
        let start = StartTime::Date(date(2024, 1, 1));
        let mapping = combine_for_view(
            &layered_schedule(),
            &start,
            ViewType::Weekly,
            &ExpandOptions::default(),
        );

        let monday = &mapping[&date(2024, 1, 1)];
        assert_eq!(monday.title, "Week one");
        assert_eq!(monday.steps.len(), 2);
        // Day content also lands on 2024-01-08 but is left out of this view
        assert_eq!(mapping[&date(2024, 1, 8)].steps.len(), 1);
    }

    #[test]
    fn test_monthly_view_only_month_content() {
        let start = StartTime::Date(date(2024, 1, 1));
        let mapping = combine_for_view(
            &layered_schedule(),
            &start,
            ViewType::Monthly,
            &ExpandOptions::default(),
        );

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&date(2024, 1, 1)].steps[0].text, "Measure");
    }

    #[test]
    fn test_combine_is_deterministic() {
        let start = StartTime::Date(date(2024, 1, 1));
        let schedule = layered_schedule();
        let options = ExpandOptions::default();

        let first = combine_for_view(&schedule, &start, ViewType::Daily, &options);
        let second = combine_for_view(&schedule, &start, ViewType::Daily, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_view_type() {
        assert_eq!("Weekly".parse::<ViewType>().unwrap(), ViewType::Weekly);
        assert_eq!("month".parse::<ViewType>().unwrap(), ViewType::Monthly);
        assert!("hourly".parse::<ViewType>().is_err());
    }
}
