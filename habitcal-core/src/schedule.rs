//! Schedule definitions for habits and tasks.
//!
//! A schedule describes one recurring activity: how long a cycle is, how many
//! cycles there are, and what content applies on the i-th day, week or month
//! of each cycle. These types are validated when they are read from a store,
//! so the expansion engine only ever sees well-formed values.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{HabitCalError, HabitCalResult};
use crate::resolve::parse_clock_time;

/// Calendar unit of one recurrence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Span {
    Day,
    Week,
    Month,
    Year,
}

impl Span {
    /// Approximate length of one unit in days (months are 30, years 365).
    pub fn unit_days(self) -> i64 {
        match self {
            Span::Day => 1,
            Span::Week => 7,
            Span::Month => 30,
            Span::Year => 365,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Day => write!(f, "day"),
            Span::Week => write!(f, "week"),
            Span::Month => write!(f, "month"),
            Span::Year => write!(f, "year"),
        }
    }
}

impl FromStr for Span {
    type Err = HabitCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('s') {
            "day" => Ok(Span::Day),
            "week" => Ok(Span::Week),
            "month" => Ok(Span::Month),
            "year" => Ok(Span::Year),
            _ => Err(HabitCalError::Parse(format!(
                "Unknown span '{}'. Expected day, week, month or year",
                s
            ))),
        }
    }
}

/// How long a series runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepeatBound {
    /// Open-ended series.
    #[default]
    Forever,
    /// A fixed number of cycles.
    Count(u32),
    /// A fixed number of days from the start date.
    HorizonDays(u32),
}

impl RepeatBound {
    pub fn is_infinite(&self) -> bool {
        matches!(self, RepeatBound::Forever)
    }
}

/// A wall-clock time of day, written as "09:00", "09:00:30" or "9:00 pm".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(pub NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = HabitCalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ClockTime {
    type Err = HabitCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_clock_time(s)
            .map(ClockTime)
            .ok_or_else(|| HabitCalError::Parse(format!("Invalid clock time '{}'", s)))
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

/// Reference start of a habit or task.
///
/// Only the `DateTime` form carries a time of day, which matters for the
/// first-occurrence push of day content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StartTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl StartTime {
    /// The calendar day of the start, normalized to midnight.
    pub fn date(&self) -> NaiveDate {
        match self {
            StartTime::Date(d) => *d,
            StartTime::DateTime(dt) => dt.date(),
        }
    }

    pub fn time_of_day(&self) -> Option<NaiveTime> {
        match self {
            StartTime::Date(_) => None,
            StartTime::DateTime(dt) => Some(dt.time()),
        }
    }
}

const START_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl FromStr for StartTime {
    type Err = HabitCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(dt) = START_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        {
            return Ok(StartTime::DateTime(dt));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(StartTime::Date)
            .map_err(|_| {
                HabitCalError::Parse(format!(
                    "Invalid start '{}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM",
                    s
                ))
            })
    }
}

impl TryFrom<String> for StartTime {
    type Error = HabitCalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StartTime> for String {
    fn from(value: StartTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            StartTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M")),
        }
    }
}

impl From<NaiveDate> for StartTime {
    fn from(value: NaiveDate) -> Self {
        StartTime::Date(value)
    }
}

impl From<NaiveDateTime> for StartTime {
    fn from(value: NaiveDateTime) -> Self {
        StartTime::DateTime(value)
    }
}

/// A reminder attached to an indexed entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayStep {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_time: Option<ClockTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekStep {
    pub text: String,
    /// Weekday name, e.g. "Monday" or "mon". Unknown names are skipped.
    pub weekday: String,
}

/// Day-of-month reference for monthly steps.
///
/// Either a number (`15`) or a string (`"start_of_month"`, `"end_of_month"`,
/// `"31"`). Anything else is skipped during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayOfMonth {
    Number(i64),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthStep {
    pub text: String,
    pub day: DayOfMonth,
}

/// Content for the i-th day of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayEntry {
    pub index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<DayStep>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// Content for the i-th week of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekEntry {
    pub index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<WeekStep>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// Content for the i-th month of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthEntry {
    pub index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<MonthStep>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// Recurrence definition of a habit or task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ScheduleFile", into = "ScheduleFile")]
pub struct ScheduleDefinition {
    pub span: Span,
    pub span_value: u32,
    pub repeat: RepeatBound,
    pub days: Vec<DayEntry>,
    pub weeks: Vec<WeekEntry>,
    pub months: Vec<MonthEntry>,
}

impl ScheduleDefinition {
    pub fn new(span: Span, span_value: u32) -> Self {
        ScheduleDefinition {
            span,
            span_value,
            repeat: RepeatBound::Forever,
            days: Vec::new(),
            weeks: Vec::new(),
            months: Vec::new(),
        }
    }

    pub fn with_repeat(mut self, repeat: RepeatBound) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_day(mut self, entry: DayEntry) -> Self {
        self.days.push(entry);
        self
    }

    pub fn with_week(mut self, entry: WeekEntry) -> Self {
        self.weeks.push(entry);
        self
    }

    pub fn with_month(mut self, entry: MonthEntry) -> Self {
        self.months.push(entry);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.weeks.is_empty() && self.months.is_empty()
    }

    /// Cycle length in days, clamped to at least one day.
    pub fn cycle_days(&self) -> i64 {
        (i64::from(self.span_value.max(1)) * self.span.unit_days()).max(1)
    }

    /// Describe every structural problem with this schedule.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.span_value == 0 {
            problems.push("span_value must be at least 1".to_string());
        }
        match self.repeat {
            RepeatBound::Count(0) => problems.push("repeat_count must be at least 1".to_string()),
            RepeatBound::HorizonDays(0) => {
                problems.push("schedule_horizon_days must be at least 1".to_string())
            }
            _ => {}
        }

        check_indices("days", self.days.iter().map(|e| e.index), &mut problems);
        check_indices("weeks", self.weeks.iter().map(|e| e.index), &mut problems);
        check_indices("months", self.months.iter().map(|e| e.index), &mut problems);

        problems
    }

    /// Reject schedules with structural problems.
    pub fn validate(&self, owner: &str) -> HabitCalResult<()> {
        match self.problems().into_iter().next() {
            None => Ok(()),
            Some(reason) => Err(HabitCalError::InvalidSchedule {
                owner: owner.to_string(),
                reason,
            }),
        }
    }
}

fn check_indices(bucket: &str, indices: impl Iterator<Item = u32>, problems: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for index in indices {
        if index == 0 {
            problems.push(format!("{} index must be 1 or greater", bucket));
        } else if !seen.insert(index) {
            problems.push(format!("duplicate {} index {}", bucket, index));
        }
    }
}

impl fmt::Display for ScheduleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span_value <= 1 {
            write!(f, "every {}", self.span)?;
        } else {
            write!(f, "every {} {}s", self.span_value, self.span)?;
        }
        match self.repeat {
            RepeatBound::Forever => Ok(()),
            RepeatBound::Count(n) => write!(f, ", {} times", n),
            RepeatBound::HorizonDays(n) => write!(f, ", for {} days", n),
        }
    }
}

/// On-disk shape of a schedule, with the bound split into two optional keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleFile {
    span: Span,
    #[serde(default = "default_span_value")]
    span_value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeat_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule_horizon_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    days: Vec<DayEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    weeks: Vec<WeekEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    months: Vec<MonthEntry>,
}

fn default_span_value() -> u32 {
    1
}

impl TryFrom<ScheduleFile> for ScheduleDefinition {
    type Error = HabitCalError;

    fn try_from(file: ScheduleFile) -> Result<Self, Self::Error> {
        let repeat = match (file.repeat_count, file.schedule_horizon_days) {
            (Some(_), Some(_)) => {
                return Err(HabitCalError::Parse(
                    "repeat_count and schedule_horizon_days are mutually exclusive".into(),
                ));
            }
            (Some(n), None) => RepeatBound::Count(n),
            (None, Some(n)) => RepeatBound::HorizonDays(n),
            (None, None) => RepeatBound::Forever,
        };

        Ok(ScheduleDefinition {
            span: file.span,
            span_value: file.span_value,
            repeat,
            days: file.days,
            weeks: file.weeks,
            months: file.months,
        })
    }
}

impl From<ScheduleDefinition> for ScheduleFile {
    fn from(schedule: ScheduleDefinition) -> Self {
        let (repeat_count, schedule_horizon_days) = match schedule.repeat {
            RepeatBound::Forever => (None, None),
            RepeatBound::Count(n) => (Some(n), None),
            RepeatBound::HorizonDays(n) => (None, Some(n)),
        };

        ScheduleFile {
            span: schedule.span,
            span_value: schedule.span_value,
            repeat_count,
            schedule_horizon_days,
            days: schedule.days,
            weeks: schedule.weeks,
            months: schedule.months,
        }
    }
}
