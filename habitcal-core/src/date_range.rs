//! Inclusive calendar date ranges.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HabitCalError, HabitCalResult};
use crate::occurrence::Mapping;

/// Default number of days shown when no end date is given.
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range; the bounds are swapped if given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            DateRange { start, end }
        } else {
            DateRange { start: end, end: start }
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        DateRange { start: day, end: day }
    }

    /// Parse CLI-style bounds.
    /// - `from`: YYYY-MM-DD, defaults to `today`
    /// - `to`: YYYY-MM-DD, defaults to `from + DEFAULT_RANGE_DAYS - 1`
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> HabitCalResult<Self> {
        let start = match from {
            Some(s) => parse_date(s)?,
            None => today,
        };

        let end = match to {
            Some(s) => parse_date(s)?,
            None => start + Duration::days(DEFAULT_RANGE_DAYS - 1),
        };

        if end < start {
            return Err(HabitCalError::Parse(format!(
                "Range end {} is before start {}",
                end, start
            )));
        }

        Ok(DateRange { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn covers(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest range containing both.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Entries of `mapping` that fall inside this range.
    pub fn slice(&self, mapping: &Mapping) -> Mapping {
        mapping
            .range(self.start..=self.end)
            .map(|(date, occurrence)| (*date, occurrence.clone()))
            .collect()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

fn parse_date(s: &str) -> HabitCalResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        HabitCalError::Parse(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}
