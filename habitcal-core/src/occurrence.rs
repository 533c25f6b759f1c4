//! Expanded occurrences and the merge policy for colliding dates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::schedule::{ClockTime, Reminder};

/// Date-keyed expansion result. The `NaiveDate` key is the canonical
/// midnight-normalized day used for all merging and lookup.
pub type Mapping = BTreeMap<NaiveDate, Occurrence>;

/// Separator used when joining titles and descriptions of merged content.
pub const LABEL_SEPARATOR: &str = " | ";

/// When a step applies within its day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepTiming {
    /// Day content, optionally at a wall-clock time.
    Clock(Option<ClockTime>),
    /// Week content, on a resolved weekday.
    Weekday(Weekday),
    /// Month content, on a resolved day of the month.
    DayOfMonth(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepDisplay {
    pub text: String,
    pub timing: StepTiming,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderDisplay {
    pub time: Option<ClockTime>,
    pub message: Option<String>,
}

impl From<&Reminder> for ReminderDisplay {
    fn from(reminder: &Reminder) -> Self {
        ReminderDisplay {
            time: reminder.time,
            message: reminder.message.clone(),
        }
    }
}

/// The resolved content of one schedule on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub steps: Vec<StepDisplay>,
    pub reminders: Vec<ReminderDisplay>,
}

impl Occurrence {
    pub fn new(
        date: NaiveDate,
        title: &str,
        description: &str,
        steps: Vec<StepDisplay>,
        reminders: &[Reminder],
    ) -> Self {
        Occurrence {
            date,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            steps,
            reminders: reminders.iter().map(ReminderDisplay::from).collect(),
        }
    }

    /// Fold another occurrence for the same date into this one.
    ///
    /// Steps are concatenated as-is. Reminders are concatenated and then
    /// deduplicated on `(time, message)`, keeping the first. Non-empty
    /// titles and descriptions are joined with `" | "`.
    pub fn merge(self, other: Occurrence) -> Occurrence {
        debug_assert_eq!(self.date, other.date);

        let mut steps = self.steps;
        steps.extend(other.steps);

        let reminders = dedup_reminders(self.reminders.into_iter().chain(other.reminders));

        Occurrence {
            date: self.date,
            title: join_labels(&self.title, &other.title),
            description: join_labels(&self.description, &other.description),
            steps,
            reminders,
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{} ({} steps)", self.date, self.steps.len())
        } else {
            write!(f, "{} {}", self.date, self.title)
        }
    }
}

fn join_labels(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{}{}{}", a, LABEL_SEPARATOR, b),
    }
}

fn dedup_reminders(reminders: impl IntoIterator<Item = ReminderDisplay>) -> Vec<ReminderDisplay> {
    let mut unique: Vec<ReminderDisplay> = Vec::new();
    for reminder in reminders {
        if !unique.contains(&reminder) {
            unique.push(reminder);
        }
    }
    unique
}

/// Insert an occurrence, merging with whatever is already on that date.
pub(crate) fn insert_merged(mapping: &mut Mapping, occurrence: Occurrence) {
    let merged = match mapping.remove(&occurrence.date) {
        Some(existing) => existing.merge(occurrence),
        None => occurrence,
    };
    mapping.insert(merged.date, merged);
}

/// Union of several mappings, in order. Earlier sources come first on
/// colliding dates.
pub fn merge_mappings(sources: impl IntoIterator<Item = Mapping>) -> Mapping {
    let mut merged = Mapping::new();
    for source in sources {
        for occurrence in source.into_values() {
            insert_merged(&mut merged, occurrence);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn step(text: &str) -> StepDisplay {
        StepDisplay {
            text: text.to_string(),
            timing: StepTiming::Clock(None),
        }
    }

    fn reminder(time: Option<ClockTime>, message: &str) -> Reminder {
        Reminder {
            time,
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn test_merge_concatenates_steps_without_dedup() {
        let a = Occurrence::new(date(), "Run", "", vec![step("Stretch")], &[]);
        let b = Occurrence::new(date(), "Yoga", "", vec![step("Stretch")], &[]);

        let merged = a.merge(b);
        assert_eq!(merged.steps.len(), 2, "Duplicate step text is preserved");
        assert_eq!(merged.title, "Run | Yoga");
    }

    #[test]
    fn test_merge_dedups_reminders_keeping_first() {
        let eight = ClockTime::new(8, 0);
        let a = Occurrence::new(
            date(),
            "A",
            "",
            Vec::new(),
            &[reminder(eight, "Water"), reminder(None, "Stretch")],
        );
        let b = Occurrence::new(
            date(),
            "B",
            "",
            Vec::new(),
            &[reminder(eight, "Water"), reminder(eight, "Vitamins")],
        );

        let merged = a.merge(b);
        let messages: Vec<_> = merged
            .reminders
            .iter()
            .map(|r| r.message.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(messages, vec!["Water", "Stretch", "Vitamins"]);
    }

    #[test]
    fn test_new_keeps_entry_reminders_as_written() {
        let eight = ClockTime::new(8, 0);
        let occurrence = Occurrence::new(
            date(),
            "A",
            "",
            Vec::new(),
            &[reminder(eight, "Water"), reminder(eight, "Water")],
        );
        assert_eq!(occurrence.reminders.len(), 2);
    }

    #[test]
    fn test_merge_skips_empty_labels() {
        let a = Occurrence::new(date(), "", "Week one", Vec::new(), &[]);
        let b = Occurrence::new(date(), "Budget", "", Vec::new(), &[]);
        let c = Occurrence::new(date(), "", "  ", Vec::new(), &[]);

        let merged = a.merge(b).merge(c);
        assert_eq!(merged.title, "Budget");
        assert_eq!(merged.description, "Week one");
    }

    #[test]
    fn test_merge_mappings_keeps_source_order() {
        let mut first = Mapping::new();
        first.insert(date(), Occurrence::new(date(), "Day", "", vec![step("a")], &[]));
        let mut second = Mapping::new();
        second.insert(date(), Occurrence::new(date(), "Week", "", vec![step("b")], &[]));

        let merged = merge_mappings([first, second]);
        let occurrence = merged.get(&date()).expect("Should have merged date");
        assert_eq!(occurrence.title, "Day | Week");
        assert_eq!(occurrence.steps[0].text, "a");
        assert_eq!(occurrence.steps[1].text, "b");
    }
}
