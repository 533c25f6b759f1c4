//! Tracked items and the store contract.
//!
//! A store hands out the current list of habits and tasks. Snapshots of that
//! list are compared to find which owners changed, so the mapping cache can be
//! invalidated for exactly those owners.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HabitCalError, HabitCalResult};
use crate::schedule::{ScheduleDefinition, StartTime};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Habit,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Habit => write!(f, "habit"),
            EntityKind::Task => write!(f, "task"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = HabitCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "habit" => Ok(EntityKind::Habit),
            "task" => Ok(EntityKind::Task),
            _ => Err(HabitCalError::Parse(format!(
                "Unknown kind '{}'. Expected habit or task",
                s
            ))),
        }
    }
}

/// A habit or task together with its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: String,
    #[serde(default)]
    pub kind: EntityKind,
    pub name: String,
    pub start: StartTime,
    pub schedule: ScheduleDefinition,
}

impl TrackedItem {
    pub fn validate(&self) -> HabitCalResult<()> {
        if self.id.trim().is_empty() {
            return Err(HabitCalError::InvalidSchedule {
                owner: self.name.clone(),
                reason: "id must not be empty".into(),
            });
        }
        self.schedule.validate(&self.id)
    }
}

/// Source of tracked items.
pub trait ScheduleStore {
    fn list(&self) -> HabitCalResult<Vec<TrackedItem>>;
}

/// A fixed list of items, useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub items: Vec<TrackedItem>,
}

impl ScheduleStore for MemoryStore {
    fn list(&self) -> HabitCalResult<Vec<TrackedItem>> {
        Ok(self.items.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "+"),
            ChangeKind::Updated => write!(f, "~"),
            ChangeKind::Removed => write!(f, "-"),
        }
    }
}

/// Ids that differ between two snapshots, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreChanges {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl StoreChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Every change as (kind, id), added first.
    pub fn iter(&self) -> impl Iterator<Item = (ChangeKind, &str)> {
        let added = self.added.iter().map(|id| (ChangeKind::Added, id.as_str()));
        let updated = self.updated.iter().map(|id| (ChangeKind::Updated, id.as_str()));
        let removed = self.removed.iter().map(|id| (ChangeKind::Removed, id.as_str()));
        added.chain(updated).chain(removed)
    }

    /// Owners whose cached mappings are no longer valid.
    pub fn stale_owners(&self) -> impl Iterator<Item = &str> {
        self.updated
            .iter()
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

/// The store's contents at one point in time, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    items: HashMap<String, TrackedItem>,
}

impl StoreSnapshot {
    pub fn capture(items: &[TrackedItem]) -> Self {
        StoreSnapshot {
            items: items
                .iter()
                .map(|item| (item.id.clone(), item.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedItem> {
        self.items.get(id)
    }

    /// What changed going from this snapshot to `next`.
    pub fn changes(&self, next: &StoreSnapshot) -> StoreChanges {
        let mut changes = StoreChanges::default();

        for (id, item) in &next.items {
            match self.items.get(id) {
                None => changes.added.push(id.clone()),
                Some(previous) if previous != item => changes.updated.push(id.clone()),
                Some(_) => {}
            }
        }

        changes.removed = self
            .items
            .keys()
            .filter(|id| !next.items.contains_key(*id))
            .cloned()
            .collect();

        // Sort for deterministic output
        changes.added.sort();
        changes.updated.sort();
        changes.removed.sort();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Span;
    use chrono::NaiveDate;

    fn item(id: &str, span_value: u32) -> TrackedItem {
        TrackedItem {
            id: id.to_string(),
            kind: EntityKind::Habit,
            name: id.to_uppercase(),
            start: StartTime::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            schedule: ScheduleDefinition::new(Span::Day, span_value),
        }
    }

    #[test]
    fn test_changes_detects_each_kind() {
        let before = StoreSnapshot::capture(&[item("a", 1), item("b", 1), item("c", 1)]);
        let after = StoreSnapshot::capture(&[item("a", 1), item("b", 2), item("d", 1)]);

        let changes = before.changes(&after);
        assert_eq!(changes.added, vec!["d"]);
        assert_eq!(changes.updated, vec!["b"]);
        assert_eq!(changes.removed, vec!["c"]);

        let stale: Vec<&str> = changes.stale_owners().collect();
        assert_eq!(stale, vec!["b", "c"]);

        let kinds: Vec<(ChangeKind, &str)> = changes.iter().collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Added, "d"),
                (ChangeKind::Updated, "b"),
                (ChangeKind::Removed, "c"),
            ]
        );
    }

    #[test]
    fn test_identical_snapshots_have_no_changes() {
        let items = [item("a", 1), item("b", 3)];
        let changes = StoreSnapshot::capture(&items).changes(&StoreSnapshot::capture(&items));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_tracked_item_from_toml() {
        let toml_str = r#"
id = "meditate"
kind = "habit"
name = "Meditate"
start = "2024-03-01 07:00"

[schedule]
span = "day"
repeat_count = 5

[[schedule.days]]
index = 1
title = "Meditate"

[[schedule.days.steps]]
text = "Meditate"
clock_time = "08:00"
"#;

        let item: TrackedItem = toml::from_str(toml_str).expect("Should parse tracked item");
        assert_eq!(item.kind, EntityKind::Habit);
        assert!(item.start.time_of_day().is_some());
        assert_eq!(item.schedule.days.len(), 1);
        item.validate().expect("Should be valid");
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let mut bad = item("x", 1);
        bad.id = "  ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Task".parse::<EntityKind>().unwrap(), EntityKind::Task);
        assert!("chore".parse::<EntityKind>().is_err());
    }
}
