//! Folding per-owner mappings into per-day calendar summaries.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::MappingCache;
use crate::combine::ViewType;
use crate::date_range::DateRange;
use crate::error::HabitCalResult;
use crate::occurrence::{Mapping, Occurrence};
use crate::store::{EntityKind, ScheduleStore, StoreChanges, StoreSnapshot, TrackedItem};

/// One owner's content on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayItem {
    pub owner_id: String,
    pub kind: EntityKind,
    pub name: String,
    pub occurrence: Occurrence,
}

/// Everything that applies to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub habit_count: usize,
    pub task_count: usize,
    pub items: Vec<DayItem>,
    /// Non-empty occurrence descriptions, in item order.
    pub notes: Vec<String>,
}

impl DaySummary {
    fn empty(date: NaiveDate) -> Self {
        DaySummary {
            date,
            habit_count: 0,
            task_count: 0,
            items: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, item: &TrackedItem, occurrence: &Occurrence) {
        match item.kind {
            EntityKind::Habit => self.habit_count += 1,
            EntityKind::Task => self.task_count += 1,
        }
        if !occurrence.description.is_empty() {
            self.notes.push(occurrence.description.clone());
        }
        self.items.push(DayItem {
            owner_id: item.id.clone(),
            kind: item.kind,
            name: item.name.clone(),
            occurrence: occurrence.clone(),
        });
    }
}

/// Keeps the current item list in step with a store and answers calendar
/// queries through a shared [`MappingCache`].
#[derive(Debug)]
pub struct CalendarAggregator {
    cache: Arc<MappingCache>,
    items: Vec<TrackedItem>,
    snapshot: StoreSnapshot,
}

impl CalendarAggregator {
    pub fn new(cache: Arc<MappingCache>) -> Self {
        CalendarAggregator {
            cache,
            items: Vec::new(),
            snapshot: StoreSnapshot::default(),
        }
    }

    pub fn cache(&self) -> &Arc<MappingCache> {
        &self.cache
    }

    /// Items in display order: habits first, then by name.
    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&TrackedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Reload items from `store` and invalidate the owners that changed.
    ///
    /// Items failing validation are left out.
    pub fn refresh(&mut self, store: &dyn ScheduleStore) -> HabitCalResult<StoreChanges> {
        let mut items: Vec<TrackedItem> = store
            .list()?
            .into_iter()
            .filter(|item| match item.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(id = %item.id, "Skipping item: {}", e);
                    false
                }
            })
            .collect();
        items.sort_by(|a, b| (a.kind, &a.name, &a.id).cmp(&(b.kind, &b.name, &b.id)));

        let snapshot = StoreSnapshot::capture(&items);
        let changes = self.snapshot.changes(&snapshot);

        for owner in changes.stale_owners() {
            self.cache.invalidate(owner);
        }
        if !changes.is_empty() {
            debug!(
                added = changes.added.len(),
                updated = changes.updated.len(),
                removed = changes.removed.len(),
                "Store changed"
            );
        }

        self.items = items;
        self.snapshot = snapshot;
        Ok(changes)
    }

    /// One owner's occurrences in `range`.
    pub fn occurrences(&self, id: &str, range: DateRange, view: ViewType) -> Option<Mapping> {
        self.item(id).map(|item| self.mapping_for(item, range, view))
    }

    /// One summary per day of `range`, including empty days.
    pub fn summarize(&self, range: DateRange, view: ViewType) -> Vec<DaySummary> {
        let mappings: Vec<(&TrackedItem, Mapping)> = self
            .items
            .iter()
            .map(|item| (item, self.mapping_for(item, range, view)))
            .collect();

        range
            .days()
            .map(|date| {
                let mut summary = DaySummary::empty(date);
                for (item, mapping) in &mappings {
                    if let Some(occurrence) = mapping.get(&date) {
                        summary.push(item, occurrence);
                    }
                }
                summary
            })
            .collect()
    }

    fn mapping_for(&self, item: &TrackedItem, range: DateRange, view: ViewType) -> Mapping {
        self.cache
            .get(&item.id, &item.schedule, &item.start, view, range)
    }
}
