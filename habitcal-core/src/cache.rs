//! Per-owner memoization of combined mappings.
//!
//! Entries are keyed by owner id and view. An entry remembers the date range
//! it was computed for; a request outside that range recomputes the whole
//! entry for the union of both ranges. Entries are never patched in place.
//!
//! Staleness is structural only: the host calls [`MappingCache::invalidate`]
//! when an owner's schedule changes. There is no TTL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use crate::combine::{ViewType, combine_for_view};
use crate::date_range::DateRange;
use crate::expand::ExpandOptions;
use crate::occurrence::Mapping;
use crate::schedule::{ScheduleDefinition, StartTime};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    owner: String,
    view: ViewType,
}

#[derive(Debug)]
struct CacheEntry {
    covered: DateRange,
    mapping: Mapping,
}

/// One key's entry. The mutex serializes recomputes for the same key.
#[derive(Debug, Default)]
struct Slot {
    entry: Mutex<Option<CacheEntry>>,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub recomputes: u64,
    pub entries: usize,
}

/// Thread-safe mapping cache, shared by handle (e.g. `Arc<MappingCache>`).
#[derive(Debug)]
pub struct MappingCache {
    slots: RwLock<HashMap<CacheKey, Arc<Slot>>>,
    options: ExpandOptions,
    hits: AtomicU64,
    recomputes: AtomicU64,
}

impl Default for MappingCache {
    fn default() -> Self {
        MappingCache::new(ExpandOptions::default())
    }
}

impl MappingCache {
    /// `options.until` is ignored; each recompute sets it from the range.
    pub fn new(options: ExpandOptions) -> Self {
        MappingCache {
            slots: RwLock::new(HashMap::new()),
            options,
            hits: AtomicU64::new(0),
            recomputes: AtomicU64::new(0),
        }
    }

    /// Occurrences of `owner_id`'s schedule inside `range`, for `view`.
    pub fn get(
        &self,
        owner_id: &str,
        schedule: &ScheduleDefinition,
        start: &StartTime,
        view: ViewType,
        range: DateRange,
    ) -> Mapping {
        let slot = self.slot(owner_id, view);
        let mut entry = lock(&slot.entry);

        if let Some(existing) = entry.as_ref()
            && existing.covered.covers(&range)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return range.slice(&existing.mapping);
        }

        let covered = match entry.as_ref() {
            Some(existing) => existing.covered.union(&range),
            None => range,
        };
        debug!(owner = owner_id, %view, %covered, "Recomputing mapping");

        let options = self.options.until(covered.end);
        let mapping = combine_for_view(schedule, start, view, &options);
        let result = range.slice(&mapping);

        *entry = Some(CacheEntry { covered, mapping });
        self.recomputes.fetch_add(1, Ordering::Relaxed);

        result
    }

    /// Drop every cached view of one owner. Unknown ids are ignored.
    pub fn invalidate(&self, owner_id: &str) {
        let mut slots = write(&self.slots);
        let before = slots.len();
        slots.retain(|key, _| key.owner != owner_id);

        if slots.len() != before {
            info!(owner = owner_id, "Invalidated cached mappings");
        }
    }

    pub fn invalidate_all(&self) {
        let mut slots = write(&self.slots);
        if !slots.is_empty() {
            info!(entries = slots.len(), "Invalidated all cached mappings");
        }
        slots.clear();
    }

    /// Range currently covered for an owner and view, if cached.
    pub fn covered_range(&self, owner_id: &str, view: ViewType) -> Option<DateRange> {
        let key = CacheKey {
            owner: owner_id.to_string(),
            view,
        };
        let slot = read(&self.slots).get(&key).cloned()?;
        let entry = lock(&slot.entry);
        entry.as_ref().map(|e| e.covered)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            recomputes: self.recomputes.load(Ordering::Relaxed),
            entries: read(&self.slots).len(),
        }
    }

    fn slot(&self, owner_id: &str, view: ViewType) -> Arc<Slot> {
        let key = CacheKey {
            owner: owner_id.to_string(),
            view,
        };

        if let Some(slot) = read(&self.slots).get(&key) {
            return Arc::clone(slot);
        }

        Arc::clone(write(&self.slots).entry(key).or_default())
    }
}

// A panic mid-recompute never leaves a half-built entry behind (entries are
// assigned whole), so poisoned locks are safe to keep using.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
