pub mod calendar;
pub mod check;
pub mod list;
pub mod new;
pub mod show;

use std::sync::Arc;

use anyhow::{Context, Result};
use habitcal_core::{CalendarAggregator, HabitCalConfig, MappingCache};

use crate::store::DirStore;

/// Aggregator loaded from the configured habits directory.
pub fn load_aggregator(config: &HabitCalConfig) -> Result<CalendarAggregator> {
    let cache = Arc::new(MappingCache::new(config.expand_options()?));
    let store = DirStore::new(config.habits_path());

    let mut aggregator = CalendarAggregator::new(cache);
    aggregator
        .refresh(&store)
        .with_context(|| format!("Failed to load items from {}", store.dir().display()))?;

    Ok(aggregator)
}

/// Shared error message for an empty habits directory
pub fn require_items(aggregator: &CalendarAggregator, config: &HabitCalConfig) -> Result<()> {
    if aggregator.items().is_empty() {
        anyhow::bail!(
            "No habits or tasks found in {}.\n\n\
            Create your first one with:\n  \
            habitcal new \"Meditate\" --span day",
            config.habits_dir.display()
        );
    }
    Ok(())
}
