use std::sync::Arc;

use anyhow::{Context, Result};
use habitcal_core::{CalendarAggregator, DateRange, HabitCalConfig, ViewType};
use tracing::debug;

use super::{load_aggregator, require_items};
use crate::render::Render;

pub async fn run(config: &HabitCalConfig, view: ViewType, range: DateRange) -> Result<()> {
    let aggregator = load_aggregator(config)?;
    require_items(&aggregator, config)?;

    warm_cache(&aggregator, view, range).await?;

    let days = aggregator.summarize(range, view);
    for (i, day) in days.iter().enumerate() {
        println!("{}", day.render());

        // Add spacing between days (but not after the last one)
        if i < days.len() - 1 {
            println!();
        }
    }

    Ok(())
}

/// Expand every item in parallel so `summarize` only reads cached mappings.
async fn warm_cache(aggregator: &CalendarAggregator, view: ViewType, range: DateRange) -> Result<()> {
    let tasks: Vec<_> = aggregator
        .items()
        .iter()
        .cloned()
        .map(|item| {
            let cache = Arc::clone(aggregator.cache());
            tokio::task::spawn_blocking(move || {
                cache.get(&item.id, &item.schedule, &item.start, view, range);
            })
        })
        .collect();

    for task in tasks {
        task.await.context("Expansion task failed")?;
    }

    debug!(stats = ?aggregator.cache().stats(), "Cache warmed");
    Ok(())
}
