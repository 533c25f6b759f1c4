use anyhow::Result;
use habitcal_core::{DateRange, HabitCalConfig, ViewType};
use owo_colors::OwoColorize;

use super::load_aggregator;
use crate::render::Render;

pub fn run(config: &HabitCalConfig, id: &str, view: ViewType, range: DateRange) -> Result<()> {
    let aggregator = load_aggregator(config)?;

    let Some(item) = aggregator.item(id) else {
        let available: Vec<&str> = aggregator.items().iter().map(|i| i.id.as_str()).collect();
        anyhow::bail!(
            "Item '{}' not found. Available: {}",
            id,
            available.join(", ")
        );
    };

    println!("{}", item.render());
    println!("{}", format!("   {} view, {}", view, range).dimmed());
    println!();

    let occurrences = aggregator.occurrences(id, range, view).unwrap_or_default();
    if occurrences.is_empty() {
        println!("{}", "   Nothing scheduled in this range".dimmed());
        return Ok(());
    }

    for occurrence in occurrences.values() {
        println!("{}", occurrence.render());
    }

    Ok(())
}
