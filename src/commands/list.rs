use anyhow::Result;
use habitcal_core::HabitCalConfig;

use super::{load_aggregator, require_items};
use crate::render::Render;

pub fn run(config: &HabitCalConfig) -> Result<()> {
    let aggregator = load_aggregator(config)?;
    require_items(&aggregator, config)?;

    for item in aggregator.items() {
        println!("{}", item.render());
    }

    Ok(())
}
