//! Create item files in the habits directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use habitcal_core::TrackedItem;

use super::FileFormat;

/// Write a new item file and return its path.
///
/// The file name is the slugified item name, with a numeric suffix (-2, -3,
/// etc) when that name is taken.
pub fn create(dir: &Path, item: &TrackedItem, format: FileFormat) -> Result<PathBuf> {
    item.validate()?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let content = format.render(item)?;
    let path = dir.join(unique_filename(&item.name, dir, format)?);

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

fn base_name(name: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.chars().take(50).collect()
    }
}

/// First free file name for `name`, adding -2, -3, etc. on collision.
fn unique_filename(name: &str, dir: &Path, format: FileFormat) -> Result<String> {
    let base = base_name(name);
    let ext = format.extension();

    let candidate = format!("{}.{}", base, ext);
    if !dir.join(&candidate).exists() {
        return Ok(candidate);
    }

    for n in 2..=100 {
        let suffixed = format!("{}-{}.{}", base, n, ext);
        if !dir.join(&suffixed).exists() {
            return Ok(suffixed);
        }
    }

    anyhow::bail!("Too many filename collisions for {}", candidate)
}
