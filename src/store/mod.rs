//! Directory-backed store of habit and task files.
//!
//! Each `.toml` or `.json` file in the habits directory holds one
//! [`TrackedItem`]. Other files are ignored.

mod create;
mod list;

pub use create::create;
pub use list::{ItemFile, list};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use habitcal_core::{HabitCalError, HabitCalResult, ScheduleStore, TrackedItem};
use tracing::warn;

/// Serialization format, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(FileFormat::Toml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Toml => "toml",
            FileFormat::Json => "json",
        }
    }

    pub fn parse(self, content: &str) -> Result<TrackedItem> {
        match self {
            FileFormat::Toml => toml::from_str(content).context("Invalid TOML item"),
            FileFormat::Json => serde_json::from_str(content).context("Invalid JSON item"),
        }
    }

    pub fn render(self, item: &TrackedItem) -> Result<String> {
        match self {
            FileFormat::Toml => toml::to_string_pretty(item).context("Could not serialize item"),
            FileFormat::Json => {
                serde_json::to_string_pretty(item).context("Could not serialize item")
            }
        }
    }
}

/// The habits directory as a [`ScheduleStore`].
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: PathBuf) -> Self {
        DirStore { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScheduleStore for DirStore {
    /// Parsed items only; unreadable files are logged and left out.
    fn list(&self) -> HabitCalResult<Vec<TrackedItem>> {
        let files = list(&self.dir).map_err(|e| HabitCalError::Store(format!("{e:#}")))?;

        Ok(files
            .into_iter()
            .filter_map(|file| match file.item {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(path = %file.path.display(), "Skipping unreadable item: {}", e);
                    None
                }
            })
            .collect())
    }
}
