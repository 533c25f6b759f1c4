//! List item files in the habits directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use habitcal_core::TrackedItem;

use super::FileFormat;

/// One item file and what came out of parsing it.
#[derive(Debug)]
pub struct ItemFile {
    pub path: PathBuf,
    pub item: Result<TrackedItem>,
}

/// List every `.toml` / `.json` file in `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn list(dir: &Path) -> Result<Vec<ItemFile>> {
    let mut files = Vec::new();

    if !dir.exists() {
        return Ok(files);
    }

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();

        if path.is_file()
            && let Some(format) = FileFormat::from_path(&path)
        {
            let item = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
                .and_then(|content| format.parse(&content));

            files.push(ItemFile { path, item });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_reads_toml_and_json() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        std::fs::write(
            dir.path().join("b-stretch.json"),
            r#"{
                "id": "stretch",
                "kind": "habit",
                "name": "Stretch",
                "start": "2024-01-01T07:00",
                "schedule": { "span": "day", "days": [{ "index": 1 }] }
            }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a-rent.toml"),
            r#"
id = "rent"
kind = "task"
name = "Pay rent"
start = "2024-01-01"

[schedule]
span = "month"

[[schedule.months]]
index = 1
steps = [{ text = "Transfer", day = "start_of_month" }]
"#,
        )
        .unwrap();

        let files = list(dir.path()).expect("Should list files");
        let ids: Vec<String> = files
            .iter()
            .map(|f| f.item.as_ref().expect("Should parse").id.clone())
            .collect();

        assert_eq!(ids, vec!["rent", "stretch"]);
    }

    #[test]
    fn test_list_keeps_parse_errors() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        std::fs::write(dir.path().join("bad.toml"), "id = ").unwrap();

        let files = list(dir.path()).expect("Should list files");
        assert_eq!(files.len(), 1);
        assert!(files[0].item.is_err());
    }
}
