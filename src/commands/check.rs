use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use habitcal_core::HabitCalConfig;
use owo_colors::OwoColorize;

use crate::store::{ItemFile, list};

/// Problems found in one file.
struct FileReport {
    path: PathBuf,
    problems: Vec<String>,
}

pub fn run(config: &HabitCalConfig) -> Result<()> {
    let dir = config.habits_path();
    let files = list(&dir)?;

    if files.is_empty() {
        println!("{}", format!("No item files in {}", dir.display()).dimmed());
        return Ok(());
    }

    let reports = check_files(&files);
    let failing = reports.iter().filter(|r| !r.problems.is_empty()).count();

    for report in &reports {
        let name = report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if report.problems.is_empty() {
            println!("{} {}", "✓".green(), name);
        } else {
            println!("{} {}", "✗".red(), name);
            for problem in &report.problems {
                println!("   {}", problem.red());
            }
        }
    }

    if failing > 0 {
        anyhow::bail!("{} of {} files have problems", failing, reports.len());
    }

    Ok(())
}

/// Parse errors, schedule problems and duplicate ids, per file.
fn check_files(files: &[ItemFile]) -> Vec<FileReport> {
    let mut seen_ids: HashMap<&str, &PathBuf> = HashMap::new();

    files
        .iter()
        .map(|file| {
            let mut problems = Vec::new();

            match &file.item {
                Err(e) => problems.push(format!("{e:#}")),
                Ok(item) => {
                    if item.id.trim().is_empty() {
                        problems.push("id must not be empty".to_string());
                    }
                    problems.extend(item.schedule.problems());

                    if let Some(other) = seen_ids.insert(&item.id, &file.path) {
                        problems.push(format!(
                            "duplicate id '{}' (also in {})",
                            item.id,
                            other.display()
                        ));
                    }
                }
            }

            FileReport {
                path: file.path.clone(),
                problems,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &std::path::Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_check_reports_each_problem() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let ok = r#"
id = "walk"
name = "Walk"
start = "2024-01-01"

[schedule]
span = "day"
"#;
        write(dir.path(), "a.toml", ok);
        write(dir.path(), "b.toml", ok);
        write(
            dir.path(),
            "c.toml",
            r#"
id = "zero"
name = "Zero"
start = "2024-01-01"

[schedule]
span = "week"
span_value = 0
"#,
        );
        write(dir.path(), "d.json", "[]");

        let files = list(dir.path()).expect("Should list files");
        let reports = check_files(&files);

        assert!(reports[0].problems.is_empty());
        assert!(reports[1].problems[0].contains("duplicate id 'walk'"));
        assert!(reports[2].problems[0].contains("span_value"));
        assert_eq!(reports[3].problems.len(), 1);
    }
}
