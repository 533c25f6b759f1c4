//! Global habitcal configuration.

use std::path::{Path, PathBuf};

use chrono::Weekday;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::combine::ViewType;
use crate::error::{HabitCalError, HabitCalResult};
use crate::expand::{DEFAULT_DAY_HORIZON_DAYS, DEFAULT_MONTH_HORIZON_DAYS, ExpandOptions};
use crate::resolve::parse_weekday;

static DEFAULT_HABITS_PATH: &str = "~/habits";
static DEFAULT_WEEK_START: &str = "monday";

/// Prefix for environment overrides, e.g. `HABITCAL_HABITS_DIR`.
pub const ENV_PREFIX: &str = "HABITCAL";

fn default_habits_path() -> PathBuf {
    PathBuf::from(DEFAULT_HABITS_PATH)
}

fn default_week_start() -> String {
    DEFAULT_WEEK_START.to_string()
}

fn default_day_horizon_days() -> i64 {
    DEFAULT_DAY_HORIZON_DAYS
}

fn default_month_horizon_days() -> i64 {
    DEFAULT_MONTH_HORIZON_DAYS
}

/// Configuration at ~/.config/habitcal/config.toml, overridable through
/// `HABITCAL_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HabitCalConfig {
    #[serde(default = "default_habits_path")]
    pub habits_dir: PathBuf,

    /// First day of the calendar week, e.g. "monday" or "sun".
    #[serde(default = "default_week_start")]
    pub week_start: String,

    #[serde(default = "default_day_horizon_days")]
    pub day_horizon_days: i64,

    #[serde(default = "default_month_horizon_days")]
    pub month_horizon_days: i64,

    #[serde(default)]
    pub default_view: ViewType,
}

impl Default for HabitCalConfig {
    fn default() -> Self {
        HabitCalConfig {
            habits_dir: default_habits_path(),
            week_start: default_week_start(),
            day_horizon_days: DEFAULT_DAY_HORIZON_DAYS,
            month_horizon_days: DEFAULT_MONTH_HORIZON_DAYS,
            default_view: ViewType::default(),
        }
    }
}

impl HabitCalConfig {
    pub fn config_path() -> HabitCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HabitCalError::Config("Could not determine config directory".into()))?
            .join("habitcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, creating a commented default on first run.
    pub fn load() -> HabitCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::build(&config_path, true)
    }

    /// Load a specific file without environment overrides.
    pub fn load_from(path: &Path) -> HabitCalResult<Self> {
        Self::build(path, false)
    }

    fn build(path: &Path, with_env: bool) -> HabitCalResult<Self> {
        let mut builder = Config::builder().add_source(File::from(path).required(false));
        if with_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        }

        let config: HabitCalConfig = builder
            .build()
            .map_err(|e| HabitCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HabitCalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> HabitCalResult<()> {
        self.first_weekday()?;
        if self.day_horizon_days < 1 || self.month_horizon_days < 1 {
            return Err(HabitCalError::Config(
                "Horizons must be at least one day".into(),
            ));
        }
        Ok(())
    }

    /// The habits directory with `~` expanded.
    pub fn habits_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.habits_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn first_weekday(&self) -> HabitCalResult<Weekday> {
        parse_weekday(&self.week_start).ok_or_else(|| {
            HabitCalError::Config(format!("Unknown week_start '{}'", self.week_start))
        })
    }

    /// Expansion options derived from this config, with no `until`.
    pub fn expand_options(&self) -> HabitCalResult<ExpandOptions> {
        Ok(ExpandOptions {
            until: None,
            first_weekday: self.first_weekday()?,
            day_horizon_days: self.day_horizon_days,
            month_horizon_days: self.month_horizon_days,
        })
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> HabitCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HabitCalError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| HabitCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> HabitCalResult<()> {
        let contents = format!(
            "\
# habitcal configuration

# Where your habit and task files live:
# habits_dir = \"{}\"

# First day of the week (monday, sunday, ...):
# week_start = \"{}\"

# How far ahead never-ending schedules are expanded, in days:
# day_horizon_days = {}
# month_horizon_days = {}

# View used when --view is not given (daily, weekly, monthly):
# default_view = \"daily\"
",
            DEFAULT_HABITS_PATH,
            DEFAULT_WEEK_START,
            DEFAULT_DAY_HORIZON_DAYS,
            DEFAULT_MONTH_HORIZON_DAYS,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HabitCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| HabitCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_as_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("habitcal").join("config.toml");

        HabitCalConfig::create_default_config(&path).expect("Should write default config");
        let config = HabitCalConfig::load_from(&path).expect("Should load config");

        assert_eq!(config, HabitCalConfig::default());
        assert_eq!(config.first_weekday().unwrap(), Weekday::Mon);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let config =
            HabitCalConfig::load_from(&dir.path().join("absent.toml")).expect("Should load");
        assert_eq!(config.day_horizon_days, DEFAULT_DAY_HORIZON_DAYS);
    }

    #[test]
    fn test_overrides_flow_into_expand_options() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "week_start = \"sun\"\nday_horizon_days = 90\ndefault_view = \"weekly\"\n",
        )
        .expect("Should write config");

        let config = HabitCalConfig::load_from(&path).expect("Should load config");
        let options = config.expand_options().expect("Should build options");

        assert_eq!(options.first_weekday, Weekday::Sun);
        assert_eq!(options.day_horizon_days, 90);
        assert_eq!(options.month_horizon_days, DEFAULT_MONTH_HORIZON_DAYS);
        assert_eq!(config.default_view, ViewType::Weekly);
    }

    #[test]
    fn test_invalid_week_start_rejected() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "week_start = \"someday\"\n").expect("Should write config");

        assert!(HabitCalConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        let config = HabitCalConfig {
            habits_dir: PathBuf::from("/tmp/habits"),
            ..HabitCalConfig::default()
        };

        config.save(&path).expect("Should save");
        assert_eq!(HabitCalConfig::load_from(&path).expect("Should load"), config);
    }
}
