//! Application settings stored as JSON

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::config::{APP_DIR, DATA_FILENAME, FILENAME, PREFERENCES_FILENAME};
use crate::constants::layout::SAVE_DEBOUNCE_MS;
use crate::constants::table::PROJECTS_TABLE_ID;

/// Environment variable overriding the project data file
pub const DATA_ENV: &str = "PROJECT_BOARD_DATA";
/// Environment variable overriding the table id used for stored layouts
pub const TABLE_ID_ENV: &str = "PROJECT_BOARD_TABLE_ID";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Project data file; defaults to `projects.json` next to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(default = "default_table_id")]
    pub table_id: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Delay between the end of a column resize and the layout write
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_role")]
    pub role: String,
}

// Default value functions
fn default_table_id() -> String {
    PROJECTS_TABLE_ID.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    800.0
}

fn default_save_debounce_ms() -> u64 {
    SAVE_DEBOUNCE_MS
}

fn default_role() -> String {
    "admin".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            table_id: default_table_id(),
            log_level: default_log_level(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            save_debounce_ms: default_save_debounce_ms(),
            user_id: String::new(),
            role: default_role(),
        }
    }
}

impl AppConfig {
    /// Directory holding the config, preference store and default data file
    pub fn dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path
    }

    pub fn path() -> PathBuf {
        Self::dir().join(FILENAME)
    }

    pub fn preferences_path() -> PathBuf {
        Self::dir().join(PREFERENCES_FILENAME)
    }

    /// Load from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, creating default config");
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let mut config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
        config.validate_and_clamp();

        info!(path = %path.display(), table = %config.table_id, "Loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;

        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Apply `PROJECT_BOARD_DATA` / `PROJECT_BOARD_TABLE_ID`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data) = lookup(DATA_ENV).filter(|v| !v.trim().is_empty()) {
            info!(data = %data, "Data file overridden from environment");
            self.data_file = Some(PathBuf::from(data));
        }
        if let Some(table_id) = lookup(TABLE_ID_ENV).filter(|v| !v.trim().is_empty()) {
            info!(table = %table_id, "Table id overridden from environment");
            self.table_id = table_id;
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| Self::dir().join(DATA_FILENAME))
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Validate and clamp config values to safe ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.table_id.trim().is_empty() {
            warn!(using = PROJECTS_TABLE_ID, "table_id is empty, using default");
            self.table_id = default_table_id();
        }

        let level = self.log_level.trim().to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            self.log_level = level;
        } else {
            warn!(log_level = %self.log_level, "Unknown log_level, using info");
            self.log_level = default_log_level();
        }

        if !self.window_width.is_finite() || self.window_width < MIN_WINDOW_WIDTH {
            warn!(window_width = self.window_width, min = MIN_WINDOW_WIDTH, "window_width below minimum, clamping");
            self.window_width = MIN_WINDOW_WIDTH;
        } else if self.window_width > MAX_WINDOW_WIDTH {
            warn!(window_width = self.window_width, max = MAX_WINDOW_WIDTH, "window_width exceeds maximum, clamping");
            self.window_width = MAX_WINDOW_WIDTH;
        }

        if !self.window_height.is_finite() || self.window_height < MIN_WINDOW_HEIGHT {
            warn!(window_height = self.window_height, min = MIN_WINDOW_HEIGHT, "window_height below minimum, clamping");
            self.window_height = MIN_WINDOW_HEIGHT;
        } else if self.window_height > MAX_WINDOW_HEIGHT {
            warn!(window_height = self.window_height, max = MAX_WINDOW_HEIGHT, "window_height exceeds maximum, clamping");
            self.window_height = MAX_WINDOW_HEIGHT;
        }

        if self.save_debounce_ms > MAX_SAVE_DEBOUNCE_MS {
            warn!(save_debounce_ms = self.save_debounce_ms, max = MAX_SAVE_DEBOUNCE_MS, "save_debounce_ms exceeds maximum, clamping");
            self.save_debounce_ms = MAX_SAVE_DEBOUNCE_MS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("project-board-config-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = scratch_dir("first-run");
        let path = dir.join(FILENAME);

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = scratch_dir("partial");
        let path = dir.join(FILENAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, r#"{ "user_id": "7", "role": "user" }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.user_id, "7");
        assert_eq!(config.role, "user");
        assert_eq!(config.table_id, PROJECTS_TABLE_ID);
        assert_eq!(config.save_debounce_ms, SAVE_DEBOUNCE_MS);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        let path = dir.join(FILENAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "table_id = 3").unwrap();

        assert!(AppConfig::load_from(&path).is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_validate_and_clamp() {
        let mut config = AppConfig {
            table_id: "  ".into(),
            log_level: "LOUD".into(),
            window_width: 10.0,
            window_height: 100_000.0,
            save_debounce_ms: 60_000,
            ..Default::default()
        };
        config.validate_and_clamp();

        assert_eq!(config.table_id, PROJECTS_TABLE_ID);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.window_width, crate::constants::validation::MIN_WINDOW_WIDTH);
        assert_eq!(config.window_height, crate::constants::validation::MAX_WINDOW_HEIGHT);
        assert_eq!(config.save_debounce_ms, crate::constants::validation::MAX_SAVE_DEBOUNCE_MS);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(|name| match name {
            DATA_ENV => Some("/tmp/board.json".to_string()),
            TABLE_ID_ENV => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.data_path(), PathBuf::from("/tmp/board.json"));
        assert_eq!(config.table_id, PROJECTS_TABLE_ID);
    }
}
