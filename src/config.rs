//! Configuration loading and management
//!
//! Handles parsing of `studyflow.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::theme::Theme;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "studyflow.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Key-value store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task limits
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Pomodoro timer settings
    #[serde(default)]
    pub timer: TimerConfig,

    /// Notification defaults
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Presentation defaults
    #[serde(default)]
    pub ui: UiConfig,
}

/// Key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix applied to every persisted key
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "studyflow_".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Task limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Maximum number of tasks in the collection
    #[serde(default = "default_max_tasks")]
    pub max_tasks: usize,

    /// Maximum title length, in characters
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Maximum description length, in characters
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
}

fn default_max_tasks() -> usize {
    1000
}

fn default_max_title_length() -> usize {
    100
}

fn default_max_description_length() -> usize {
    1000
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_tasks: default_max_tasks(),
            max_title_length: default_max_title_length(),
            max_description_length: default_max_description_length(),
        }
    }
}

/// Pomodoro timer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,

    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,

    /// Work sessions completed before a long break is due
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,

    /// Seconds before the end of a phase at which an alert is raised
    #[serde(default = "default_alert_before_end_secs")]
    pub alert_before_end_secs: u32,
}

fn default_work_minutes() -> u32 {
    25
}

fn default_short_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

fn default_sessions_before_long_break() -> u32 {
    4
}

fn default_alert_before_end_secs() -> u32 {
    30
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            sessions_before_long_break: default_sessions_before_long_break(),
            alert_before_end_secs: default_alert_before_end_secs(),
        }
    }
}

/// Notification defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Display duration used when a caller does not pick one
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
}

fn default_duration_ms() -> u64 {
    3000
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
        }
    }
}

/// Presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme used until the user picks one
    #[serde(default)]
    pub default_theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::Light,
        }
    }
}

impl Config {
    /// Load configuration from a `studyflow.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults when
    /// no file exists there
    pub fn load_from_dir(data_dir: &Path) -> crate::error::Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.tasks.validate()?;
        self.timer.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let prefix = self.prefix.as_str();
        if prefix.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.prefix cannot be empty".to_string(),
            ));
        }
        if !prefix
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(crate::error::Error::InvalidConfig(
                "storage.prefix may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.max_tasks == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.max_tasks must be > 0".to_string(),
            ));
        }
        if self.max_title_length == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.max_title_length must be > 0".to_string(),
            ));
        }
        if self.max_description_length == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.max_description_length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl TimerConfig {
    fn validate(&self) -> crate::error::Result<()> {
        for (field, value) in [
            ("timer.work_minutes", self.work_minutes),
            ("timer.short_break_minutes", self.short_break_minutes),
            ("timer.long_break_minutes", self.long_break_minutes),
            (
                "timer.sessions_before_long_break",
                self.sessions_before_long_break,
            ),
        ] {
            if value == 0 {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} must be > 0"
                )));
            }
        }
        if u64::from(self.alert_before_end_secs) >= u64::from(self.work_minutes) * 60 {
            return Err(crate::error::Error::InvalidConfig(
                "timer.alert_before_end_secs must be shorter than a work session".to_string(),
            ));
        }
        Ok(())
    }
}
