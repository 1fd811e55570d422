use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::error::{FloatnotesError, Result};
use crate::lifecycle::RearmPolicy;
use crate::storage::DEFAULT_STORAGE_KEY;

pub const CONFIG_FILE: &str = "config.yaml";

/// Which gateway delivers fired reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    #[default]
    Terminal,
    Desktop,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub backend: NotificationBackend,
    pub icon: String,
    pub app_name: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend: NotificationBackend::default(),
            icon: "alarm-clock".to_string(),
            app_name: "floatnotes".to_string(),
        }
    }
}

/// Per-directory settings, stored as `.floatnotes/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend key holding the note collection
    pub storage_key: String,
    pub poll_interval_secs: u64,
    pub due_window_secs: u64,
    pub rearm_policy: RearmPolicy,
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            poll_interval_secs: engine.poll_interval.as_secs(),
            due_window_secs: engine.due_window.as_secs(),
            rearm_policy: RearmPolicy::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Config {
    /// Load from `dir`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILE), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(FloatnotesError::Config(
                "storage_key must not be empty".to_string(),
            ));
        }
        self.engine_config().map(|_| ())
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.due_window_secs),
        )
    }
}
