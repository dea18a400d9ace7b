use crate::errors::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserProfile,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserProfile {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
}

/// Timeouts used when a caller does not pass its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default budget for `wait_for*` conditions.
    pub condition_ms: u64,
    /// Budget for locating an element before an action runs against it.
    pub command_ms: u64,
    pub page_load_ms: u64,
    /// Delay between two polls of the same wait.
    pub polling_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserType {
    Chrome,
    Firefox,
    Safari,
    Edge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.timeouts.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl TimeoutConfig {
    pub fn condition(&self) -> Duration {
        Duration::from_millis(self.condition_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polling_interval_ms == 0 {
            return Err(BrowserError::ConfigurationError(
                "polling_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chrome,
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            condition_ms: 30000,
            command_ms: 60000,
            page_load_ms: 15000,
            polling_interval_ms: 300,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
