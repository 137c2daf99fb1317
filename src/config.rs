//! Agent configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::healing::settings::HealingConfig;
use crate::input::KeyTiming;
use crate::kernel::context::{CaveHotkeys, Waypoint};
use crate::kernel::time::{PAUSE_BACKOFF_MS, TICK_MS};

/// Environment variable that overrides the actuator port.
pub const PORT_ENV: &str = "ACTUATOR_PORT";

/// Port used when neither the environment nor the config names one.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which decision stage drives the loop. Exactly one per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMode {
    #[default]
    Scripted,
    Learning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub tick_budget_ms: u64,
    pub pause_backoff_ms: u64,
    pub mode: DecisionMode,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: TICK_MS,
            pause_backoff_ms: PAUSE_BACKOFF_MS,
            mode: DecisionMode::Scripted,
        }
    }
}

impl ControlConfig {
    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }

    pub fn pause_backoff(&self) -> Duration {
        Duration::from_millis(self.pause_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub port: Option<String>,
    pub press_duration_ms: u64,
    pub hotkey_interval_ms: u64,
    pub write_delay_ms: u64,
    /// Record commands in memory instead of opening the device.
    pub dry_run: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            port: None,
            press_duration_ms: 50,
            hotkey_interval_ms: 10,
            write_delay_ms: 10,
            dry_run: false,
        }
    }
}

impl ActuatorConfig {
    pub fn timing(&self) -> KeyTiming {
        KeyTiming {
            press_duration: Duration::from_millis(self.press_duration_ms),
            hotkey_interval: Duration::from_millis(self.hotkey_interval_ms),
            write_delay: Duration::from_millis(self.write_delay_ms),
        }
    }

    /// Resolves the port from the process environment.
    pub fn resolve_port(&self) -> (String, PortSource) {
        self.resolve_port_with(std::env::var(PORT_ENV).ok())
    }

    /// Env override first, then the configured port, then [`DEFAULT_PORT`].
    pub fn resolve_port_with(&self, env: Option<String>) -> (String, PortSource) {
        if let Some(port) = env.filter(|p| !p.trim().is_empty()) {
            return (port, PortSource::Environment);
        }
        if let Some(port) = self.port.as_ref().filter(|p| !p.trim().is_empty()) {
            return (port.clone(), PortSource::Config);
        }
        warn!(
            default = DEFAULT_PORT,
            "{} not set and no port configured, using default", PORT_ENV
        );
        (DEFAULT_PORT.to_string(), PortSource::Default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSource {
    Environment,
    Config,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    pub enabled: bool,
    pub run_to_creatures: bool,
    pub ignored_creatures: Vec<String>,
    pub task_request_debounce_ticks: u64,
    pub hotkeys: CaveHotkeys,
    pub waypoints: Vec<Waypoint>,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            run_to_creatures: false,
            ignored_creatures: Vec::new(),
            task_request_debounce_ticks: 10,
            hotkeys: CaveHotkeys::default(),
            waypoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub control: ControlConfig,
    pub actuator: ActuatorConfig,
    pub cave: CaveConfig,
    pub healing: HealingConfig,
}

impl AgentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control.tick_budget_ms == 0 {
            return Err(ConfigError::Invalid("control.tick_budget_ms must be > 0".into()));
        }
        for (name, value) in self.healing.thresholds() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "healing.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
