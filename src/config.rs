use crate::sampler::{DEFAULT_CPU_THRESHOLD_PERCENT, DEFAULT_POLL_INTERVAL, SamplerConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Alert when a container's CPU usage is above this percentage.
    pub cpu_threshold_percent: f64,
    pub poll_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cpu_threshold_percent: DEFAULT_CPU_THRESHOLD_PERCENT,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file written alongside stdout. Empty disables it.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "docker_monitor.log".into(),
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE`, else `config.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load_from_path(&path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_path(DEFAULT_CONFIG_PATH)
            }
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Like [`load`](Self::load), but on failure hands back defaults with the error, so logging
    /// can still be set up to report it.
    pub fn load_or_default() -> (Self, Option<anyhow::Error>) {
        match Self::load() {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.monitor.cpu_threshold_percent.is_finite()
                && self.monitor.cpu_threshold_percent > 0.0,
            "monitor.cpu_threshold_percent must be a positive number, got {}",
            self.monitor.cpu_threshold_percent
        );
        anyhow::ensure!(
            self.monitor.poll_interval_secs >= 1,
            "monitor.poll_interval_secs must be >= 1, got {}",
            self.monitor.poll_interval_secs
        );
        Ok(())
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            cpu_threshold_percent: self.monitor.cpu_threshold_percent,
            poll_interval: Duration::from_secs(self.monitor.poll_interval_secs),
            ..Default::default()
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        let file = self.logging.file.trim();
        (!file.is_empty()).then(|| Path::new(file))
    }
}
