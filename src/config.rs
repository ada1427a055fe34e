//! CLI settings: defaults, then `~/.defi-canvas/config.toml` (or
//! `--config`), then environment variables and flags (resolved by clap).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const ENV_ENGINE_URL: &str = "DEFI_CANVAS_ENGINE_URL";
pub const ENV_BACKEND_URL: &str = "DEFI_CANVAS_BACKEND_URL";
pub const ENV_POLL_SECS: &str = "DEFI_CANVAS_POLL_SECS";
pub const ENV_LOG_CAPACITY: &str = "DEFI_CANVAS_LOG_CAPACITY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the execution engine (`/workflow`, `/logs/{id}`).
    pub engine_url: String,
    /// Base URL of the account backend (`/balances`, `/transactions`, AI).
    pub backend_url: String,
    pub poll_secs: u64,
    /// Raw log entries kept per execution; 0 keeps everything.
    pub log_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            engine_url: "http://localhost:3001".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            poll_secs: 2,
            log_capacity: 500,
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub engine_url: Option<String>,
    pub backend_url: Option<String>,
    pub poll_secs: Option<u64>,
    pub log_capacity: Option<usize>,
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".defi-canvas").join("config.toml"))
    }

    /// Load settings from `explicit`, or from the default path if it exists.
    /// An explicit path that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Settings::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = Self::from_toml(&content)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.engine_url {
            self.engine_url = url;
        }
        if let Some(url) = overrides.backend_url {
            self.backend_url = url;
        }
        if let Some(secs) = overrides.poll_secs {
            self.poll_secs = secs;
        }
        if let Some(cap) = overrides.log_capacity {
            self.log_capacity = cap;
        }
        self.check()?;
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn log_capacity(&self) -> Option<usize> {
        (self.log_capacity > 0).then_some(self.log_capacity)
    }

    fn check(&self) -> Result<()> {
        for (name, url) in [("engine_url", &self.engine_url), ("backend_url", &self.backend_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{name} must be an http(s) URL, got `{url}`");
            }
        }
        if self.poll_secs == 0 {
            bail!("poll_secs must be at least 1");
        }
        Ok(())
    }
}
