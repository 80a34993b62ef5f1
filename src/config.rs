use crate::error::SmartPingError;
use crate::signature::Credentials;
use anyhow::Result;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_BASE_URL: &str = "https://www.fftt.com/mobile/pxml";

pub const ENV_APP_ID: &str = "SMARTPING_APP_ID";
pub const ENV_PASSWORD: &str = "SMARTPING_PASSWORD";
pub const ENV_SERIE: &str = "SMARTPING_SERIE";

/// Credentials and transport settings for the federation API.
///
/// Empty credentials are accepted here; the client refuses to send requests
/// until they are filled in.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SmartPingConfig {
    pub application_id: String,
    pub shared_secret: String,
    pub series: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SmartPingConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            shared_secret: String::new(),
            series: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SmartPingConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.application_id.trim(),
            self.shared_secret.clone(),
            self.series.trim(),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for SmartPingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartPingConfig")
            .field("application_id", &self.application_id)
            .field("shared_secret", &"<redacted>")
            .field("series", &self.series)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Pacing of multi-call workflows
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThrottleConfig {
    pub team_interval_ms: u64,
    pub player_interval_ms: u64,
    pub batch_interval_ms: u64,
    pub batch_size: usize,
    /// How many locally known players get a live rating lookup
    pub rating_top_n: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            team_interval_ms: 250,
            player_interval_ms: 250,
            batch_interval_ms: 500,
            batch_size: 10,
            rating_top_n: 20,
        }
    }
}

impl ThrottleConfig {
    /// No pauses at all, for tests and local mock servers.
    pub fn unthrottled() -> Self {
        Self {
            team_interval_ms: 0,
            player_interval_ms: 0,
            batch_interval_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub smartping: SmartPingConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

impl Config {
    /// Load `config.toml` from the working directory when present, then apply
    /// environment overrides (a `.env` file is honoured).
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            debug!("No {} found, using environment only", CONFIG_FILE);
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        info!(
            application_id = %config.smartping.application_id,
            base_url = %config.smartping.base_url,
            series_configured = !config.smartping.series.is_empty(),
            "Loaded SmartPing configuration"
        );
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())?;
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Overwrite credentials with non-empty values returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (ENV_APP_ID, &mut self.smartping.application_id),
            (ENV_PASSWORD, &mut self.smartping.shared_secret),
            (ENV_SERIE, &mut self.smartping.series),
        ];
        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), SmartPingError> {
        if self.smartping.base_url.trim().is_empty() {
            return Err(SmartPingError::Config("base_url must not be empty".into()));
        }
        if self.smartping.timeout_secs == 0 {
            return Err(SmartPingError::Config("timeout_secs must be positive".into()));
        }
        if self.throttle.batch_size == 0 {
            return Err(SmartPingError::Config("batch_size must be positive".into()));
        }
        Ok(())
    }
}
