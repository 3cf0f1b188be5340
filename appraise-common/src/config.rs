//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ConfigOverrides`]; the binary's clap
//! parser already prefers an explicit argument over its environment variable.

use crate::models::REFERENCE_SQUARE_FOOTAGES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_PREDICTOR_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How the auxiliary sweep is joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPolicy {
    /// Any failed sweep request fails the whole submission
    #[default]
    AllOrNothing,
    /// Failed sweep points are dropped; the rest are still charted
    BestEffort,
}

impl FromStr for SweepPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_or_nothing" => Ok(SweepPolicy::AllOrNothing),
            "best_effort" => Ok(SweepPolicy::BestEffort),
            other => Err(Error::Config(format!(
                "Unknown sweep policy '{}' (expected all_or_nothing or best_effort)",
                other
            ))),
        }
    }
}

impl fmt::Display for SweepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepPolicy::AllOrNothing => write!(f, "all_or_nothing"),
            SweepPolicy::BestEffort => write!(f, "best_effort"),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub predictor_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub sweep_policy: Option<SweepPolicy>,
    pub reference_square_footages: Option<Vec<f64>>,
}

impl TomlConfig {
    /// Parse a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load the config file if one is present
    ///
    /// An explicit path must exist. Without one, the platform location is
    /// tried; a missing file there is not an error and yields defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                Ok((Self::load(&path)?, Some(path)))
            }
            None => {
                warn!("No config file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }
}

/// Locate the platform config file, if it exists
pub fn default_config_path() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/appraise/config.toml first, then /etc/appraise/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("appraise").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Some(path);
            }
        }
        let system_config = PathBuf::from("/etc/appraise/config.toml");
        system_config.exists().then_some(system_config)
    } else {
        dirs::config_dir()
            .map(|d| d.join("appraise").join("config.toml"))
            .filter(|path| path.exists())
    }
}

/// Settings given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub predictor_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub sweep_policy: Option<SweepPolicy>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Base URL of the remote scoring endpoint (no trailing slash)
    pub predictor_url: String,
    /// Upper bound for every single prediction request
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub sweep_policy: SweepPolicy,
    /// Auxiliary sweep values, in chart order
    pub reference_square_footages: Vec<f64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            predictor_url: DEFAULT_PREDICTOR_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            sweep_policy: SweepPolicy::default(),
            reference_square_footages: REFERENCE_SQUARE_FOOTAGES.to_vec(),
        }
    }
}

impl ServiceConfig {
    /// Merge overrides, TOML values and compiled defaults, then validate
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let predictor_url = pick(
            "predictor_url",
            overrides.predictor_url.clone(),
            toml.predictor_url.clone(),
            defaults.predictor_url,
        );
        let request_timeout_ms = pick(
            "request_timeout_ms",
            overrides.request_timeout_ms,
            toml.request_timeout_ms,
            DEFAULT_REQUEST_TIMEOUT_MS,
        );
        let host = pick("host", overrides.host.clone(), toml.host.clone(), defaults.host);
        let port = pick("port", overrides.port, toml.port, defaults.port);
        let log_level = pick(
            "log_level",
            overrides.log_level.clone(),
            toml.log_level.clone(),
            defaults.log_level,
        );
        let sweep_policy = pick(
            "sweep_policy",
            overrides.sweep_policy,
            toml.sweep_policy,
            defaults.sweep_policy,
        );
        let reference_square_footages = pick(
            "reference_square_footages",
            None,
            toml.reference_square_footages.clone(),
            defaults.reference_square_footages,
        );

        let config = Self {
            predictor_url: predictor_url.trim().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(request_timeout_ms),
            host,
            port,
            log_level,
            sweep_policy,
            reference_square_footages,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.predictor_url.is_empty() {
            return Err(Error::Config("predictor_url must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.reference_square_footages.is_empty() {
            return Err(Error::Config(
                "reference_square_footages must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .reference_square_footages
            .iter()
            .find(|value| !value.is_finite())
        {
            return Err(Error::Config(format!(
                "reference_square_footages contains a non-finite value: {}",
                bad
            )));
        }
        Ok(())
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn pick<T>(name: &str, cli_or_env: Option<T>, toml: Option<T>, default: T) -> T {
    if let Some(value) = cli_or_env {
        debug!(setting = name, "Using command line / environment value");
        return value;
    }
    if let Some(value) = toml {
        debug!(setting = name, "Using TOML config value");
        return value;
    }
    debug!(setting = name, "Using compiled default");
    default
}
