use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::parser::ParserOptions;
use crate::utils::time::LocalZone;

/// HTTP settings for playlist and guide downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout, e.g. "30s"
    #[serde(default = "default_fetch_timeout")]
    pub timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchupConfig {
    /// Window assumed when a provider signals catchup without a day count
    #[serde(default = "default_catchup_days")]
    pub default_days: u32,
    /// IANA zone for `{Y}`..`{S}` placeholders and XMLTV times without an
    /// offset. Unset means the host's local zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    /// XMLTV source; no guide is loaded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// How long a loaded guide is reused, e.g. "1h"
    #[serde(default = "default_epg_cache_ttl")]
    pub cache_ttl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Country codes listed first when grouping channels
    #[serde(default = "default_priority_countries")]
    pub priority_countries: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub catchup: CatchupConfig,
    #[serde(default)]
    pub epg: EpgConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_fetch_timeout() -> String {
    DEFAULT_FETCH_TIMEOUT.to_string()
}

fn default_catchup_days() -> u32 {
    DEFAULT_CATCHUP_DAYS
}

fn default_epg_cache_ttl() -> String {
    DEFAULT_EPG_CACHE_TTL.to_string()
}

fn default_priority_countries() -> Vec<String> {
    DEFAULT_PRIORITY_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_fetch_timeout(),
        }
    }
}

impl Default for CatchupConfig {
    fn default() -> Self {
        Self {
            default_days: default_catchup_days(),
            timezone: None,
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            url: None,
            cache_ttl: default_epg_cache_ttl(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            priority_countries: default_priority_countries(),
        }
    }
}

fn parse_duration(field: &str, value: &str) -> AppResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| AppError::configuration(format!("Invalid {field} '{value}': {e}")))
}

impl FetchConfig {
    pub fn timeout(&self) -> AppResult<Duration> {
        parse_duration("fetch.timeout", &self.timeout)
    }
}

impl CatchupConfig {
    pub fn zone(&self) -> AppResult<LocalZone> {
        LocalZone::from_name(self.timezone.as_deref()).map_err(AppError::configuration)
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            default_catchup_days: self.default_days,
        }
    }
}

impl EpgConfig {
    pub fn cache_ttl(&self) -> AppResult<Duration> {
        parse_duration("epg.cache_ttl", &self.cache_ttl)
    }
}

impl Config {
    /// Check values that serde accepts but the application cannot use
    pub fn validate(&self) -> AppResult<()> {
        if self.fetch.timeout()?.is_zero() {
            return Err(AppError::configuration("fetch.timeout must be greater than zero"));
        }
        self.epg.cache_ttl()?;
        self.catchup.zone()?;
        if self.catchup.default_days == 0 {
            return Err(AppError::configuration("catchup.default_days must be at least 1"));
        }
        Ok(())
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
