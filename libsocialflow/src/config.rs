//! Configuration management for SocialFlow
//!
//! Configuration is a TOML file at `$SOCIALFLOW_CONFIG` or
//! `<config_dir>/socialflow/config.toml`. Every section is optional; a
//! missing file yields the defaults.
//!
//! ```toml
//! [generation]
//! api_key_env = "GEMINI_API_KEY"
//! text_model = "gemini-3-flash-preview"
//! video_poll_interval = "10s"
//!
//! [simulation]
//! oauth_delay = "2s"
//! upload_tick = "200ms"
//! upload_max_step = 30
//!
//! [composer]
//! timezone = "local"
//!
//! [[accounts]]
//! id = "1"
//! platform = "LinkedIn"
//! username = "socialflow_pro"
//! is_connected = true
//! kind = "Business"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::scheduling::ScheduleZone;
use crate::types::{AccountKind, Platform, SocialAccount};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<SocialAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Literal API key; prefer `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    /// Delay between polls of a running video operation (humantime format)
    #[serde(default = "default_video_poll_interval")]
    pub video_poll_interval: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// How long the simulated OAuth handshake takes
    #[serde(default = "default_oauth_delay")]
    pub oauth_delay: String,
    /// Interval between simulated upload progress reports
    #[serde(default = "default_upload_tick")]
    pub upload_tick: String,
    /// Upper bound (inclusive) of one upload progress step, in percent
    #[serde(default = "default_upload_max_step")]
    pub upload_max_step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposerConfig {
    /// Zone used to interpret schedule date/time: `local`, `utc` or `+HH:MM`
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_text_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_video_poll_interval() -> String {
    "10s".to_string()
}

fn default_oauth_delay() -> String {
    "2s".to_string()
}

fn default_upload_tick() -> String {
    "200ms".to_string()
}

fn default_upload_max_step() -> u8 {
    30
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Demo accounts: three connected business pages and a disconnected Twitter
pub fn default_accounts() -> Vec<SocialAccount> {
    let now = Utc::now();
    let account = |id: &str, platform, username: &str, avatar: &str, connected, kind, followers| SocialAccount {
        id: id.to_string(),
        platform,
        username: username.to_string(),
        avatar: avatar.to_string(),
        is_connected: connected,
        kind,
        followers,
        last_sync: connected.then_some(now),
    };

    vec![
        account("1", Platform::LinkedIn, "socialflow_pro", "https://picsum.photos/200", true, AccountKind::Business, 1240),
        account("2", Platform::Facebook, "SocialFlowPage", "https://picsum.photos/201", true, AccountKind::Business, 8400),
        account("3", Platform::Instagram, "@sf_hq", "https://picsum.photos/202", true, AccountKind::Business, 3200),
        account("4", Platform::Twitter, "socialflow", "https://picsum.photos/203", false, AccountKind::Personal, 0),
    ]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            video_poll_interval: default_video_poll_interval(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            oauth_delay: default_oauth_delay(),
            upload_tick: default_upload_tick(),
            upload_max_step: default_upload_max_step(),
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            simulation: SimulationConfig::default(),
            composer: ComposerConfig::default(),
            accounts: default_accounts(),
        }
    }
}

impl GenerationConfig {
    /// API key from the config file, else from `api_key_env`, else `API_KEY`
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(SecretString::from(key.trim().to_string()));
        }
        [self.api_key_env.as_str(), "API_KEY"]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .map(|value| SecretString::from(value.trim().to_string()))
    }

    pub fn video_poll_interval(&self) -> Result<Duration> {
        parse_duration_field("generation.video_poll_interval", &self.video_poll_interval)
    }
}

impl SimulationConfig {
    pub fn oauth_delay(&self) -> Result<Duration> {
        parse_duration_field("simulation.oauth_delay", &self.oauth_delay)
    }

    pub fn upload_tick(&self) -> Result<Duration> {
        parse_duration_field("simulation.upload_tick", &self.upload_tick)
    }
}

impl ComposerConfig {
    pub fn schedule_zone(&self) -> Result<ScheduleZone> {
        self.timezone.parse::<ScheduleZone>().map_err(|e| {
            ConfigError::InvalidValue {
                field: "composer.timezone".to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        debug!(path = %path.display(), accounts = config.accounts.len(), "Loaded config");
        Ok(config)
    }

    /// Check every field that is parsed lazily
    pub fn validate(&self) -> Result<()> {
        self.generation.video_poll_interval()?;
        self.simulation.oauth_delay()?;
        self.simulation.upload_tick()?;
        self.composer.schedule_zone()?;
        if self.simulation.upload_max_step == 0 {
            return Err(ConfigError::InvalidValue {
                field: "simulation.upload_max_step".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SOCIALFLOW_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("socialflow").join("config.toml"))
}
