//! Settings for the roamwatch daemon and CLI.
//!
//! Merge order: built-in defaults, then the TOML config file, then
//! `ROAMWATCH_*` environment variables. Validation failures are fatal at
//! startup -- per-tick code never sees a half-configured engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roamwatch_api::{SourceConfig, SourceCredentials, TlsMode};
use roamwatch_core::{EngineConfig, ThreatMonitorConfig};

/// HTTP timeout ceiling. The poll interval is a sensible timeout for a
/// fetch (a tick that outlives its interval is useless), but very long
/// intervals shouldn't hold sockets open for minutes.
const TIMEOUT_CAP_SECS: u64 = 120;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no controller credentials configured (set api_key, or username and password)")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Everything the daemon reads at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Controller base URL (e.g. `https://192.168.1.1`).
    pub controller_url: Option<String>,

    /// Site to reconcile.
    #[serde(default = "default_site")]
    pub site_id: String,

    /// Legacy session credentials.
    pub username: Option<String>,
    pub password: Option<String>,

    /// Integration API key. Takes precedence over session credentials.
    pub api_key: Option<String>,

    /// Verify the controller's TLS certificate. Off by default: local
    /// controllers are self-signed.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Seconds between reconciliation ticks.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,

    /// Where the SQLite database lives.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Poll the controller's IPS feed as well.
    #[serde(default)]
    pub threats_enabled: bool,

    /// Seconds between IPS feed polls.
    #[serde(default = "default_threat_interval")]
    pub threat_poll_interval_seconds: u64,
}

fn default_site() -> String {
    "default".into()
}
fn default_refresh_interval() -> u64 {
    60
}
fn default_threat_interval() -> u64 {
    300
}
fn default_database_path() -> PathBuf {
    PathBuf::from("data/roamwatch.db")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller_url: None,
            site_id: default_site(),
            username: None,
            password: None,
            api_key: None,
            verify_ssl: false,
            refresh_interval_seconds: default_refresh_interval(),
            database_path: default_database_path(),
            threats_enabled: false,
            threat_poll_interval_seconds: default_threat_interval(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "roamwatch", "roamwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("roamwatch");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from an explicit config file (or the default path)
/// plus `ROAMWATCH_*` environment variables.
pub fn load(config_file: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = config_file.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("ROAMWATCH_"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

// ── Validation & conversion ─────────────────────────────────────────

impl Settings {
    /// Check everything the daemon needs before any background task
    /// starts. Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "refresh_interval_seconds".into(),
                reason: "must be a positive number of seconds".into(),
            });
        }
        if self.threats_enabled && self.threat_poll_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "threat_poll_interval_seconds".into(),
                reason: "must be a positive number of seconds".into(),
            });
        }

        self.controller_url()?;
        self.credentials()?;
        Ok(())
    }

    fn controller_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self
            .controller_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "controller_url".into(),
                reason: "not set".into(),
            })?;

        raw.parse().map_err(|_| ConfigError::Validation {
            field: "controller_url".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    fn credentials(&self) -> Result<SourceCredentials, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(SourceCredentials::ApiKey(SecretString::from(key.clone())));
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(SourceCredentials::Session {
                username: username.clone(),
                password: SecretString::from(password.clone()),
            }),
            _ => Err(ConfigError::NoCredentials),
        }
    }

    /// Whether the configured auth style is the legacy session (the only
    /// surface that carries the IPS feed).
    pub fn uses_session_auth(&self) -> bool {
        self.api_key.is_none()
    }

    /// HTTP timeout: the poll interval itself, capped.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.min(TIMEOUT_CAP_SECS))
    }

    /// Connection settings for `roamwatch_api::connect_source`.
    pub fn source_config(&self) -> Result<SourceConfig, ConfigError> {
        Ok(SourceConfig {
            url: self.controller_url()?,
            credentials: self.credentials()?,
            tls: if self.verify_ssl {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            timeout: self.timeout(),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            site: self.site_id.clone(),
            refresh_interval: Duration::from_secs(self.refresh_interval_seconds),
        }
    }

    pub fn threat_config(&self) -> ThreatMonitorConfig {
        ThreatMonitorConfig {
            site: self.site_id.clone(),
            poll_interval: Duration::from_secs(self.threat_poll_interval_seconds),
            ..ThreatMonitorConfig::default()
        }
    }
}
