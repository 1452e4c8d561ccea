//! Shared configuration for the qingsync CLI.
//!
//! TOML file, `QINGPING_*` environment overrides, credential resolution
//! (env var + keyring + plaintext), and translation to
//! `qingsync_core::SyncConfig`. Core never reads config files -- it
//! receives a pre-built `SyncConfig`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use qingsync_core::{API_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, SyncConfig};

/// Keyring service name for the stored app secret.
const KEYRING_SERVICE: &str = "qingsync";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bad value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no app credentials configured")]
    NoCredentials,

    #[error("could not serialize config to TOML: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("could not load config: {0}")]
    Figment(Box<figment::Error>),

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
///
/// One Qingping developer account per config file: the cloud scopes
/// devices to the app key, so there is no profile concept here.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Developer-cloud app key.
    pub app_key: Option<String>,

    /// App secret (plaintext -- prefer keyring or env var).
    pub app_secret: Option<String>,

    /// Environment variable name containing the app secret.
    pub app_secret_env: Option<String>,

    /// Poll interval in seconds (floor-clamped by core).
    pub poll_interval: Option<u64>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,

    /// Device API base URL override (regional clouds, testing).
    pub api_url: Option<String>,

    /// OAuth endpoint base URL override.
    pub auth_url: Option<String>,
}

/// Platform config file location (XDG on Linux, the native
/// equivalents elsewhere).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("co", "qingsync", "qingsync").map_or_else(
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
    p.push("qingsync");
    p
}

/// Load configuration from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from an explicit file path + environment.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("QINGPING_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Like [`load_config`], but an unreadable or absent file yields the
/// defaults instead of an error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Write the config back to its canonical path as pretty TOML.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the app secret from the credential chain.
pub fn resolve_app_secret(config: &Config) -> Result<SecretString, ConfigError> {
    // 1. Config's app_secret_env → env var lookup
    if let Some(ref env_name) = config.app_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring, keyed by the app key
    if let Some(ref app_key) = config.app_key {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{app_key}/app-secret")) {
            if let Ok(secret) = entry.get_password() {
                return Ok(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    if let Some(ref secret) = config.app_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials)
}

/// Store the app secret in the system keyring.
pub fn store_app_secret(app_key: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{app_key}/app-secret")).map_err(
        |e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        },
    )?;
    entry.set_password(secret).map_err(|e| ConfigError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    })
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `SyncConfig` from loaded configuration.
pub fn build_sync_config(config: &Config) -> Result<SyncConfig, ConfigError> {
    let app_key = config
        .app_key
        .clone()
        .ok_or(ConfigError::NoCredentials)?;
    let app_secret = resolve_app_secret(config)?;

    let mut sync = SyncConfig::new(app_key, app_secret);
    sync.poll_interval =
        Duration::from_secs(config.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS));
    sync.timeout = Duration::from_secs(config.timeout.unwrap_or(API_TIMEOUT_SECS));
    sync.api_url = parse_url_field("api_url", config.api_url.as_deref())?;
    sync.auth_url = parse_url_field("auth_url", config.auth_url.as_deref())?;
    Ok(sync)
}

fn parse_url_field(field: &str, raw: Option<&str>) -> Result<Option<url::Url>, ConfigError> {
    raw.map(|s| {
        s.parse().map_err(|_| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL: {s}"),
        })
    })
    .transpose()
}
