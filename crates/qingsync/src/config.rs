//! Bridges CLI flags and the config file into `qingsync_core::SyncConfig`.
//!
//! Core never sees these types -- it receives a pre-built `SyncConfig`.
//! Precedence: CLI flag > environment > config file.

use qingsync_config as file_config;
use qingsync_core::SyncConfig;
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `SyncConfig` from the config file with CLI flag overrides.
pub fn resolve_sync_config(global: &GlobalOpts) -> Result<SyncConfig, CliError> {
    let mut file = file_config::load_config_or_default();

    // Clap already applied QINGPING_APP_KEY / QINGPING_APP_SECRET env
    // vars to the flags, so flag values subsume the env layer here.
    if let Some(ref key) = global.app_key {
        file.app_key = Some(key.clone());
    }
    if let Some(ref secret) = global.app_secret {
        file.app_secret = Some(secret.clone());
    }
    if let Some(interval) = global.poll_interval {
        file.poll_interval = Some(interval);
    }
    if let Some(timeout) = global.timeout {
        file.timeout = Some(timeout);
    }

    let mut sync = file_config::build_sync_config(&file)?;

    // Flag-provided secret wins over keyring/plaintext resolution.
    if let Some(ref secret) = global.app_secret {
        sync.app_secret = SecretString::from(secret.clone());
    }

    Ok(sync)
}
