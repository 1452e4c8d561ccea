// ── Runtime synchronization configuration ──
//
// Describes *how* to reach the cloud and how often to poll. Carries
// credential data and tuning, but never touches disk -- the CLI (via
// qingsync-config) constructs a `SyncConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Default poll cadence when none is configured.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Floor for the poll cadence; protects the upstream API from hammering.
pub const MIN_POLL_INTERVAL_SECS: u64 = 60;

/// Bounded timeout applied to each cloud call (connect, list-devices).
pub const API_TIMEOUT_SECS: u64 = 60;

/// Configuration for one synchronization instance.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Developer-cloud app key.
    pub app_key: String,
    /// Developer-cloud app secret.
    pub app_secret: SecretString,
    /// How often to run a full poll refresh. Clamped via
    /// [`effective_poll_interval`](Self::effective_poll_interval).
    pub poll_interval: Duration,
    /// Per-call timeout for cloud requests.
    pub timeout: Duration,
    /// Device API base URL (production cloud when `None`).
    pub api_url: Option<url::Url>,
    /// OAuth endpoint base URL (production cloud when `None`).
    pub auth_url: Option<url::Url>,
}

impl SyncConfig {
    pub fn new(app_key: impl Into<String>, app_secret: SecretString) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(API_TIMEOUT_SECS),
            api_url: None,
            auth_url: None,
        }
    }

    /// The configured poll interval, floor-clamped to
    /// [`MIN_POLL_INTERVAL_SECS`].
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(Duration::from_secs(MIN_POLL_INTERVAL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_interval(secs: u64) -> SyncConfig {
        let mut cfg = SyncConfig::new("key", SecretString::from("secret"));
        cfg.poll_interval = Duration::from_secs(secs);
        cfg
    }

    #[test]
    fn poll_interval_is_floor_clamped() {
        assert_eq!(
            config_with_interval(5).effective_poll_interval(),
            Duration::from_secs(MIN_POLL_INTERVAL_SECS)
        );
        assert_eq!(
            config_with_interval(600).effective_poll_interval(),
            Duration::from_secs(600)
        );
    }
}
