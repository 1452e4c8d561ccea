// HTTP client construction, shared by the token endpoint and the
// device API so both observe the same deadline.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("qingsync/", env!("CARGO_PKG_VERSION"));

/// Transport tuning for cloud requests.
///
/// Only the per-request timeout is configurable; the refresh engine
/// leans on it to bound every poll call. The cloud terminates TLS with
/// a public-CA certificate, so there are no trust-store knobs.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Construct the `reqwest` client both endpoints share.
    pub fn client(&self) -> Result<reqwest::Client, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(client)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(60))
    }
}
