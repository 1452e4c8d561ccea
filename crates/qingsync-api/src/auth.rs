// OAuth2 client-credentials authentication
//
// The Qingping developer cloud issues short-lived bearer tokens from its
// OAuth endpoint in exchange for an app key/secret pair. The token is
// cached with its expiry; connect() refreshes it when missing or stale.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;

/// Refresh the token this long before its nominal expiry.
const TOKEN_EXPIRY_LEEWAY_SECS: i64 = 60;

/// App credentials for the Qingping developer cloud.
///
/// Generated at the Qingping developer portal (Personal > Access Management).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: SecretString,
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, app_secret: SecretString) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret,
        }
    }

    /// HTTP Basic authorization header value for the token endpoint.
    pub(crate) fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.app_key, self.app_secret.expose_secret());
        format!("Basic {}", BASE64.encode(pair))
    }
}

/// A cached bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub(crate) fn new(token: SecretString, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            token,
            expires_at: now + ChronoDuration::seconds(expires_in_secs),
        }
    }

    /// Whether the token is still usable, with leeway so a token about to
    /// expire mid-request is treated as already stale.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(TOKEN_EXPIRY_LEEWAY_SECS) < self.expires_at
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    7200
}

impl CloudClient {
    /// Authenticate with the cloud, caching the bearer token.
    ///
    /// No-op when a still-valid token is already held. Raises
    /// [`Error::Authentication`] on a rejected key/secret pair and
    /// [`Error::Transport`] on connection failure -- the two are kept
    /// distinct so callers can report them differently.
    pub async fn connect(&self) -> Result<(), Error> {
        {
            let guard = self.token().lock().await;
            if guard.as_ref().is_some_and(|t| t.is_valid(Utc::now())) {
                return Ok(());
            }
        }

        let url = self.auth_url().join("oauth2/token").map_err(Error::InvalidUrl)?;
        debug!("requesting access token at {url}");

        let resp = self
            .http()
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.credentials().basic_auth())
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", "device_full_access"),
            ])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("token response: {e}"),
                body,
            })?;

        let token = AccessToken::new(
            SecretString::from(parsed.access_token),
            parsed.expires_in,
            Utc::now(),
        );
        *self.token().lock().await = Some(token);

        debug!("access token acquired");
        Ok(())
    }

    /// Whether an unexpired access token is currently held.
    pub async fn is_connected(&self) -> bool {
        self.token()
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| t.is_valid(Utc::now()))
    }
}
