// Hand-crafted async HTTP client for the Qingping developer cloud.
//
// Base path: /v1/apis/
// Auth: Bearer token from the OAuth2 client-credentials flow (see auth.rs)

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::auth::{AccessToken, Credentials};
use crate::error::Error;
use crate::types::DeviceListResponse;

/// Default production endpoints of the Qingping developer cloud.
pub const DEFAULT_API_URL: &str = "https://apis.cloud.qingping.co";
pub const DEFAULT_AUTH_URL: &str = "https://oauth.cloud.qingping.co";

// ── Error response shape from the cloud API ──────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Qingping cloud API.
///
/// Holds the app credentials and a cached bearer token; `connect()`
/// (in auth.rs) populates the token, every data call attaches it.
pub struct CloudClient {
    http: reqwest::Client,
    api_url: Url,
    auth_url: Url,
    credentials: Credentials,
    token: Mutex<Option<AccessToken>>,
}

impl CloudClient {
    /// Build a client against the production cloud endpoints.
    pub fn new(
        credentials: Credentials,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_endpoints(credentials, transport, DEFAULT_API_URL, DEFAULT_AUTH_URL)
    }

    /// Build a client against explicit endpoints (tests, regional clouds).
    pub fn with_endpoints(
        credentials: Credentials,
        transport: &crate::TransportConfig,
        api_url: &str,
        auth_url: &str,
    ) -> Result<Self, Error> {
        let http = transport.client()?;
        Ok(Self {
            http,
            api_url: normalize_base_url(api_url)?,
            auth_url: normalize_base_url(auth_url)?,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// The API base URL; doubles as the controller label in snapshots.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn token(&self) -> &Mutex<Option<AccessToken>> {
        &self.token
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full device list with the latest reading per attribute.
    ///
    /// Requires a valid token (call [`connect()`](Self::connect) first);
    /// a missing or expired token yields [`Error::TokenRejected`] without
    /// a network round-trip.
    pub async fn list_devices(&self) -> Result<DeviceListResponse, Error> {
        let bearer = {
            let guard = self.token.lock().await;
            match guard.as_ref() {
                Some(t) if t.is_valid(Utc::now()) => t.bearer(),
                _ => return Err(Error::TokenRejected),
            }
        };

        // The API requires a client-supplied millisecond timestamp on
        // every data request.
        let ts = Utc::now().timestamp_millis();
        self.get("v1/apis/devices", &[("timestamp", ts.to_string())], &bearer)
            .await
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        bearer: &str,
    ) -> Result<T, Error> {
        let url = self.api_url.join(path).map_err(Error::InvalidUrl)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, bearer)
            .query(params)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::TokenRejected;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }
}

/// Ensure the base URL ends with a trailing slash so `join` appends
/// instead of replacing the last path segment.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}
