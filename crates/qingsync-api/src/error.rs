// Failure taxonomy of the cloud client.
//
// Auth rejections, transport faults, structured API errors, and
// undecodable payloads each get their own variant so the layers above
// can react differently (re-authenticate, retry next poll, give up).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The token endpoint rejected the app key/secret pair.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// A data endpoint refused the bearer token (missing, expired, or
    /// revoked). `connect()` mints a fresh one.
    #[error("access token rejected, re-authentication required")]
    TokenRejected,

    /// Connection-level failure: refused, reset, DNS, TLS.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The per-call deadline elapsed before a response arrived.
    #[error("no response within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-2xx response carrying the cloud's own error envelope.
    #[error("cloud returned HTTP {status}: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// A 2xx response whose body did not decode. The raw body is kept
    /// for diagnostics.
    #[error("undecodable response body: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// True when fresh credentials or a new token could resolve this.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::TokenRejected)
    }

    /// True when the next scheduled poll is worth attempting without
    /// operator intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Authentication { .. }
            | Self::TokenRejected
            | Self::InvalidUrl(_)
            | Self::Deserialization { .. } => false,
        }
    }
}
