// Errors surfaced by the synchronization engine.
//
// Everything here is a real failure: unreachable cloud, rejected
// credentials, elapsed deadlines, bad configuration. Expected absences
// (a MAC with no device, an attribute never reported) are `Option`s at
// their call sites and deliberately have no variant. Transport-level
// detail stays in `qingsync-api`; the `From` impl below folds it into
// these consumer-facing shapes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cloud unreachable: {reason}")]
    ConnectionFailed { reason: String },

    #[error("authentication with the cloud failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("cloud call exceeded its {timeout_secs}s deadline")]
    Timeout { timeout_secs: u64 },

    #[error("cloud error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    #[error("invalid synchronization config: {message}")]
    Config { message: String },
}

impl From<qingsync_api::Error> for CoreError {
    fn from(err: qingsync_api::Error) -> Self {
        use qingsync_api::Error as Api;
        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::TokenRejected => Self::AuthenticationFailed {
                message: "access token rejected, re-authentication required".into(),
            },
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Transport(ref e) if e.is_timeout() => Self::Timeout { timeout_secs: 0 },
            Api::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("bad endpoint URL: {e}"),
            },
            Api::Api {
                message,
                code,
                status,
            } => Self::Api {
                message,
                code,
                status: Some(status),
            },
            Api::Deserialization { message, .. } => Self::Api {
                message: format!("malformed cloud response: {message}"),
                code: None,
                status: None,
            },
        }
    }
}
