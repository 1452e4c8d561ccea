//! User-facing CLI errors.
//!
//! Every variant carries a miette diagnostic with actionable help, and
//! maps to a stable process exit code so scripts can branch on failure
//! kind without parsing text.

use miette::Diagnostic;
use thiserror::Error;

use qingsync_core::CoreError;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("The Qingping cloud could not be reached")]
    #[diagnostic(
        code(qingsync::connection_failed),
        help("Check your network connection and any proxy settings.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The cloud rejected your app credentials")]
    #[diagnostic(
        code(qingsync::auth_failed),
        help(
            "Verify your app key and secret.\n\
             Credentials are issued at developer.qingping.co (Access Management).\n\
             Run: qingsync config init --app-key <KEY> --app-secret <SECRET>"
        )
    )]
    AuthFailed,

    #[error("No app credentials configured")]
    #[diagnostic(
        code(qingsync::no_credentials),
        help(
            "Configure credentials with: qingsync config init\n\
             Or set QINGPING_APP_KEY and QINGPING_APP_SECRET."
        )
    )]
    NoCredentials,

    #[error("No synced device has MAC '{mac}'")]
    #[diagnostic(
        code(qingsync::unknown_device),
        help("Run: qingsync devices to see the synced fleet")
    )]
    DeviceNotFound { mac: String },

    #[error("The cloud reported an error ({code}): {message}")]
    #[diagnostic(code(qingsync::api_error))]
    ApiError { code: String, message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(qingsync::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration problem: {message}")]
    #[diagnostic(
        code(qingsync::config),
        help("Inspect the file at: qingsync config path")
    )]
    Config { message: String },

    #[error("No response from the cloud within {seconds}s")]
    #[diagnostic(
        code(qingsync::timeout),
        help("Increase the deadline with --timeout or check cloud responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code: 2 usage, 3 auth, 4 unknown device,
    /// 7 connection, 8 timeout, 1 anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::AuthFailed | Self::NoCredentials => 3,
            Self::DeviceNotFound { .. } => 4,
            Self::ConnectionFailed { .. } => 7,
            Self::Timeout { .. } => 8,
            Self::ApiError { .. } | Self::Config { .. } | Self::Io(_) => 1,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed {
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed,
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Api { message, code, .. } => Self::ApiError {
                code: code.unwrap_or_default(),
                message,
            },
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<qingsync_config::ConfigError> for CliError {
    fn from(err: qingsync_config::ConfigError) -> Self {
        match err {
            qingsync_config::ConfigError::NoCredentials => Self::NoCredentials,
            qingsync_config::ConfigError::Validation { field, reason } => {
                Self::Validation { field, reason }
            }
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
