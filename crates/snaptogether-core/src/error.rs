//! Service errors
//!
//! Every failure the generate endpoint can report is an [`AppError`]. How a
//! variant is shown to callers (status, code, retry hint, log level) lives in
//! one profile table read through [`ErrorMetadata`], so the HTTP layer never
//! matches on variants itself.

use crate::models::DataUriError;

/// Severity used when the HTTP layer logs an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad bodies, wrong methods
    Debug,
    /// The upstream model misbehaved; a retry may succeed
    Warn,
    Error,
}

/// How an error presents itself to HTTP callers
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code for clients, e.g. `UPSTREAM_ERROR`
    fn error_code(&self) -> &'static str;

    /// True when sending the same request again may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Text placed in the `error` field of the response body
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their internal message, even outside production
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Missing or unusable server configuration, such as an absent upstream credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Upstream request timed out after {seconds}s")]
    UpstreamTimeout { seconds: u64 },

    /// The upstream could not be reached at all
    #[error("Upstream error: {message}")]
    UpstreamWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<DataUriError> for AppError {
    fn from(err: DataUriError) -> Self {
        AppError::InvalidInput(format!("Photos must be base64 data URIs: {}", err))
    }
}

struct ErrorProfile {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

const fn caller_fault(status: u16, code: &'static str, action: &'static str) -> ErrorProfile {
    ErrorProfile {
        status,
        code,
        recoverable: false,
        action: Some(action),
        sensitive: false,
        level: LogLevel::Debug,
    }
}

const UPSTREAM_FAILURE: ErrorProfile = ErrorProfile {
    status: 500,
    code: "UPSTREAM_ERROR",
    recoverable: true,
    action: RETRY_LATER,
    sensitive: false,
    level: LogLevel::Warn,
};

const INTERNAL_FAILURE: ErrorProfile = ErrorProfile {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: RETRY_LATER,
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn profile(&self) -> ErrorProfile {
        match self {
            AppError::InvalidInput(_) => {
                caller_fault(400, "INVALID_INPUT", "Send both photos as base64 data URIs")
            }
            AppError::BadRequest(_) => caller_fault(
                400,
                "BAD_REQUEST",
                "Send prompt, photo1, photo2 and pose in the JSON body",
            ),
            AppError::MethodNotAllowed => {
                caller_fault(405, "METHOD_NOT_ALLOWED", "Use POST for this endpoint")
            }
            AppError::PayloadTooLarge(_) => {
                caller_fault(413, "PAYLOAD_TOO_LARGE", "Upload smaller photos")
            }
            AppError::Configuration(_) => ErrorProfile {
                status: 500,
                code: "CONFIGURATION_ERROR",
                recoverable: false,
                action: Some("Contact the service operator"),
                sensitive: false,
                level: LogLevel::Error,
            },
            AppError::UpstreamTimeout { .. } => ErrorProfile {
                code: "UPSTREAM_TIMEOUT",
                ..UPSTREAM_FAILURE
            },
            AppError::Upstream { .. } | AppError::UpstreamWithSource { .. } => UPSTREAM_FAILURE,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => INTERNAL_FAILURE,
        }
    }
}

impl AppError {
    /// Variant name, shown as `error_type` outside production
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::MethodNotAllowed => "MethodNotAllowed",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Configuration(_) => "Configuration",
            AppError::Upstream { .. } => "Upstream",
            AppError::UpstreamTimeout { .. } => "UpstreamTimeout",
            AppError::UpstreamWithSource { .. } => "Upstream",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Error for a request that arrives without the upstream credential configured
    pub fn missing_credential(env_var: &str) -> Self {
        AppError::Configuration(format!(
            "API key not configured. Please set {} in the server environment.",
            env_var
        ))
    }

    /// The error plus up to five levels of its source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.profile().action
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Configuration(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::UpstreamTimeout { seconds } => {
                format!("Upstream model did not respond within {} seconds", seconds)
            }
            AppError::UpstreamWithSource { message, .. } => message.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
