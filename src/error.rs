//! Lectio error types and the upstream error classifier.

use std::time::Duration;

/// Lectio error types
#[derive(Debug, thiserror::Error)]
pub enum LectioError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,

    #[error("response from {0} is not in the requested format")]
    UnexpectedFormat(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid passage: {0}")]
    InvalidPassage(String),

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("no API key available")]
    NoKeyAvailable,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LectioError {
    /// Whether a delayed retry of the same operation may succeed.
    ///
    /// Rate limits, network failures, timeouts, empty bodies and 5xx
    /// responses are transient. The study retry loop keeps going on these
    /// and on key-rotating errors, and stops on anything else.
    pub fn is_transient(&self) -> bool {
        match self {
            LectioError::RateLimited { .. }
            | LectioError::Http(_)
            | LectioError::Timeout(_)
            | LectioError::EmptyResponse => true,
            LectioError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Provider-suggested delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LectioError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Shorthand for [`classify`].
    pub fn class(&self) -> ErrorClass {
        classify(self)
    }
}

impl From<reqwest::Error> for LectioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration.
            LectioError::Timeout(Duration::ZERO)
        } else {
            LectioError::Http(err.to_string())
        }
    }
}

/// How an upstream failure should be handled by key rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Per-key quota or rate limit exhausted.
    Quota,
    /// Credential rejected.
    Auth,
    /// Network, timeout or server-side failure.
    Transient,
    /// Anything else.
    Unknown,
}

impl ErrorClass {
    /// Quota and auth failures disable the key for the rest of the day.
    pub fn rotates_key(self) -> bool {
        matches!(self, ErrorClass::Quota | ErrorClass::Auth)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Quota => "quota",
            ErrorClass::Auth => "auth",
            ErrorClass::Transient => "transient",
            ErrorClass::Unknown => "unknown",
        }
    }
}

const QUOTA_MARKERS: &[&str] = &["429", "quota", "exceeded", "resource_exhausted", "rate limit"];

const AUTH_MARKERS: &[&str] = &[
    "api key not valid",
    "invalid api key",
    "api_key_invalid",
    "permission denied",
    "unauthenticated",
];

/// Classify an upstream error.
///
/// Status codes win over message matching; message matching covers
/// providers that report quota exhaustion with a generic status.
pub fn classify(err: &LectioError) -> ErrorClass {
    match err {
        LectioError::RateLimited { .. } => ErrorClass::Quota,
        LectioError::AuthenticationFailed => ErrorClass::Auth,
        LectioError::Api { status: 429, .. } => ErrorClass::Quota,
        LectioError::Api {
            status: 401 | 403, ..
        } => ErrorClass::Auth,
        LectioError::Api { status, message } => match classify_message(message) {
            Some(class) => class,
            None if *status >= 500 => ErrorClass::Transient,
            None => ErrorClass::Unknown,
        },
        LectioError::Http(message) => {
            classify_message(message).unwrap_or(ErrorClass::Transient)
        }
        LectioError::Timeout(_) | LectioError::EmptyResponse => ErrorClass::Transient,
        _ => ErrorClass::Unknown,
    }
}

fn classify_message(message: &str) -> Option<ErrorClass> {
    let lower = message.to_lowercase();
    if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(ErrorClass::Quota)
    } else if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        Some(ErrorClass::Auth)
    } else {
        None
    }
}

/// Result type alias for Lectio operations
pub type Result<T> = std::result::Result<T, LectioError>;
