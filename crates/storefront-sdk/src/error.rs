//! SDK error taxonomy
//!
//! Every variant carries owned strings so errors are `Clone`: one refresh
//! failure is handed to the leader and to every caller queued behind it.

/// Errors surfaced to SDK callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Network failure that exhausted the executor's retries or was not retryable.
    #[error("request failed: {0}")]
    Transport(String),

    /// The per-request timeout elapsed on every attempt.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-2xx response. `body` is the raw response text.
    #[error("HTTP {status}: {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// Token refresh failed; terminal for the current refresh cycle.
    #[error("token refresh failed: {0}")]
    Refresh(String),

    /// Response did not match the expected shape, or a request body broke a
    /// constraint before it was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend answered 2xx with an `error` field.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential store error: {0}")]
    Credential(String),
}

impl Error {
    /// HTTP status for `Http` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for `Http` errors.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Error::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<storefront_auth::Error> for Error {
    fn from(err: storefront_auth::Error) -> Self {
        Error::Credential(err.to_string())
    }
}

impl From<common::Error> for Error {
    fn from(err: common::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
