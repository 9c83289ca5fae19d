//! Failure taxonomy for a single live attempt.

use std::fmt;

/// Why a live attempt against a remote endpoint did not produce data.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS, or body-read failure.
    Network(reqwest::Error),
    /// The attempt exceeded its wall-clock budget.
    Timeout,
    /// The endpoint answered with a non-success HTTP status.
    Status(u16),
    /// The body was not JSON, or lacked the fields we need.
    Malformed(String),
    /// The caller cancelled the request.
    Cancelled,
}

impl FetchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        FetchError::Malformed(msg.into())
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors other than 408 / 429 mean the request itself is wrong
    /// (unknown coin id, bad parameter); retrying would only add latency.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout | FetchError::Malformed(_) => true,
            FetchError::Status(code) => !(400..500).contains(code) || matches!(code, 408 | 429),
            FetchError::Cancelled => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "network error: {e}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {code}"),
            FetchError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            FetchError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Network(err)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}
