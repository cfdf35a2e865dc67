//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted while building a `SheetConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL `{raw}`: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("invalid request timeout `{0}` (expected whole seconds > 0)")]
    InvalidTimeout(String),
}

/// Errors emitted by the remote CRUD client.
///
/// Every variant is a retryable failure from the caller's point of view; a
/// timeout is not special.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("remote request timed out")]
    Timeout,
    #[error("remote request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("invalid remote URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors emitted by `SheetService`.
///
/// Only the client cache can fail a store operation; the in-memory change has
/// already been applied when this is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
