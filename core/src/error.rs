//! Error types for the todo API client.
//!
//! # Design
//! The gateway normalizes every low-level failure into one of two kinds.
//! A reachable server that answered with a non-2xx status becomes
//! `ApiError::Http` carrying the numeric code and reason phrase. Anything that
//! prevented a usable answer (connection refused, DNS, unreadable or missing
//! body) becomes `ApiError::Network`. The `Display` strings are part of the
//! contract: the store surfaces them verbatim as its `error` field.

use thiserror::Error;

/// Errors returned by `ApiClient` and `TodoRepository` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200..=299.
    #[error("HTTP Error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// The request never produced a decodable response.
    #[error("Network request failed: {0}")]
    Network(String),

    /// The request payload could not be serialized to JSON.
    #[error("Failed to encode request body: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Network(error.0)
    }
}

/// Failure reported by a `Transport` when no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}
