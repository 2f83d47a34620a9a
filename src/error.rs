//! Error types for the cache node
//!
//! Provides unified error handling using thiserror. Peer-facing failures are
//! rendered as plain-text bodies with the matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Request address did not split into group and key
    #[error("{0}")]
    BadRequest(String),

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// The group could not produce a value for the key
    #[error("{0}")]
    LookupFailed(String),

    /// The peer could not be reached or its body could not be read
    #[error("peer transport failure: {0}")]
    TransportFailure(String),

    /// The peer answered with a non-success status
    #[error("peer responded {status}: {message}")]
    RemoteFailure { status: u16, message: String },

    /// Invalid startup configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Classifies any error raised while a group served a key as a lookup failure.
    pub fn into_lookup_failure(self) -> Self {
        match self {
            CacheError::LookupFailed(_) => self,
            other => CacheError::LookupFailed(other.to_string()),
        }
    }

    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::LookupFailed(_)
            | CacheError::TransportFailure(_)
            | CacheError::RemoteFailure { .. }
            | CacheError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
