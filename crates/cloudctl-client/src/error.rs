//! Error types for billing API calls.

use thiserror::Error;

/// Failures raised while talking to the billing service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL cannot carry path segments.
    #[error("base URL '{url}' cannot be used for API requests")]
    InvalidBaseUrl {
        /// Offending base URL.
        url: String,
    },
    /// A default header could not be encoded.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Build {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The request never produced a response.
    #[error("request to {path} failed: {source}")]
    Transport {
        /// Request path.
        path: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{message} (status {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        /// Request path.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;
