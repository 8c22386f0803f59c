//! Error types for the COVID-19 API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the location does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging. Failures that happen before any status
//! is received (DNS, refused connection, timeout) are `Transport`.

use thiserror::Error;

/// Errors returned by the request parsers and the stateful client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested data source is not offered by the server, or a
    /// configuration value could not be interpreted.
    #[error("{setting} `{requested}` not found (available: {})", .available.join(", "))]
    Configuration {
        setting: &'static str,
        requested: String,
        available: Vec<String>,
    },

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// True for errors raised by the HTTP layer rather than by validation or
    /// decoding.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound | ApiError::HttpError { .. } | ApiError::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_lists_available_sources() {
        let err = ApiError::Configuration {
            setting: "data source",
            requested: "who".to_string(),
            available: vec!["jhu".to_string(), "csbs".to_string()],
        };
        assert_eq!(err.to_string(), "data source `who` not found (available: jhu, csbs)");
    }

    #[test]
    fn status_errors_count_as_transport() {
        assert!(ApiError::NotFound.is_transport());
        assert!(ApiError::HttpError { status: 503, body: String::new() }.is_transport());
        assert!(!ApiError::InvalidArgument("x".to_string()).is_transport());
        assert!(!ApiError::DeserializationError("x".to_string()).is_transport());
    }
}
