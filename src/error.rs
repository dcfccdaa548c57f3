//! Error types for the table API client.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the table API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered, but not with a 2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// The response body was not the JSON shape we expected.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// `--api-base` did not parse as an absolute URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_url_and_code() {
        let err = Error::Status {
            status: 503,
            url: "http://api.test/tables/quotes".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "http://api.test/tables/quotes returned HTTP 503"
        );
    }

    #[test]
    fn decode_error_converts_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = serde_err.into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
