//! Internal error types for conductor-reqwest.

use reqwest::StatusCode;
use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Result type alias for conductor-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for conductor-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// A response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The server issued an access token that cannot be sent as a header.
    #[error("Access token is not a valid header value")]
    InvalidToken(#[source] InvalidHeaderValue),
    /// The configured server URL could not be parsed.
    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),
    /// The configured server URL has no path to append endpoints to.
    #[error("Server URL cannot be used as a base: {0}")]
    CannotBeABase(String),
    /// The server answered with a non-success status.
    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl From<Error> for conductor_workflow::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    conductor_workflow::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    conductor_workflow::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    conductor_workflow::Error::serialization()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    conductor_workflow::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => conductor_workflow::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::InvalidToken(e) => conductor_workflow::Error::authentication()
                .with_message("Server issued an access token that is not a valid header value")
                .with_source(e),
            Error::Url(e) => conductor_workflow::Error::configuration()
                .with_message(format!("Invalid server URL: {e}"))
                .with_source(e),
            Error::CannotBeABase(url) => conductor_workflow::Error::configuration()
                .with_message(format!("Server URL cannot be used as a base: {url}")),
            Error::Status { status, body } => {
                let error = match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        conductor_workflow::Error::authentication()
                    }
                    StatusCode::NOT_FOUND => conductor_workflow::Error::not_found(),
                    StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                        conductor_workflow::Error::timeout()
                    }
                    _ => conductor_workflow::Error::external_error(),
                };

                if body.is_empty() {
                    error.with_message(format!("Server responded with {status}"))
                } else {
                    error.with_message(format!("Server responded with {status}: {body}"))
                }
            }
        }
    }
}
