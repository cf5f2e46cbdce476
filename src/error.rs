use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Everything that can go wrong between dispatching a job and holding a
/// decoded result.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status or an error-shaped body.
    #[error("backend returned {status}")]
    Backend { status: StatusCode, body: Value },

    /// A 2xx body that does not match the expected result shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The request could not be turned into a body (bad MIME type,
    /// serialization failure). Nothing was sent.
    #[error("could not encode request: {0}")]
    Encode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

