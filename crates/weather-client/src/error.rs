//! Error types for upstream weather access.

use nowcast_common::NowcastError;
use thiserror::Error;

/// Errors raised while fetching or parsing upstream weather.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response could not be decoded into a forecast.
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// All retries failed and no cached value was available.
    #[error("upstream unavailable for {key} after {attempts} attempts: {last_error}")]
    UpstreamUnavailable {
        key: String,
        attempts: u32,
        last_error: String,
    },
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

impl From<FetchError> for NowcastError {
    fn from(err: FetchError) -> Self {
        NowcastError::UpstreamUnavailable(err.to_string())
    }
}
