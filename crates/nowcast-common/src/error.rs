//! Error types for the nowcast engine.

use thiserror::Error;

/// Result type alias using NowcastError.
pub type NowcastResult<T> = Result<T, NowcastError>;

/// Primary error type for nowcast operations.
#[derive(Debug, Error)]
pub enum NowcastError {
    // === Input Errors ===
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid bbox: {0}")]
    InvalidBbox(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Upstream Errors ===
    #[error("Upstream weather unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Risk provider failure: {0}")]
    Provider(String),

    // === Data Errors ===
    #[error("Failed to load dataset: {0}")]
    Dataset(String),

    // === Infrastructure Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NowcastError {
    /// Shorthand for an invalid parameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        NowcastError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Machine readable code used in JSON error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            NowcastError::InvalidGeometry(_) => "InvalidGeometry",
            NowcastError::InvalidBbox(_) => "InvalidBbox",
            NowcastError::InvalidParameter { .. } => "InvalidParameterValue",
            NowcastError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            NowcastError::Provider(_) => "ProviderFailure",
            NowcastError::Dataset(_) => "DatasetError",
            NowcastError::Io(_) | NowcastError::Json(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NowcastError::InvalidGeometry(_)
            | NowcastError::InvalidBbox(_)
            | NowcastError::InvalidParameter { .. } => 400,

            NowcastError::UpstreamUnavailable(_) | NowcastError::Provider(_) => 502,

            _ => 500,
        }
    }
}
