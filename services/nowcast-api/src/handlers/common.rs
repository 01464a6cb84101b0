//! Shared response helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nowcast_common::NowcastError;
use serde::Serialize;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error response with an explicit status and code.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: code.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// Error response derived from an engine error.
pub fn nowcast_error_response(err: &NowcastError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Nowcast request failed");
    }
    error_response(status, err.error_code(), err.to_string())
}

/// 400 for a request that could not be decoded.
pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "InvalidParameterValue", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_error_kind() {
        let resp = nowcast_error_response(&NowcastError::InvalidBbox("inverted".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = nowcast_error_response(&NowcastError::UpstreamUnavailable("down".into()));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = nowcast_error_response(&NowcastError::Dataset("bad".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
