// crates/tansive-server/src/errors.rs
// ============================================================================
// Module: HTTP Error Mapping
// Description: Converts the domain ApiError hierarchy into HTTP responses.
// Purpose: Give every handler a single `?`-compatible error type.
// Dependencies: axum, tansive-core
// ============================================================================

//! ## Overview
//! Every handler in this crate returns `Result<T, HttpApiError>`.
//! [`HttpApiError`] wraps [`tansive_core::core::ApiError`] and implements
//! [`IntoResponse`], converting to `{result: 0, error: <description>}` at
//! the status code the error's [`tansive_core::core::ErrorKind`] maps to
//! (component 7 "Propagation rule").

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use tansive_core::core::ApiError;
use tansive_core::core::ErrorResponse;

/// A thin newtype so this crate can implement [`IntoResponse`] for
/// [`ApiError`], which lives in `tansive-core` and cannot carry an axum
/// impl directly.
#[derive(Debug)]
pub struct HttpApiError(pub ApiError);

impl From<ApiError> for HttpApiError {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::from(&self.0);
        (status, Json(body)).into_response()
    }
}
