// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP mapping for the error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`. The wrapper maps each
//! [`PostloomError`] variant to a fixed status code so clients can
//! distinguish "does not exist" (404) from "not yours" (403) and quota
//! exhaustion (429) from malformed input (422).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postloom_core::PostloomError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Wrapper carrying a domain error through an axum handler.
#[derive(Debug)]
pub struct ApiError(pub PostloomError);

impl From<PostloomError> for ApiError {
    fn from(err: PostloomError) -> Self {
        Self(err)
    }
}

/// Status code for each error variant.
pub fn status_for(err: &PostloomError) -> StatusCode {
    match err {
        PostloomError::Unauthenticated => StatusCode::UNAUTHORIZED,
        PostloomError::Forbidden { .. } => StatusCode::FORBIDDEN,
        PostloomError::NotFound { .. } => StatusCode::NOT_FOUND,
        PostloomError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        PostloomError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PostloomError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PostloomError::Provider { .. } => StatusCode::BAD_GATEWAY,
        PostloomError::Storage { .. } | PostloomError::Config(_) | PostloomError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = %status, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = %status, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
