// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps pipeline errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use taimako_core::TaimakoError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A request failure: client errors become 400, everything else 500.
///
/// 500 bodies carry the error's message in `error` and its debug
/// rendering, including any source chain, in `details`.
#[derive(Debug)]
pub struct ApiError(pub TaimakoError);

impl From<TaimakoError> for ApiError {
    fn from(err: TaimakoError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            TaimakoError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message.clone(),
                    details: None,
                },
            ),
            other => {
                tracing::error!(error = %other, "chat turn failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: other.to_string(),
                        details: Some(format!("{other:?}")),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
