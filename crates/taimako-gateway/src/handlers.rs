// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers: POST /v1/chat and GET /health.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use taimako_core::types::{ChatRequest, HealthStatus};
use taimako_core::{PluginAdapter, TaimakoError};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when storage reports a problem.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /v1/chat
///
/// Runs one chat turn. A body that is not valid JSON is a client error,
/// like a missing `user_id` or `message`.
pub async fn post_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError(TaimakoError::Validation(e.body_text())))?;
    let response = state.pipeline.handle(request).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.pipeline.store().health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(_) | Err(_) => "degraded",
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
