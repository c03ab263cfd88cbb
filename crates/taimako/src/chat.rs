// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taimako chat` command implementation: one turn, printed as JSON.

use taimako_config::TaimakoConfig;
use taimako_core::TaimakoError;
use taimako_core::types::ChatRequest;

use crate::serve::{build_services, init_tracing};

/// Runs a single chat turn through the full pipeline.
pub async fn run_chat(
    config: TaimakoConfig,
    user_id: String,
    message: String,
    conversation_id: Option<String>,
) -> Result<(), TaimakoError> {
    init_tracing(&config.service.log_level);

    let services = build_services(&config).await?;
    let result = services
        .pipeline
        .handle(ChatRequest {
            conversation_id,
            user_id,
            message,
            ..ChatRequest::default()
        })
        .await;
    services.shutdown().await;

    let response = result?;
    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|e| TaimakoError::Internal(format!("failed to render response: {e}")))?;
    println!("{rendered}");
    Ok(())
}
