// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq symptom oracle for the Taimako triage service.
//!
//! Implements [`SymptomOracle`] on top of Groq's OpenAI-compatible chat
//! completions endpoint, asking for a JSON object reply and normalising it.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use taimako_config::model::GroqConfig;
use taimako_core::error::TaimakoError;
use taimako_core::traits::{PluginAdapter, SymptomOracle};
use taimako_core::types::{AdapterType, HealthStatus, OracleReply, OracleRequest};
use tracing::{debug, info};

use crate::client::GroqClient;
use crate::types::{ChatCompletionRequest, ChatMessage, RawOracleReply, ResponseFormat};

/// Groq-backed symptom oracle.
///
/// API key resolution order: config -> `GROQ_API_KEY` env var -> error.
pub struct GroqOracle {
    client: GroqClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqOracle {
    /// Creates an oracle from the `[groq]` config section.
    pub fn new(config: &GroqConfig) -> Result<Self, TaimakoError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GroqClient::new(
            &api_key,
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(model = %config.model, "Groq oracle initialized");
        Ok(Self::with_client(client, config))
    }

    /// Creates an oracle around an existing client.
    pub fn with_client(client: GroqClient, config: &GroqConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn to_completion_request(&self, request: OracleRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt),
                ChatMessage::user(request.user_prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::json_object(),
        }
    }
}

#[async_trait]
impl PluginAdapter for GroqOracle {
    fn name(&self) -> &str {
        "groq"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Oracle
    }

    async fn health_check(&self) -> Result<HealthStatus, TaimakoError> {
        // Probing the endpoint would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaimakoError> {
        debug!("Groq oracle shutting down");
        Ok(())
    }
}

#[async_trait]
impl SymptomOracle for GroqOracle {
    async fn consult(&self, request: OracleRequest) -> Result<OracleReply, TaimakoError> {
        let api_request = self.to_completion_request(request);
        let response = self.client.complete(&api_request).await?;

        let content = response.first_content().ok_or_else(|| TaimakoError::Oracle {
            message: "completion contained no message content".into(),
            source: None,
        })?;
        let raw: RawOracleReply =
            serde_json::from_str(content).map_err(|e| TaimakoError::Oracle {
                message: format!("oracle reply is not the expected JSON object: {e}"),
                source: Some(Box::new(e)),
            })?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "oracle usage"
            );
        }
        Ok(raw.normalize())
    }
}

/// Resolves the API key from config, falling back to `GROQ_API_KEY`.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, TaimakoError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GROQ_API_KEY").map_err(|_| {
        TaimakoError::Config(
            "Groq API key not found. Set groq.api_key in config or GROQ_API_KEY environment variable.".into(),
        )
    })
}
