// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prediction oracle client for the Taimako triage service.
//!
//! Posts the merged symptom list to the predict-illness procedure and reads
//! the structured result out of its `{ "result": ... }` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use taimako_config::model::PredictionConfig;
use taimako_core::error::TaimakoError;
use taimako_core::traits::{PluginAdapter, PredictionOracle};
use taimako_core::types::{AdapterType, HealthStatus, PredictionRequest, PredictionResult};
use tracing::{debug, info};

/// Envelope returned by the predict-illness procedure.
#[derive(Debug, Deserialize)]
struct PredictionEnvelope {
    result: PredictionResult,
}

/// HTTP-backed prediction oracle.
#[derive(Debug, Clone)]
pub struct HttpPredictionOracle {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPredictionOracle {
    /// Builds the oracle from the `[prediction]` section.
    ///
    /// Returns `Ok(None)` when no endpoint is configured, which disables
    /// escalation entirely.
    pub fn from_config(config: &PredictionConfig) -> Result<Option<Self>, TaimakoError> {
        let Some(endpoint) = config.endpoint.clone() else {
            return Ok(None);
        };
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("TAIMAKO_PREDICTION_API_KEY").ok());
        let oracle = Self::new(
            endpoint,
            api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(endpoint = %oracle.endpoint, "prediction oracle initialized");
        Ok(Some(oracle))
    }

    /// Creates a client posting to `endpoint`, optionally with a bearer credential.
    pub fn new(
        endpoint: String,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, TaimakoError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    TaimakoError::Config(format!("invalid prediction API key: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TaimakoError::Prediction {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpPredictionOracle {
    fn name(&self) -> &str {
        "predict-illness"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Prediction
    }

    async fn health_check(&self) -> Result<HealthStatus, TaimakoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaimakoError> {
        Ok(())
    }
}

#[async_trait]
impl PredictionOracle for HttpPredictionOracle {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, TaimakoError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TaimakoError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    TaimakoError::Prediction {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, symptoms = request.symptoms.len(), "prediction response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaimakoError::Prediction {
                message: format!("prediction returned {status}: {body}"),
                source: None,
            });
        }

        let envelope: PredictionEnvelope =
            response.json().await.map_err(|e| TaimakoError::Prediction {
                message: format!("failed to parse prediction response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(envelope.result)
    }
}
