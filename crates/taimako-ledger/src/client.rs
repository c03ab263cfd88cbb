// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the ledger relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use taimako_config::model::LedgerConfig;
use taimako_core::error::TaimakoError;
use taimako_core::traits::{LedgerSink, PluginAdapter};
use taimako_core::types::{AdapterType, HealthStatus, LedgerReceipt, LedgerRecord};
use tracing::{debug, info};

use crate::fingerprint::explorer_url;

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(alias = "hedera_transaction_id")]
    transaction_id: String,
}

/// Ledger sink that submits one record per POST to a relay service.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: reqwest::Client,
    endpoint: String,
    network: String,
    timeout: Duration,
}

impl HttpLedger {
    /// Builds the sink from the `[ledger]` section.
    ///
    /// Returns `Ok(None)` when the ledger is disabled or has no endpoint.
    pub fn from_config(config: &LedgerConfig) -> Result<Option<Self>, TaimakoError> {
        let Some(endpoint) = config.endpoint.clone().filter(|_| config.enabled) else {
            return Ok(None);
        };
        let ledger = Self::new(
            endpoint,
            config.api_key.as_deref(),
            config.network.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(network = %ledger.network, "ledger relay initialized");
        Ok(Some(ledger))
    }

    pub fn new(
        endpoint: String,
        api_key: Option<&str>,
        network: String,
        timeout: Duration,
    ) -> Result<Self, TaimakoError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| TaimakoError::Config(format!("invalid ledger API key: {e}")))?,
            );
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TaimakoError::Ledger {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint,
            network,
            timeout,
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpLedger {
    fn name(&self) -> &str {
        "ledger-relay"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ledger
    }

    async fn health_check(&self) -> Result<HealthStatus, TaimakoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaimakoError> {
        Ok(())
    }
}

#[async_trait]
impl LedgerSink for HttpLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<LedgerReceipt, TaimakoError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TaimakoError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    TaimakoError::Ledger {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaimakoError::Ledger {
                message: format!("ledger relay returned {status}: {body}"),
                source: None,
            });
        }

        let relay: RelayResponse = response.json().await.map_err(|e| TaimakoError::Ledger {
            message: format!("failed to parse ledger response: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(
            prediction_id = %record.prediction_id,
            explorer = %explorer_url(&self.network, &relay.transaction_id),
            "prediction fingerprint recorded"
        );
        Ok(LedgerReceipt {
            transaction_id: relay.transaction_id,
        })
    }
}
