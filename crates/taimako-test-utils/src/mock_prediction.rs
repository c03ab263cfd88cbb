// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock prediction oracle for deterministic testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use taimako_core::traits::adapter::PluginAdapter;
use taimako_core::traits::prediction::PredictionOracle;
use taimako_core::types::{AdapterType, HealthStatus, PredictionRequest, PredictionResult};
use taimako_core::TaimakoError;

/// A prediction with the given illness, confidence, and advice.
pub fn prediction(illness: &str, confidence: f64, advice: Option<&str>) -> PredictionResult {
    PredictionResult {
        illness: illness.to_string(),
        confidence,
        urgency: "moderate".to_string(),
        severity: "moderate".to_string(),
        advice: advice.map(str::to_string),
        extra: serde_json::Map::new(),
    }
}

/// A mock prediction oracle that always returns the same outcome.
pub struct MockPrediction {
    outcome: Result<PredictionResult, String>,
    requests: Arc<Mutex<Vec<PredictionRequest>>>,
}

impl MockPrediction {
    pub fn returning(result: PredictionResult) -> Self {
        Self {
            outcome: Ok(result),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails as a non-success status would.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockPrediction {
    fn name(&self) -> &str {
        "mock-prediction"
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
impl PredictionOracle for MockPrediction {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, TaimakoError> {
        self.requests.lock().await.push(request.clone());
        self.outcome.clone().map_err(|message| {
            tracing::debug!(error = %message, "mock prediction failing");
            TaimakoError::Prediction {
                message,
                source: None,
            }
        })
    }
}
