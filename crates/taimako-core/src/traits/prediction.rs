// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured illness-prediction oracle trait.

use async_trait::async_trait;

use crate::error::TaimakoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{PredictionRequest, PredictionResult};

/// Adapter for the rule-based prediction procedure.
#[async_trait]
pub trait PredictionOracle: PluginAdapter {
    /// Predicts an illness from merged symptoms.
    ///
    /// Any non-success status or transport error is an `Err`.
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, TaimakoError>;
}
