// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PII-free prediction fingerprints.
//!
//! The user identifier and the prediction summary only ever leave the
//! service as SHA-256 digests.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use taimako_core::TaimakoError;
use taimako_core::types::{LedgerRecord, PredictionResult};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// The four prediction fields that are hashed into `data_hash`.
#[derive(Serialize)]
struct PredictionSummary<'a> {
    illness: &'a str,
    confidence: f64,
    urgency: &'a str,
    severity: &'a str,
}

/// App identity stamped on every record.
#[derive(Debug, Clone)]
pub struct AppTag {
    pub name: String,
    pub version: String,
}

/// Builds the ledger record for one saved prediction message.
pub fn build_record(
    prediction_id: &str,
    user_id: &str,
    prediction: &PredictionResult,
    at: DateTime<Utc>,
    app: &AppTag,
) -> Result<LedgerRecord, TaimakoError> {
    let summary = PredictionSummary {
        illness: &prediction.illness,
        confidence: prediction.confidence,
        urgency: &prediction.urgency,
        severity: &prediction.severity,
    };
    let summary_json = serde_json::to_vec(&summary).map_err(|e| TaimakoError::Ledger {
        message: format!("failed to serialize prediction summary: {e}"),
        source: Some(Box::new(e)),
    })?;

    Ok(LedgerRecord {
        prediction_id: prediction_id.to_string(),
        user_id_hash: sha256_hex(user_id.as_bytes()),
        illness: prediction.illness.clone(),
        confidence: prediction.confidence,
        urgency: prediction.urgency.clone(),
        severity: prediction.severity.clone(),
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        data_hash: sha256_hex(&summary_json),
        app: app.name.clone(),
        version: app.version.clone(),
    })
}

/// Public explorer link for a ledger transaction.
pub fn explorer_url(network: &str, transaction_id: &str) -> String {
    let host = if network == "mainnet" { "" } else { "testnet." };
    format!("https://{host}hashscan.io/transaction/{transaction_id}")
}
