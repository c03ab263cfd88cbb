// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Taimako triage service.

use thiserror::Error;

/// The primary error type used across all Taimako adapter traits and the
/// triage pipeline.
#[derive(Debug, Error)]
pub enum TaimakoError {
    /// Request rejected before any processing (missing user id or message).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist in the persistence service.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Configuration errors (invalid TOML, missing secrets, bad endpoints).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Symptom oracle errors (transport failure, non-success status, bad JSON).
    #[error("oracle error: {message}")]
    Oracle {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Prediction oracle errors.
    #[error("prediction error: {message}")]
    Prediction {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ledger submission errors.
    #[error("ledger error: {message}")]
    Ledger {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TaimakoError {
    /// Shorthand for a missing conversation.
    pub fn conversation_not_found(id: impl Into<String>) -> Self {
        TaimakoError::NotFound {
            entity: "conversation".to_string(),
            id: id.into(),
        }
    }

    /// Returns true for errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TaimakoError::Validation(_))
    }
}
