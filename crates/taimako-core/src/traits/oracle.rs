// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Symptom/advice oracle trait (the LLM behind the chat).

use async_trait::async_trait;

use crate::error::TaimakoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OracleReply, OracleRequest};

/// Adapter for the language model that drafts replies and extracts symptoms.
///
/// Implementations return an error on any transport or parse failure; the
/// caller decides how to degrade.
#[async_trait]
pub trait SymptomOracle: PluginAdapter {
    /// Sends one prompt pair and returns the normalised reply.
    async fn consult(&self, request: OracleRequest) -> Result<OracleReply, TaimakoError>;
}
