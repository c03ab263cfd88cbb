// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only public ledger trait.

use async_trait::async_trait;

use crate::error::TaimakoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{LedgerReceipt, LedgerRecord};

/// Adapter for the verification ledger: append a record, get a transaction id.
#[async_trait]
pub trait LedgerSink: PluginAdapter {
    async fn append(&self, record: &LedgerRecord) -> Result<LedgerReceipt, TaimakoError>;
}
