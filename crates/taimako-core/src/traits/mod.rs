// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod ledger;
pub mod oracle;
pub mod prediction;
pub mod storage;

pub use adapter::PluginAdapter;
pub use ledger::LedgerSink;
pub use oracle::SymptomOracle;
pub use prediction::PredictionOracle;
pub use storage::ConversationStore;
