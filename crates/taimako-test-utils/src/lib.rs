// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Taimako integration tests.
//!
//! Provides mock collaborators and a harness over a temp SQLite database,
//! so that chat turns can be driven end to end without external services.
//!
//! # Components
//!
//! - [`MockOracle`] - Symptom oracle with queued replies or injected failures
//! - [`MockPrediction`] - Prediction oracle with a fixed result or failure
//! - [`MockLedger`] - Ledger sink that captures appended records
//! - [`TestHarness`] - Full pipeline over temp storage and the mocks above

pub mod harness;
pub mod mock_ledger;
pub mod mock_oracle;
pub mod mock_prediction;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_ledger::MockLedger;
pub use mock_oracle::{MockOracle, oracle_reply};
pub use mock_prediction::{MockPrediction, prediction};
