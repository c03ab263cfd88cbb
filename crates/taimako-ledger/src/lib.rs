// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verification ledger support for the Taimako triage service.
//!
//! Predictions are reduced to a hashed fingerprint ([`fingerprint`]) and
//! appended to a public ledger through a relay ([`client::HttpLedger`]).

pub mod client;
pub mod fingerprint;

pub use client::HttpLedger;
pub use fingerprint::{AppTag, build_record, explorer_url, sha256_hex};
