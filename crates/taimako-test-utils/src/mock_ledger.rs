// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock ledger sink that captures appended records.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use taimako_core::traits::adapter::PluginAdapter;
use taimako_core::traits::ledger::LedgerSink;
use taimako_core::types::{AdapterType, HealthStatus, LedgerReceipt, LedgerRecord};
use taimako_core::TaimakoError;

/// Captures ledger records; optionally fails every append after capturing.
pub struct MockLedger {
    records: Arc<Mutex<Vec<LedgerRecord>>>,
    appended: Arc<Notify>,
    fail: bool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            appended: Arc::new(Notify::new()),
            fail: false,
        }
    }

    /// A ledger whose appends always error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub async fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().await.clone()
    }

    /// Waits until at least `count` records arrived or `timeout` elapses.
    ///
    /// Appends are detached from the chat turn, so tests poll through this.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<LedgerRecord> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.appended.notified();
            {
                let records = self.records.lock().await;
                if records.len() >= count {
                    return records.clone();
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.records().await;
            }
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockLedger {
    fn name(&self) -> &str {
        "mock-ledger"
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
impl LedgerSink for MockLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<LedgerReceipt, TaimakoError> {
        let index = {
            let mut records = self.records.lock().await;
            records.push(record.clone());
            records.len()
        };
        self.appended.notify_waiters();
        if self.fail {
            tracing::debug!(prediction_id = %record.prediction_id, "mock ledger rejecting append");
            return Err(TaimakoError::Ledger {
                message: "relay unavailable".to_string(),
                source: None,
            });
        }
        Ok(LedgerReceipt {
            transaction_id: format!("0.0.1234@{index}.000000000"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LedgerRecord {
        LedgerRecord {
            prediction_id: "m-1".into(),
            user_id_hash: "ab".into(),
            illness: "Malaria".into(),
            confidence: 0.85,
            urgency: "moderate".into(),
            severity: "moderate".into(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            data_hash: "cd".into(),
            app: "Taimako".into(),
            version: "1.0.0".into(),
        }
    }

    #[tokio::test]
    async fn wait_for_returns_once_records_arrive() {
        let ledger = Arc::new(MockLedger::new());
        let writer = ledger.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.append(&record()).await.unwrap();
        });
        let records = ledger.wait_for(1, Duration::from_secs(5)).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn wait_for_times_out_empty() {
        let ledger = MockLedger::new();
        let records = ledger.wait_for(1, Duration::from_millis(30)).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn failing_ledger_still_captures() {
        let ledger = MockLedger::failing();
        assert!(ledger.append(&record()).await.is_err());
        assert_eq!(ledger.records().await.len(), 1);
    }
}
