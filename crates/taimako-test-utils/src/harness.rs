// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end chat-turn testing.
//!
//! `TestHarness` assembles a [`TriagePipeline`] over a temp SQLite database
//! and the mock collaborators, and exposes `send()` to drive chat turns.

use std::sync::Arc;

use taimako_config::TaimakoConfig;
use taimako_config::model::StorageConfig;
use taimako_core::types::{ChatRequest, ChatResponse, OracleReply, PredictionResult};
use taimako_core::{ConversationStore, TaimakoError};
use taimako_storage::SqliteStorage;
use taimako_triage::TriagePipeline;

use crate::mock_ledger::MockLedger;
use crate::mock_oracle::MockOracle;
use crate::mock_prediction::MockPrediction;

/// Builder for creating test environments with configurable collaborators.
pub struct TestHarnessBuilder {
    replies: Vec<OracleReply>,
    prediction: Option<MockPrediction>,
    ledger: Option<MockLedger>,
    config: TaimakoConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            prediction: None,
            ledger: None,
            config: TaimakoConfig::default(),
        }
    }

    /// Queue oracle replies, consumed one per turn.
    pub fn with_oracle_replies(mut self, replies: Vec<OracleReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Attach a prediction oracle that always returns `result`.
    pub fn with_prediction(mut self, result: PredictionResult) -> Self {
        self.prediction = Some(MockPrediction::returning(result));
        self
    }

    /// Attach a prediction oracle that always fails.
    pub fn with_failing_prediction(mut self) -> Self {
        self.prediction = Some(MockPrediction::failing("prediction returned 503"));
        self
    }

    /// Attach a capturing ledger.
    pub fn with_ledger(mut self, ledger: MockLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Override configuration; storage settings are replaced by the temp database.
    pub fn with_config(mut self, config: TaimakoConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the test harness, creating and migrating the temp database.
    pub async fn build(self) -> Result<TestHarness, TaimakoError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TaimakoError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let oracle = Arc::new(MockOracle::with_replies(self.replies));
        let prediction = self.prediction.map(Arc::new);
        let ledger = self.ledger.map(Arc::new);

        tracing::debug!(
            db = %db_path.display(),
            prediction = prediction.is_some(),
            ledger = ledger.is_some(),
            "test harness ready"
        );
        let mut pipeline = TriagePipeline::new(storage.clone(), oracle.clone(), &config);
        if let Some(p) = &prediction {
            pipeline = pipeline.with_prediction(p.clone());
        }
        if let Some(l) = &ledger {
            pipeline = pipeline.with_ledger(l.clone());
        }

        Ok(TestHarness {
            pipeline: Arc::new(pipeline),
            storage,
            oracle,
            prediction,
            ledger,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    pub pipeline: Arc<TriagePipeline>,
    pub storage: Arc<SqliteStorage>,
    pub oracle: Arc<MockOracle>,
    pub prediction: Option<Arc<MockPrediction>>,
    pub ledger: Option<Arc<MockLedger>>,
    pub config: TaimakoConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default configuration and no prediction or ledger.
    pub async fn new() -> Result<Self, TaimakoError> {
        Self::builder().build().await
    }

    /// Sends a message as `user_id`, starting or reusing a conversation.
    pub async fn send(&self, user_id: &str, message: &str) -> Result<ChatResponse, TaimakoError> {
        self.pipeline
            .handle(ChatRequest {
                user_id: user_id.to_string(),
                message: message.to_string(),
                ..ChatRequest::default()
            })
            .await
    }

    /// Sends a message into an existing conversation.
    pub async fn send_to(
        &self,
        conversation_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<ChatResponse, TaimakoError> {
        self.pipeline
            .handle(ChatRequest {
                conversation_id: Some(conversation_id.to_string()),
                user_id: user_id.to_string(),
                message: message.to_string(),
                ..ChatRequest::default()
            })
            .await
    }
}
