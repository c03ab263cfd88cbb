// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock symptom oracle for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use taimako_core::traits::adapter::PluginAdapter;
use taimako_core::traits::oracle::SymptomOracle;
use taimako_core::types::{AdapterType, HealthStatus, OracleReply, OracleRequest};
use taimako_core::{ConversationStage, MessageType, TaimakoError};

/// A text reply that asks for clarification and reports no symptoms.
///
/// With `needs_clarification = Some(true)` and no symptoms this reply alone
/// never triggers escalation, so tests opt into each trigger explicitly.
pub fn oracle_reply(content: &str) -> OracleReply {
    OracleReply {
        content: content.to_string(),
        message_type: MessageType::Text,
        extracted_symptoms: Vec::new(),
        conversation_stage: Some(ConversationStage::SymptomCollection),
        needs_clarification: Some(true),
        should_predict: false,
        follow_up_questions: Vec::new(),
        prediction_data: None,
    }
}

enum Scripted {
    Reply(OracleReply),
    Fail(String),
}

/// A mock oracle returning queued replies in FIFO order.
///
/// When the queue is empty, [`oracle_reply`] with "mock reply" is returned.
/// Every request is recorded for prompt assertions.
pub struct MockOracle {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_replies(replies: Vec<OracleReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into_iter().map(Scripted::Reply).collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push_reply(&self, reply: OracleReply) {
        self.script.lock().await.push_back(Scripted::Reply(reply));
    }

    /// Queues a transport-style failure for the next call.
    pub async fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Prompts received so far, oldest first.
    pub async fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockOracle {
    fn name(&self) -> &str {
        "mock-oracle"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Oracle
    }

    async fn health_check(&self) -> Result<HealthStatus, TaimakoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaimakoError> {
        Ok(())
    }
}

#[async_trait]
impl SymptomOracle for MockOracle {
    async fn consult(&self, request: OracleRequest) -> Result<OracleReply, TaimakoError> {
        self.requests.lock().await.push(request);
        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => {
                tracing::debug!(error = %message, "mock oracle returning scripted failure");
                Err(TaimakoError::Oracle {
                    message,
                    source: None,
                })
            }
            None => {
                tracing::debug!("mock oracle script exhausted, using default reply");
                Ok(oracle_reply("mock reply"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OracleRequest {
        OracleRequest {
            system_prompt: "system".into(),
            user_prompt: "user".into(),
        }
    }

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let oracle = MockOracle::new();
        let reply = oracle.consult(request()).await.unwrap();
        assert_eq!(reply.content, "mock reply");
        assert_eq!(oracle.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_replies_and_failures_in_order() {
        let oracle = MockOracle::with_replies(vec![oracle_reply("first")]);
        oracle.push_failure("connection reset").await;

        assert_eq!(oracle.consult(request()).await.unwrap().content, "first");
        let err = oracle.consult(request()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(oracle.consult(request()).await.unwrap().content, "mock reply");
    }
}
