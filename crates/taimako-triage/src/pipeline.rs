// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sequential chat-turn pipeline.
//!
//! Each step depends on the previous one, so a turn never runs anything in
//! parallel. Persistence failures abort the turn without rolling back earlier
//! writes. Oracle and prediction failures degrade in place. The ledger append
//! is detached and never affects the response.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use taimako_config::TaimakoConfig;
use taimako_config::model::TriageConfig;
use taimako_core::types::{
    ChatReply, ChatRequest, ChatResponse, NewMessage, OracleReply, PredictionRequest,
    PredictionResult, TurnContext,
};
use taimako_core::{
    ConversationStage, ConversationStore, LedgerSink, PredictionOracle, Role, SymptomOracle,
    TaimakoError,
};
use taimako_ledger::{AppTag, build_record};
use tracing::{debug, info, warn};

use crate::composer::compose_reply;
use crate::escalation::{EscalationInput, EscalationPolicy};
use crate::extractor::extract_symptoms;
use crate::merger::{TurnEvidence, merge_symptoms, next_context};
use crate::prompt::{PromptBuilder, PromptInput};
use crate::session::SessionManager;

/// Runs chat turns against the configured collaborators.
pub struct TriagePipeline {
    store: Arc<dyn ConversationStore>,
    oracle: Arc<dyn SymptomOracle>,
    prediction: Option<Arc<dyn PredictionOracle>>,
    ledger: Option<Arc<dyn LedgerSink>>,
    triage: TriageConfig,
    assistant_name: String,
    app: AppTag,
    prompts: PromptBuilder,
    policy: EscalationPolicy,
}

impl TriagePipeline {
    /// Creates a pipeline without prediction or ledger collaborators.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        oracle: Arc<dyn SymptomOracle>,
        config: &TaimakoConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            prediction: None,
            ledger: None,
            triage: config.triage.clone(),
            assistant_name: config.service.name.clone(),
            app: AppTag {
                name: config.ledger.app_name.clone(),
                version: config.ledger.app_version.clone(),
            },
            prompts: PromptBuilder::new(&config.triage),
            policy: EscalationPolicy::from_config(&config.triage),
        }
    }

    /// Enables escalation to a prediction oracle.
    pub fn with_prediction(mut self, prediction: Arc<dyn PredictionOracle>) -> Self {
        self.prediction = Some(prediction);
        self
    }

    /// Enables best-effort ledger appends for saved predictions.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerSink>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Handles one chat turn at the current time.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, TaimakoError> {
        self.handle_at(request, Utc::now()).await
    }

    /// Handles one chat turn; `now` anchors the conversation reuse window.
    pub async fn handle_at(
        &self,
        request: ChatRequest,
        now: DateTime<Utc>,
    ) -> Result<ChatResponse, TaimakoError> {
        validate(&request)?;
        let user_id = request.user_id.as_str();
        let message = request.message.as_str();

        let sessions = SessionManager::new(
            self.store.as_ref(),
            Duration::from_secs(self.triage.reuse_window_secs),
        );
        let conversation_id = sessions
            .resolve(
                request.conversation_id.as_deref(),
                user_id,
                message,
                request.location.as_ref(),
                now,
            )
            .await?
            .into_id();

        let loaded = self
            .store
            .get_conversation_with_messages(&conversation_id)
            .await?;
        let prior = self.store.get_context(&conversation_id).await?;
        debug!(
            conversation_id = %conversation_id,
            messages = loaded.messages.len(),
            stage = %prior.as_ref().map(|c| c.conversation_stage).unwrap_or_default(),
            "loaded conversation"
        );

        self.store
            .add_message(&NewMessage::user(&conversation_id, user_id, message))
            .await?;

        let current = extract_symptoms(message);
        let oracle_reply = self
            .consult(&PromptInput {
                assistant_name: &self.assistant_name,
                message,
                history: &loaded.messages,
                context: prior.as_ref(),
                profile: request.user_profile.as_ref(),
                location: request.location.as_ref(),
            })
            .await;

        let prior_symptoms = prior
            .as_ref()
            .map(|c| c.extracted_symptoms.as_slice())
            .unwrap_or_default();
        let merged = merge_symptoms(&current, &oracle_reply.extracted_symptoms, prior_symptoms);

        let escalation = EscalationInput {
            message_count: loaded.messages.len() + 1,
            symptom_count: merged.len(),
            should_predict: oracle_reply.should_predict,
            needs_clarification: oracle_reply.needs_clarification,
        };
        let escalate = self.policy.should_escalate(&escalation);
        debug!(
            messages = escalation.message_count,
            symptoms = escalation.symptom_count,
            escalate,
            "escalation decision"
        );

        let prediction = if escalate {
            self.predict(&request, &merged).await
        } else {
            None
        };

        let reply = compose_reply(&oracle_reply, prediction.as_ref());
        let message_id = self
            .store
            .add_message(&assistant_message(&conversation_id, user_id, &reply))
            .await?;

        let context = next_context(
            TurnEvidence {
                conversation_id: &conversation_id,
                merged_symptoms: merged,
                prior: prior.as_ref(),
                oracle_stage: oracle_reply.conversation_stage,
                reply_type: reply.message_type,
                predicted_illness: reply.predicted_illness(),
            },
            now,
        );
        self.store.upsert_context(&context).await?;

        if let Some(p) = &prediction {
            self.spawn_ledger_append(&message_id, user_id, p, now);
        }

        info!(
            conversation_id = %conversation_id,
            message_id = %message_id,
            message_type = %reply.message_type,
            "chat turn completed"
        );

        Ok(ChatResponse {
            success: true,
            conversation_id,
            message_id,
            response: reply,
            context: TurnContext {
                extracted_symptoms: oracle_reply.extracted_symptoms,
                conversation_stage: oracle_reply
                    .conversation_stage
                    .unwrap_or(ConversationStage::Ongoing),
                needs_clarification: oracle_reply.needs_clarification.unwrap_or(false),
            },
        })
    }

    /// Consults the symptom oracle, substituting the fallback reply on failure.
    async fn consult(&self, input: &PromptInput<'_>) -> OracleReply {
        let request = self.prompts.build(input);
        let mut reply = match self.oracle.consult(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(oracle = self.oracle.name(), error = %e, "symptom oracle failed, using fallback reply");
                OracleReply::fallback()
            }
        };
        reply
            .follow_up_questions
            .truncate(self.triage.max_follow_up_questions);
        reply
    }

    /// Calls the prediction oracle; any failure abandons escalation for the turn.
    async fn predict(&self, request: &ChatRequest, symptoms: &[String]) -> Option<PredictionResult> {
        let Some(oracle) = &self.prediction else {
            debug!("no prediction oracle configured, skipping escalation");
            return None;
        };
        let profile = request.user_profile.as_ref();
        let body = PredictionRequest {
            symptoms: symptoms.to_vec(),
            user_id: request.user_id.clone(),
            age_group: profile.and_then(|p| p.age_group.clone()),
            gender: profile.and_then(|p| p.gender.clone()),
            location: request.location.clone(),
        };
        match oracle.predict(&body).await {
            Ok(result) => {
                info!(illness = %result.illness, confidence = result.confidence, "prediction completed");
                Some(result)
            }
            Err(e) => {
                warn!(error = %e, "prediction failed, keeping oracle reply");
                None
            }
        }
    }

    fn spawn_ledger_append(
        &self,
        prediction_id: &str,
        user_id: &str,
        prediction: &PredictionResult,
        at: DateTime<Utc>,
    ) {
        let Some(ledger) = self.ledger.clone() else {
            return;
        };
        let record = match build_record(prediction_id, user_id, prediction, at, &self.app) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to build ledger record");
                return;
            }
        };
        tokio::spawn(async move {
            match ledger.append(&record).await {
                Ok(receipt) => info!(
                    prediction_id = %record.prediction_id,
                    transaction_id = %receipt.transaction_id,
                    "prediction logged to ledger"
                ),
                Err(e) => warn!(
                    prediction_id = %record.prediction_id,
                    error = %e,
                    "ledger append failed"
                ),
            }
        });
    }
}

/// Rejects requests missing a user id or message before any side effect.
fn validate(request: &ChatRequest) -> Result<(), TaimakoError> {
    if request.user_id.trim().is_empty() || request.message.trim().is_empty() {
        return Err(TaimakoError::Validation(
            "User ID and message are required".to_string(),
        ));
    }
    Ok(())
}

fn assistant_message(conversation_id: &str, user_id: &str, reply: &ChatReply) -> NewMessage {
    NewMessage {
        conversation_id: conversation_id.to_string(),
        user_id: user_id.to_string(),
        role: Role::Assistant,
        content: reply.content.clone(),
        message_type: reply.message_type,
        prediction_data: reply.prediction_data.clone(),
        follow_up_questions: reply.follow_up_questions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fail_validation() {
        let mut req = ChatRequest {
            user_id: "u-1".into(),
            message: "   ".into(),
            ..ChatRequest::default()
        };
        assert!(matches!(validate(&req), Err(TaimakoError::Validation(_))));

        req.message = "fever".into();
        req.user_id.clear();
        assert!(validate(&req).unwrap_err().is_client_error());

        req.user_id = "u-1".into();
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn assistant_message_copies_reply() {
        let reply = compose_reply(&OracleReply::fallback(), None);
        let msg = assistant_message("c-1", "u-1", &reply);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, OracleReply::FALLBACK_CONTENT);
        assert_eq!(msg.conversation_id, "c-1");
    }
}
