// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits, the triage pipeline, and the
//! HTTP contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Timestamp layout used for every persisted `*_at` column.
///
/// Fixed width and UTC so that lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats a UTC instant in the persisted timestamp layout.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp back into a UTC instant.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator an adapter fronts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Oracle,
    Prediction,
    Ledger,
}

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Tag describing what kind of content a message carries.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Prediction,
    FollowUp,
    Clarification,
}

impl MessageType {
    /// Parses a tag reported by the oracle, falling back to `text`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

/// Informal label for where a conversation is in the triage flow.
///
/// Documented progression: `initial -> symptom_collection ->
/// clarification | prediction -> follow_up -> ongoing`. The oracle chooses
/// the label each turn and nothing enforces the progression; see
/// [`ConversationStage::is_documented_transition`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Initial,
    SymptomCollection,
    Clarification,
    Prediction,
    FollowUp,
    Ongoing,
}

impl ConversationStage {
    /// Parses a stage reported by the oracle; unknown labels become `ongoing`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(ConversationStage::Ongoing)
    }

    /// Whether moving from `self` to `next` follows the documented progression.
    ///
    /// Staying in the same stage and dropping into `ongoing` are always allowed.
    pub fn is_documented_transition(self, next: ConversationStage) -> bool {
        use ConversationStage::*;
        if self == next || next == Ongoing {
            return true;
        }
        matches!(
            (self, next),
            (Initial, SymptomCollection)
                | (Initial, Clarification)
                | (Initial, Prediction)
                | (SymptomCollection, Clarification)
                | (SymptomCollection, Prediction)
                | (Clarification, SymptomCollection)
                | (Clarification, Prediction)
                | (Prediction, FollowUp)
                | (FollowUp, Prediction)
                | (Ongoing, SymptomCollection)
                | (Ongoing, Clarification)
                | (Ongoing, Prediction)
                | (Ongoing, FollowUp)
        )
    }
}

/// Optional state / district codes attached to a conversation or request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lga_code: Option<String>,
}

/// Self-reported user details forwarded to the oracles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub current_medications: Vec<String>,
}

/// A persisted conversation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub total_messages: i64,
    pub state_code: Option<String>,
    pub lga_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    /// A conversation nobody has written into yet.
    pub fn is_empty(&self) -> bool {
        self.total_messages == 0
    }
}

/// Fields supplied when provisioning a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub user_id: String,
    pub title: String,
    pub location: Option<Location>,
}

/// A persisted, append-only conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub message_type: MessageType,
    pub prediction_data: Option<serde_json::Value>,
    pub follow_up_questions: Vec<String>,
    pub created_at: String,
}

/// Fields supplied when appending a message.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub message_type: MessageType,
    pub prediction_data: Option<serde_json::Value>,
    pub follow_up_questions: Vec<String>,
}

impl NewMessage {
    /// A plain-text user turn.
    pub fn user(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            role: Role::User,
            content: content.into(),
            message_type: MessageType::Text,
            prediction_data: None,
            follow_up_questions: Vec::new(),
        }
    }
}

/// A conversation together with its messages in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationWithMessages {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

impl ConversationWithMessages {
    pub fn total_messages(&self) -> i64 {
        self.conversation.total_messages
    }
}

/// Per-conversation accumulated triage state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub conversation_id: String,
    /// Symptom tokens seen so far; unique, order not significant.
    pub extracted_symptoms: Vec<String>,
    /// Illness names raised by past predictions; repeats allowed.
    pub current_concerns: Vec<String>,
    pub conversation_stage: ConversationStage,
    pub updated_at: String,
}

/// Structured output of the prediction oracle.
///
/// Only the named fields are inspected; everything else the oracle returns
/// is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub illness: String,
    pub confidence: f64,
    pub urgency: String,
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body sent to the prediction oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub symptoms: Vec<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Prompt pair handed to the symptom oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Normalised reply from the symptom oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleReply {
    pub content: String,
    pub message_type: MessageType,
    pub extracted_symptoms: Vec<String>,
    pub conversation_stage: Option<ConversationStage>,
    /// `None` when the oracle omitted the flag.
    pub needs_clarification: Option<bool>,
    pub should_predict: bool,
    pub follow_up_questions: Vec<String>,
    pub prediction_data: Option<serde_json::Value>,
}

impl OracleReply {
    /// Text used when the oracle cannot be reached or answers garbage.
    pub const FALLBACK_CONTENT: &'static str = "I'm sorry, I'm having trouble processing your message right now. Can you please try again?";

    /// The fixed reply substituted for any oracle failure.
    pub fn fallback() -> Self {
        Self {
            content: Self::FALLBACK_CONTENT.to_string(),
            message_type: MessageType::Text,
            extracted_symptoms: Vec::new(),
            conversation_stage: Some(ConversationStage::Ongoing),
            needs_clarification: Some(false),
            should_predict: false,
            follow_up_questions: Vec::new(),
            prediction_data: None,
        }
    }

    fn prediction_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.prediction_data.as_ref().and_then(|p| p.get(key))
    }

    pub fn confidence(&self) -> Option<f64> {
        self.prediction_field("confidence").and_then(|v| v.as_f64())
    }

    pub fn urgency(&self) -> Option<String> {
        self.prediction_field("urgency")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn severity(&self) -> Option<String> {
        self.prediction_field("severity")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Inbound body of a chat turn.
///
/// `user_id` and `message` default to empty so that their absence is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
}

/// Outbound body of a completed chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub conversation_id: String,
    pub message_id: String,
    pub response: ChatReply,
    pub context: TurnContext,
}

/// The assistant message as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_data: Option<serde_json::Value>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl ChatReply {
    /// Illness named in the attached prediction payload, if any.
    pub fn predicted_illness(&self) -> Option<&str> {
        self.prediction_data
            .as_ref()
            .and_then(|p| p.get("illness"))
            .and_then(|v| v.as_str())
    }
}

/// Triage state reported alongside a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContext {
    pub extracted_symptoms: Vec<String>,
    pub conversation_stage: ConversationStage,
    pub needs_clarification: bool,
}

/// PII-free fingerprint of a prediction, appended to the public ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub prediction_id: String,
    pub user_id_hash: String,
    pub illness: String,
    pub confidence: f64,
    pub urgency: String,
    pub severity: String,
    pub timestamp: String,
    pub data_hash: String,
    pub app: String,
    pub version: String,
}

/// Acknowledgement returned by the ledger for an appended record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub transaction_id: String,
}
