// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat completion types and the oracle's JSON reply shape.

use serde::{Deserialize, Serialize};
use taimako_core::types::{ConversationStage, MessageType, OracleReply};

/// Reply text used when the model answers without a `content` field.
pub const MISSING_CONTENT_REPLY: &str =
    "I understand you're not feeling well. Can you tell me more about your symptoms?";

// --- Request types ---

/// A request to the chat completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

/// One prompt message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Forces the model to answer with a single JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

// --- Response types ---

/// A completed (non-streaming) chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Error envelope returned on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    pub message: String,
}

// --- Oracle reply ---

/// The JSON object the system prompt asks the model to produce.
///
/// Every field is optional; [`RawOracleReply::normalize`] fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOracleReply {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub extracted_symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub conversation_stage: Option<String>,
    #[serde(default)]
    pub needs_clarification: Option<bool>,
    #[serde(default)]
    pub should_predict: Option<bool>,
    #[serde(default)]
    pub follow_up_questions: Option<Vec<String>>,
    #[serde(default)]
    pub prediction_data: Option<serde_json::Value>,
}

impl RawOracleReply {
    /// Fills defaults and maps free-form tags onto the closed enums.
    pub fn normalize(self) -> OracleReply {
        OracleReply {
            content: self
                .content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| MISSING_CONTENT_REPLY.to_string()),
            message_type: self
                .message_type
                .as_deref()
                .map(MessageType::parse_lenient)
                .unwrap_or_default(),
            extracted_symptoms: self.extracted_symptoms.unwrap_or_default(),
            conversation_stage: self
                .conversation_stage
                .as_deref()
                .map(ConversationStage::parse_lenient),
            needs_clarification: self.needs_clarification,
            should_predict: self.should_predict.unwrap_or(false),
            follow_up_questions: self.follow_up_questions.unwrap_or_default(),
            prediction_data: self.prediction_data.filter(|v| !v.is_null()),
        }
    }
}
