// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Taimako symptom-triage service.
//!
//! This crate provides the trait definitions for every external collaborator
//! (persistence, symptom oracle, prediction oracle, ledger), the shared error
//! type, and the domain and wire types used throughout the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TaimakoError;
pub use types::{AdapterType, ConversationStage, HealthStatus, MessageType, Role};

// Re-export all adapter traits at crate root.
pub use traits::{ConversationStore, LedgerSink, PluginAdapter, PredictionOracle, SymptomOracle};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::types::{
        ChatReply, ChatRequest, OracleReply, PredictionResult, format_timestamp, parse_timestamp,
    };

    #[test]
    fn only_validation_is_a_client_error() {
        assert!(TaimakoError::Validation("missing".into()).is_client_error());
        assert!(!TaimakoError::conversation_not_found("c-1").is_client_error());
        assert!(!TaimakoError::Internal("boom".into()).is_client_error());
        let storage = TaimakoError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        assert!(!storage.is_client_error());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = TaimakoError::conversation_not_found("abc");
        assert_eq!(err.to_string(), "conversation not found: abc");
    }

    #[test]
    fn message_type_uses_snake_case_tags() {
        assert_eq!(MessageType::FollowUp.to_string(), "follow_up");
        assert_eq!(MessageType::from_str("clarification").unwrap(), MessageType::Clarification);
        assert_eq!(
            serde_json::to_string(&MessageType::Prediction).unwrap(),
            "\"prediction\""
        );
    }

    #[test]
    fn message_type_lenient_parse_defaults_to_text() {
        assert_eq!(MessageType::parse_lenient("diagnosis"), MessageType::Text);
        assert_eq!(MessageType::parse_lenient(" follow_up "), MessageType::FollowUp);
    }

    #[test]
    fn unknown_stage_maps_to_ongoing() {
        assert_eq!(ConversationStage::parse_lenient("wrap_up"), ConversationStage::Ongoing);
        assert_eq!(
            ConversationStage::parse_lenient("symptom_collection"),
            ConversationStage::SymptomCollection
        );
        assert_eq!(ConversationStage::default(), ConversationStage::Initial);
    }

    #[test]
    fn stage_transitions_follow_documented_progression() {
        use ConversationStage::*;
        assert!(Initial.is_documented_transition(SymptomCollection));
        assert!(SymptomCollection.is_documented_transition(Prediction));
        assert!(Prediction.is_documented_transition(FollowUp));
        assert!(FollowUp.is_documented_transition(Ongoing));
        assert!(Clarification.is_documented_transition(Clarification));
        assert!(!Initial.is_documented_transition(FollowUp));
        assert!(!Prediction.is_documented_transition(Initial));
    }

    #[test]
    fn timestamps_roundtrip_and_sort_lexicographically() {
        let early = chrono::DateTime::parse_from_rfc3339("2026-01-01T09:05:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let late = early + chrono::Duration::milliseconds(1500);
        let (a, b) = (format_timestamp(early), format_timestamp(late));
        assert_eq!(a, "2026-01-01T09:05:00.000Z");
        assert!(a < b);
        assert_eq!(parse_timestamp(&b), Some(late));
    }

    #[test]
    fn prediction_result_keeps_unknown_fields() {
        let json = serde_json::json!({
            "illness": "Malaria",
            "confidence": 0.85,
            "urgency": "moderate",
            "severity": "moderate",
            "prevention_tips": ["Sleep under a net"]
        });
        let result: PredictionResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.illness, "Malaria");
        assert!(result.advice.is_none());
        assert!(result.extra.contains_key("prevention_tips"));

        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["prevention_tips"][0], "Sleep under a net");
    }

    #[test]
    fn fallback_reply_never_needs_clarification() {
        let reply = OracleReply::fallback();
        assert_eq!(reply.message_type, MessageType::Text);
        assert_eq!(reply.needs_clarification, Some(false));
        assert!(reply.extracted_symptoms.is_empty());
        assert!(reply.follow_up_questions.is_empty());
        assert!(!reply.content.is_empty());
    }

    #[test]
    fn oracle_reply_lifts_prediction_fields() {
        let mut reply = OracleReply::fallback();
        reply.prediction_data = Some(serde_json::json!({
            "illness": "Typhoid",
            "confidence": 0.72,
            "urgency": "high",
            "severity": "severe"
        }));
        assert_eq!(reply.confidence(), Some(0.72));
        assert_eq!(reply.urgency().as_deref(), Some("high"));
        assert_eq!(reply.severity().as_deref(), Some("severe"));
    }

    #[test]
    fn chat_reply_reads_illness_from_prediction_payload() {
        let mut reply = ChatReply {
            content: "x".into(),
            message_type: MessageType::Prediction,
            prediction_data: Some(serde_json::json!({"illness": "Typhoid"})),
            follow_up_questions: vec![],
            confidence: None,
            urgency: None,
            severity: None,
        };
        assert_eq!(reply.predicted_illness(), Some("Typhoid"));
        reply.prediction_data = Some(serde_json::json!({"confidence": 0.4}));
        assert_eq!(reply.predicted_illness(), None);
    }

    #[test]
    fn chat_request_missing_fields_deserialize_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.user_id.is_empty());
        assert_eq!(req.message, "hi");
        assert!(req.conversation_id.is_none());
    }

    #[test]
    fn adapter_type_display_roundtrip() {
        for variant in [
            AdapterType::Storage,
            AdapterType::Oracle,
            AdapterType::Prediction,
            AdapterType::Ledger,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_store<T: ConversationStore>() {}
        fn _assert_oracle<T: SymptomOracle>() {}
        fn _assert_prediction<T: PredictionOracle>() {}
        fn _assert_ledger<T: LedgerSink>() {}
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.to_string(), "user");
    }
}
