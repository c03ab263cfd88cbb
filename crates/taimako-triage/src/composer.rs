// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders the assistant reply for a turn.

use taimako_core::MessageType;
use taimako_core::types::{ChatReply, OracleReply, PredictionResult};

/// Used when the prediction carries no advice.
pub const DEFAULT_ADVICE: &str = "Please rest, stay hydrated, and follow medical advice.";

/// Display text summarizing a structured prediction.
pub fn prediction_message(prediction: &PredictionResult) -> String {
    let percent = (prediction.confidence * 100.0).round() as i64;
    let advice = prediction
        .advice
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(DEFAULT_ADVICE);
    format!(
        "Based on your symptoms, you likely have **{illness}** ({percent}% confidence).\n\n\
         {advice}\n\n\
         **Urgency Level:** {urgency}\n\
         **Severity:** {severity}\n\n\
         Please monitor your symptoms closely. If they worsen or don't improve within 2-3 days, visit a doctor immediately. \u{1F3E5}",
        illness = prediction.illness,
        urgency = prediction.urgency.to_uppercase(),
        severity = prediction.severity,
    )
}

/// Composes the reply from the oracle output and an optional prediction.
///
/// With a prediction the reply is re-typed `prediction` and its text is
/// templated; otherwise the oracle's text and type pass through.
pub fn compose_reply(oracle: &OracleReply, prediction: Option<&PredictionResult>) -> ChatReply {
    match prediction {
        Some(p) => ChatReply {
            content: prediction_message(p),
            message_type: MessageType::Prediction,
            prediction_data: serde_json::to_value(p).ok(),
            follow_up_questions: oracle.follow_up_questions.clone(),
            confidence: Some(p.confidence),
            urgency: Some(p.urgency.clone()),
            severity: Some(p.severity.clone()),
        },
        None => ChatReply {
            content: oracle.content.clone(),
            message_type: oracle.message_type,
            prediction_data: oracle.prediction_data.clone(),
            follow_up_questions: oracle.follow_up_questions.clone(),
            confidence: oracle.confidence(),
            urgency: oracle.urgency(),
            severity: oracle.severity(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malaria(advice: Option<&str>) -> PredictionResult {
        PredictionResult {
            illness: "Malaria".into(),
            confidence: 0.85,
            urgency: "moderate".into(),
            severity: "moderate".into(),
            advice: advice.map(str::to_string),
            extra: Default::default(),
        }
    }

    #[test]
    fn template_carries_prediction_fields() {
        let text = prediction_message(&malaria(Some("Rest and hydrate.")));
        assert!(text.contains("**Malaria**"));
        assert!(text.contains("85%"));
        assert!(text.contains("**Urgency Level:** MODERATE"));
        assert!(text.contains("**Severity:** moderate"));
        assert!(text.contains("Rest and hydrate."));
        assert!(text.contains("2-3 days"));
    }

    #[test]
    fn missing_advice_uses_default_sentence() {
        let text = prediction_message(&malaria(None));
        assert!(text.contains(DEFAULT_ADVICE));
    }

    #[test]
    fn confidence_rounds_to_nearest_percent() {
        let mut p = malaria(None);
        p.confidence = 0.666;
        assert!(prediction_message(&p).contains("(67% confidence)"));
    }

    #[test]
    fn prediction_overrides_oracle_reply() {
        let mut oracle = OracleReply::fallback();
        oracle.message_type = MessageType::FollowUp;
        oracle.follow_up_questions = vec!["How long?".into()];

        let reply = compose_reply(&oracle, Some(&malaria(Some("Rest and hydrate."))));
        assert_eq!(reply.message_type, MessageType::Prediction);
        assert_eq!(reply.confidence, Some(0.85));
        assert_eq!(reply.urgency.as_deref(), Some("moderate"));
        let payload = reply.prediction_data.unwrap();
        assert_eq!(payload["illness"], "Malaria");
        assert_eq!(payload["advice"], "Rest and hydrate.");
    }

    #[test]
    fn without_prediction_oracle_text_passes_through() {
        let mut oracle = OracleReply::fallback();
        oracle.content = "How long have you had the fever?".into();
        oracle.message_type = MessageType::Clarification;

        let reply = compose_reply(&oracle, None);
        assert_eq!(reply.content, "How long have you had the fever?");
        assert_eq!(reply.message_type, MessageType::Clarification);
        assert!(reply.prediction_data.is_none());
        assert!(reply.confidence.is_none());
    }
}
