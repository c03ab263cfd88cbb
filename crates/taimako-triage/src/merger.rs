// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merges per-turn symptom evidence into the persisted conversation context.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use taimako_core::types::{ConversationContext, MessageType, format_timestamp};
use taimako_core::ConversationStage;

/// Union of three symptom lists with exact-string deduplication.
///
/// Order is `current ++ oracle ++ prior`, keeping the first occurrence.
pub fn merge_symptoms(current: &[String], oracle: &[String], prior: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    current
        .iter()
        .chain(oracle)
        .chain(prior)
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Concerns after this turn: a prediction turn appends the predicted illness.
///
/// The illness may come from the prediction oracle or from the symptom
/// oracle's own prediction payload. Only empty entries are dropped; the same
/// illness may appear many times.
pub fn merge_concerns(
    prior: &[String],
    reply_type: MessageType,
    predicted_illness: Option<&str>,
) -> Vec<String> {
    let predicted = match reply_type {
        MessageType::Prediction => predicted_illness.map(str::to_string),
        _ => None,
    };
    prior
        .iter()
        .cloned()
        .chain(predicted)
        .filter(|c| !c.trim().is_empty())
        .collect()
}

/// Everything the merger needs to produce the next context row.
#[derive(Debug)]
pub struct TurnEvidence<'a> {
    pub conversation_id: &'a str,
    pub merged_symptoms: Vec<String>,
    pub prior: Option<&'a ConversationContext>,
    pub oracle_stage: Option<ConversationStage>,
    pub reply_type: MessageType,
    pub predicted_illness: Option<&'a str>,
}

/// Builds the context row to upsert at the end of a turn.
///
/// Stage resolution: the oracle's stage, else the prior stage, else `ongoing`.
pub fn next_context(evidence: TurnEvidence<'_>, now: DateTime<Utc>) -> ConversationContext {
    let prior_concerns = evidence
        .prior
        .map(|c| c.current_concerns.as_slice())
        .unwrap_or_default();
    let conversation_stage = evidence
        .oracle_stage
        .or_else(|| evidence.prior.map(|c| c.conversation_stage))
        .unwrap_or(ConversationStage::Ongoing);

    ConversationContext {
        conversation_id: evidence.conversation_id.to_string(),
        extracted_symptoms: evidence.merged_symptoms,
        current_concerns: merge_concerns(
            prior_concerns,
            evidence.reply_type,
            evidence.predicted_illness,
        ),
        conversation_stage,
        updated_at: format_timestamp(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_keeps_first_occurrence_in_source_order() {
        let merged = merge_symptoms(
            &strings(&["fever", "headache"]),
            &strings(&["headache", "chills"]),
            &strings(&["cough", "fever"]),
        );
        assert_eq!(merged, strings(&["fever", "headache", "chills", "cough"]));
    }

    #[test]
    fn merge_with_empty_prior() {
        let merged = merge_symptoms(&strings(&["rash"]), &[], &[]);
        assert_eq!(merged, strings(&["rash"]));
        assert!(merge_symptoms(&[], &[], &[]).is_empty());
    }

    #[test]
    fn merge_is_case_sensitive() {
        let merged = merge_symptoms(&strings(&["Fever"]), &strings(&["fever"]), &[]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn prediction_turn_appends_illness_and_allows_repeats() {
        let prior = strings(&["Malaria"]);
        let concerns = merge_concerns(&prior, MessageType::Prediction, Some("Malaria"));
        assert_eq!(concerns, strings(&["Malaria", "Malaria"]));
    }

    #[test]
    fn non_prediction_turn_keeps_concerns() {
        let prior = strings(&["Typhoid"]);
        let concerns = merge_concerns(&prior, MessageType::FollowUp, Some("Malaria"));
        assert_eq!(concerns, prior);
    }

    #[test]
    fn empty_concerns_are_dropped() {
        let prior = strings(&["", "Typhoid", "  "]);
        let concerns = merge_concerns(&prior, MessageType::Prediction, Some(""));
        assert_eq!(concerns, strings(&["Typhoid"]));
    }

    #[test]
    fn prediction_turn_without_illness_keeps_concerns() {
        let prior = strings(&["Typhoid"]);
        let concerns = merge_concerns(&prior, MessageType::Prediction, None);
        assert_eq!(concerns, prior);
    }

    #[test]
    fn stage_prefers_oracle_then_prior_then_ongoing() {
        let now = Utc::now();
        let prior = ConversationContext {
            conversation_id: "c-1".into(),
            extracted_symptoms: strings(&["fever"]),
            current_concerns: vec![],
            conversation_stage: ConversationStage::Clarification,
            updated_at: format_timestamp(now),
        };
        let evidence = |oracle_stage, prior| TurnEvidence {
            conversation_id: "c-1",
            merged_symptoms: strings(&["fever"]),
            prior,
            oracle_stage,
            reply_type: MessageType::Text,
            predicted_illness: None,
        };

        let ctx = next_context(evidence(Some(ConversationStage::Prediction), Some(&prior)), now);
        assert_eq!(ctx.conversation_stage, ConversationStage::Prediction);

        let ctx = next_context(evidence(None, Some(&prior)), now);
        assert_eq!(ctx.conversation_stage, ConversationStage::Clarification);

        let ctx = next_context(evidence(None, None), now);
        assert_eq!(ctx.conversation_stage, ConversationStage::Ongoing);
        assert_eq!(ctx.conversation_id, "c-1");
        assert_eq!(ctx.extracted_symptoms, strings(&["fever"]));
    }
}
