// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the system and user instructions sent to the symptom oracle.

use std::fmt::Write;

use taimako_config::model::TriageConfig;
use taimako_core::types::{
    ConversationContext, Location, Message, OracleRequest, UserProfile,
};

const NOT_SPECIFIED: &str = "not specified";

const DECISION_RULES: &str = r#"CRITICAL DECISION RULES:
1. ADVICE vs PREDICTION:
   - "how do I fix", "what should I do", "advice", "help" -> give ADVICE (message_type: "text")
   - "what's wrong", "what do I have" -> make a PREDICTION (message_type: "prediction")
   - "is this serious" -> make a PREDICTION with an urgency assessment
2. SYMPTOM EXTRACTION: extract ALL mentioned symptoms as normalized names:
   - "upper back aches" -> ["upper_back_pain", "back_ache"]
   - "sitting too long" -> ["poor_posture", "prolonged_sitting"]
   - "left side" -> ["left_side_pain"]
3. PREDICTION CRITERIA: only when the user asks for a diagnosis or describes
   at least 2-3 clear symptoms, and only with confidence above 70%. For back
   pain with prolonged sitting prefer posture advice.
4. ADVICE CRITERIA: requests for help, lifestyle, prevention, and general
   guidance; posture and ergonomics for back or neck pain from desk work.
5. LANGUAGE: respond in clear, professional English unless the user asks
   for Nigerian Pidgin.
6. ACCURACY: if confidence is 70% or lower, give general health advice
   instead of a prediction."#;

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT:
Return ONLY valid JSON in this exact format:
{
  "content": "Your response message",
  "message_type": "text|prediction|follow_up|clarification",
  "extracted_symptoms": ["symptom1", "symptom2"],
  "conversation_stage": "initial|symptom_collection|clarification|prediction|follow_up",
  "needs_clarification": true|false,
  "should_predict": true|false,
  "follow_up_questions": ["question1"],
  "prediction_data": {
    "illness": "condition name",
    "confidence": 0.85,
    "urgency": "low|moderate|high|critical",
    "severity": "mild|moderate|severe|critical",
    "advice": "detailed advice",
    "prevention_tips": ["tip1", "tip2"],
    "follow_up_advice": ["advice1", "advice2"]
  }
}"#;

const USER_INSTRUCTIONS: &str = r#"ANALYZE THE USER'S INTENT:
- Asking "how do I fix", "what should I do", "advice", "help"? -> give ADVICE (message_type: "text")
- Asking "what's wrong", "what do I have", "diagnosis"? -> make a PREDICTION (message_type: "prediction")
- Describing symptoms without asking for a diagnosis? -> give ADVICE (message_type: "text")

EXTRACT SYMPTOMS ACCURATELY:
- Look for ALL health-related terms in the message
- Convert to standard symptom names
- Include location, severity, and duration if mentioned"#;

/// Everything known about the turn when the oracle is consulted.
#[derive(Debug)]
pub struct PromptInput<'a> {
    pub assistant_name: &'a str,
    pub message: &'a str,
    /// Conversation history before this turn, oldest first.
    pub history: &'a [Message],
    pub context: Option<&'a ConversationContext>,
    pub profile: Option<&'a UserProfile>,
    pub location: Option<&'a Location>,
}

/// Assembles oracle prompts using the configured history windows.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    history_window: usize,
    transcript_window: usize,
    default_location: String,
}

impl PromptBuilder {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            history_window: config.history_window,
            transcript_window: config.transcript_window,
            default_location: config.default_location.clone(),
        }
    }

    pub fn build(&self, input: &PromptInput<'_>) -> OracleRequest {
        OracleRequest {
            system_prompt: self.system_prompt(input),
            user_prompt: self.user_prompt(input),
        }
    }

    fn system_prompt(&self, input: &PromptInput<'_>) -> String {
        let mut out = format!(
            "You are {name}, a Nigerian medical AI assistant specializing in conversational \
             health consultations. You provide empathetic, culturally-sensitive health advice.\n\n",
            name = input.assistant_name
        );

        out.push_str("CONVERSATION CONTEXT:\n");
        if !input.history.is_empty() {
            out.push_str("CONVERSATION HISTORY:\n");
            out.push_str(&transcript(input.history, self.history_window));
            out.push_str("\n\n");
        }
        let (symptoms, concerns, stage) = context_fields(input.context, "None");
        let _ = writeln!(out, "EXTRACTED SYMPTOMS: {symptoms}");
        let _ = writeln!(out, "CURRENT CONCERNS: {concerns}");
        let _ = writeln!(out, "CONVERSATION STAGE: {stage}\n");

        let _ = writeln!(out, "CURRENT CONVERSATION STAGE: {stage}");
        let _ = writeln!(out, "MESSAGES IN CONVERSATION: {}\n", input.history.len());

        out.push_str(DECISION_RULES);
        out.push_str("\n\n");
        out.push_str(RESPONSE_FORMAT);
        out
    }

    fn user_prompt(&self, input: &PromptInput<'_>) -> String {
        let field = |value: Option<&String>| {
            value
                .map(String::as_str)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(NOT_SPECIFIED)
                .to_string()
        };
        let profile = input.profile;

        let mut out = format!("User message: \"{}\"\n\n", input.message);
        out.push_str("User Profile:\n");
        let _ = writeln!(out, "- Age: {}", field(profile.and_then(|p| p.age_group.as_ref())));
        let _ = writeln!(out, "- Gender: {}", field(profile.and_then(|p| p.gender.as_ref())));
        let _ = writeln!(
            out,
            "- Occupation: {}",
            field(profile.and_then(|p| p.occupation.as_ref()))
        );
        let _ = writeln!(out, "- Location: {}\n", self.location_label(input.location));

        let _ = writeln!(out, "Previous conversation ({} messages):", input.history.len());
        out.push_str(&transcript(input.history, self.transcript_window));
        out.push_str("\n\n");

        let (symptoms, concerns, stage) = context_fields(input.context, "None yet");
        out.push_str("Current context:\n");
        let _ = writeln!(out, "- Extracted symptoms: {symptoms}");
        let _ = writeln!(out, "- Current concerns: {concerns}");
        let _ = writeln!(out, "- Conversation stage: {stage}\n");

        out.push_str(USER_INSTRUCTIONS);
        let _ = write!(out, "\n\nRespond as {}. Be helpful and accurate!", input.assistant_name);
        out
    }

    fn location_label(&self, location: Option<&Location>) -> String {
        let parts: Vec<&str> = location
            .into_iter()
            .flat_map(|l| [l.state_code.as_deref(), l.lga_code.as_deref()])
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            self.default_location.clone()
        } else {
            parts.join(", ")
        }
    }
}

/// The last `window` messages as `role: content` lines.
fn transcript(history: &[Message], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn context_fields(context: Option<&ConversationContext>, empty: &str) -> (String, String, String) {
    let join = |items: Option<&Vec<String>>| match items {
        Some(list) if !list.is_empty() => list.join(", "),
        _ => empty.to_string(),
    };
    (
        join(context.map(|c| &c.extracted_symptoms)),
        join(context.map(|c| &c.current_concerns)),
        context
            .map(|c| c.conversation_stage.to_string())
            .unwrap_or_else(|| "initial".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use taimako_core::types::format_timestamp;
    use taimako_core::{ConversationStage, MessageType, Role};

    fn message(i: usize) -> Message {
        Message {
            id: format!("m-{i}"),
            conversation_id: "c-1".into(),
            user_id: "u-1".into(),
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            content: format!("turn {i}"),
            message_type: MessageType::Text,
            prediction_data: None,
            follow_up_questions: vec![],
            created_at: format_timestamp(chrono::Utc::now()),
        }
    }

    fn builder() -> PromptBuilder {
        PromptBuilder::new(&TriageConfig::default())
    }

    fn input<'a>(history: &'a [Message], context: Option<&'a ConversationContext>) -> PromptInput<'a> {
        PromptInput {
            assistant_name: "Taimako",
            message: "I have a fever",
            history,
            context,
            profile: None,
            location: None,
        }
    }

    #[test]
    fn system_prompt_embeds_last_ten_messages() {
        let history: Vec<Message> = (0..12).map(message).collect();
        let req = builder().build(&input(&history, None));
        assert!(!req.system_prompt.contains("turn 1\n"));
        assert!(req.system_prompt.contains("assistant: turn 3"));
        assert!(req.system_prompt.contains("assistant: turn 11"));
        assert!(req.system_prompt.contains("MESSAGES IN CONVERSATION: 12"));
        assert!(req.system_prompt.contains("\"needs_clarification\""));
    }

    #[test]
    fn user_prompt_quotes_last_five_messages() {
        let history: Vec<Message> = (0..8).map(message).collect();
        let req = builder().build(&input(&history, None));
        assert!(req.user_prompt.starts_with("User message: \"I have a fever\""));
        assert!(req.user_prompt.contains("Previous conversation (8 messages):"));
        assert!(!req.user_prompt.contains("turn 2"));
        assert!(req.user_prompt.contains("user: turn 4"));
        assert!(req.user_prompt.contains("assistant: turn 7"));
    }

    #[test]
    fn empty_context_uses_placeholders() {
        let req = builder().build(&input(&[], None));
        assert!(req.system_prompt.contains("EXTRACTED SYMPTOMS: None"));
        assert!(req.system_prompt.contains("CURRENT CONVERSATION STAGE: initial"));
        assert!(req.user_prompt.contains("- Extracted symptoms: None yet"));
        assert!(req.user_prompt.contains("- Age: not specified"));
        assert!(req.user_prompt.contains("- Location: Nigeria"));
        assert!(req.user_prompt.ends_with("Respond as Taimako. Be helpful and accurate!"));
    }

    #[test]
    fn context_profile_and_location_are_rendered() {
        let context = ConversationContext {
            conversation_id: "c-1".into(),
            extracted_symptoms: vec!["fever".into(), "chills".into()],
            current_concerns: vec!["Malaria".into()],
            conversation_stage: ConversationStage::SymptomCollection,
            updated_at: format_timestamp(chrono::Utc::now()),
        };
        let profile = UserProfile {
            age_group: Some("25-34".into()),
            gender: Some("female".into()),
            ..UserProfile::default()
        };
        let location = Location {
            state_code: Some("LA".into()),
            lga_code: Some("IKJ".into()),
        };
        let mut turn = input(&[], Some(&context));
        turn.profile = Some(&profile);
        turn.location = Some(&location);

        let req = builder().build(&turn);
        assert!(req.system_prompt.contains("EXTRACTED SYMPTOMS: fever, chills"));
        assert!(req.system_prompt.contains("CURRENT CONCERNS: Malaria"));
        assert!(req.system_prompt.contains("CURRENT CONVERSATION STAGE: symptom_collection"));
        assert!(req.user_prompt.contains("- Age: 25-34"));
        assert!(req.user_prompt.contains("- Gender: female"));
        assert!(req.user_prompt.contains("- Occupation: not specified"));
        assert!(req.user_prompt.contains("- Location: LA, IKJ"));
    }
}
