// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides whether a turn hands off to the prediction oracle.

use taimako_config::model::TriageConfig;

/// Signals available when deciding escalation for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationInput {
    /// Messages in the conversation including the just-saved user message.
    pub message_count: usize,
    /// Length of the merged symptom list.
    pub symptom_count: usize,
    pub should_predict: bool,
    /// `None` when the oracle omitted the flag.
    pub needs_clarification: Option<bool>,
}

/// Threshold-based escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub message_threshold: usize,
    pub symptom_threshold: usize,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from_config(&TriageConfig::default())
    }
}

impl EscalationPolicy {
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            message_threshold: config.escalation_message_threshold,
            symptom_threshold: config.escalation_symptom_threshold,
        }
    }

    /// Escalate when at least one symptom exists and any trigger fires.
    ///
    /// An absent `needs_clarification` counts as "not needed".
    pub fn should_escalate(&self, input: &EscalationInput) -> bool {
        if input.symptom_count == 0 {
            return false;
        }
        input.should_predict
            || input.message_count >= self.message_threshold
            || input.symptom_count >= self.symptom_threshold
            || !input.needs_clarification.unwrap_or(false)
    }
}

/// [`EscalationPolicy::should_escalate`] with the default thresholds.
pub fn should_escalate(input: &EscalationInput) -> bool {
    EscalationPolicy::default().should_escalate(input)
}
