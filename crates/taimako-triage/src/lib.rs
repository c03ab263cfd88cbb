// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-state and escalation logic for the Taimako triage service.
//!
//! A chat turn flows through [`pipeline::TriagePipeline`]: resolve the
//! conversation, load history and context, save the user turn, extract
//! symptoms and consult the symptom oracle, merge evidence, decide
//! escalation, optionally predict, compose the reply, then persist it.

pub mod composer;
pub mod escalation;
pub mod extractor;
pub mod merger;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod title;

pub use composer::{compose_reply, prediction_message};
pub use escalation::{EscalationInput, EscalationPolicy, should_escalate};
pub use extractor::extract_symptoms;
pub use merger::{merge_concerns, merge_symptoms, next_context};
pub use pipeline::TriagePipeline;
pub use session::{Resolution, SessionManager};
pub use title::{generate_title, generate_title_at};
