// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based symptom extraction from free text.
//!
//! Two passes: case-insensitive substring containment against a fixed
//! vocabulary (in vocabulary order), then compound-phrase rules in priority
//! order. A rule token is appended only when not already present.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Vocabulary matched by plain substring containment.
pub const SYMPTOM_VOCABULARY: &[&str] = &[
    // General
    "fever",
    "headache",
    "cough",
    "dry cough",
    "fatigue",
    "nausea",
    "vomiting",
    "diarrhea",
    "abdominal pain",
    "chest pain",
    "shortness of breath",
    "dizziness",
    "muscle pain",
    "joint pain",
    "sore throat",
    "runny nose",
    "sneezing",
    "congestion",
    "chills",
    "sweating",
    "weakness",
    "loss of appetite",
    "weight loss",
    "blurred vision",
    "rash",
    "swelling",
    "redness",
    "itchiness",
    "burning sensation",
    "frequent urination",
    "blood in urine",
    "pale skin",
    "jaundice",
    "body ache",
    "body pain",
    "tired",
    "exhausted",
    "sick",
    "unwell",
    "pain",
    "cold",
    "flu",
    "malaria",
    "typhoid",
    "migraine",
    "chest discomfort",
    // Back and spine
    "back pain",
    "back ache",
    "upper back",
    "lower back",
    "middle back",
    "spine pain",
    "spinal pain",
    "backache",
    "back stiffness",
    "neck pain",
    "shoulder pain",
    "shoulder ache",
    // Posture and lifestyle
    "poor posture",
    "sitting too long",
    "prolonged sitting",
    "bad posture",
    "desk work",
    "computer work",
    "office work",
    // Laterality
    "left side",
    "right side",
    "left side pain",
    "right side pain",
    "upper left",
    "upper right",
    "lower left",
    "lower right",
    // Severity
    "badly",
    "severely",
    "mildly",
    "moderately",
    "intensely",
    "sharp pain",
    "dull pain",
    "throbbing pain",
    "stabbing pain",
    "burning pain",
    "aching pain",
    "stiffness",
    "tension",
];

/// Compound-phrase rules, evaluated in this order after the vocabulary pass.
static COMPOUND_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)upper back.*ache|back.*ache.*upper").unwrap(),
            "upper_back_pain",
        ),
        (
            Regex::new(r"(?i)left side.*pain|pain.*left side").unwrap(),
            "left_side_pain",
        ),
        (
            Regex::new(r"(?i)sitting.*too long|too long.*sitting").unwrap(),
            "prolonged_sitting",
        ),
        (
            Regex::new(r"(?i)poor.*posture|bad.*posture").unwrap(),
            "poor_posture",
        ),
        (Regex::new(r"(?i)back.*pain|back.*ache").unwrap(), "back_pain"),
    ]
});

/// Extracts normalized symptom tokens from `text`.
///
/// Pure and deterministic; text with no matches yields an empty list.
pub fn extract_symptoms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = SYMPTOM_VOCABULARY
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect();

    for (pattern, token) in COMPOUND_RULES.iter() {
        if pattern.is_match(text) && !found.iter().any(|f| f == token) {
            found.push(token.to_string());
        }
    }

    debug!(count = found.len(), symptoms = ?found, "extracted symptoms");
    found
}
