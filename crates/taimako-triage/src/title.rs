// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short human-readable conversation titles derived from the first message.

use chrono::{DateTime, Local, TimeZone};

/// Symptom categories and their keywords, in match order.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("fever", &["fever", "hot body", "temperature"]),
    ("headache", &["headache", "head pain", "migraine"]),
    ("cough", &["cough", "coughing"]),
    ("cold", &["cold", "flu", "runny nose"]),
    ("malaria", &["malaria"]),
    ("typhoid", &["typhoid"]),
    ("stomach", &["stomach", "belly", "abdominal"]),
    ("chest", &["chest pain", "chest"]),
    ("body pain", &["body pain", "body ache", "muscle pain"]),
    ("diarrhea", &["diarrhea", "stooling", "running stomach"]),
    ("vomiting", &["vomit", "vomiting", "throwing up"]),
    ("dizziness", &["dizzy", "dizziness"]),
    ("weakness", &["weak", "weakness", "tired", "fatigue"]),
];

/// Categories preferred when three or more match, in priority order.
const IMPORTANT: &[&str] = &["fever", "chest", "headache", "malaria", "typhoid"];

/// Title for `text`, timestamping the fallback with the local clock.
pub fn generate_title(text: &str) -> String {
    generate_title_at(text, Local::now())
}

/// Title for `text`; `now` is only used for the no-match fallback.
pub fn generate_title_at<Tz>(text: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let lower = text.to_lowercase();
    let matched: Vec<&str> = CATEGORIES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .collect();

    match matched.as_slice() {
        [] => format!("Health Chat - {}", now.format("%I:%M %p")),
        [only] => format!("{} Issue", capitalize_words(only)),
        [first, second] => format!("{} & {}", capitalize_words(first), capitalize_words(second)),
        _ => {
            let (first, second) = pick_pair(&matched);
            format!("{} & {}", capitalize_words(first), capitalize_words(second))
        }
    }
}

/// Chooses two of three or more matched categories.
fn pick_pair<'a>(matched: &[&'a str]) -> (&'a str, &'a str) {
    let important: Vec<&'a str> = IMPORTANT
        .iter()
        .filter_map(|i| matched.iter().find(|m| *m == i).copied())
        .collect();

    match important.as_slice() {
        [] => (matched[0], matched[1]),
        [only] => {
            let other = matched.iter().find(|m| *m != only).copied().unwrap_or("other");
            (only, other)
        }
        [first, second, ..] => (first, second),
    }
}

/// Upper-cases the first letter of each space-separated word, leaving the rest.
fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at_nine_oh_five() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 21, 5, 0).unwrap()
    }

    #[test]
    fn two_categories_join_in_match_order() {
        assert_eq!(generate_title("I have fever and headache"), "Fever & Headache");
    }

    #[test]
    fn no_match_falls_back_to_timestamped_title() {
        let title = generate_title_at("I feel generally unwell", at_nine_oh_five());
        assert_eq!(title, "Health Chat - 09:05 PM");

        let live = generate_title("I feel generally unwell");
        let re = regex::Regex::new(r"^Health Chat - \d{2}:\d{2} (AM|PM)$").unwrap();
        assert!(re.is_match(&live), "{live}");
    }

    #[test]
    fn important_categories_win_in_priority_order() {
        assert_eq!(generate_title("malaria symptoms, fever, chest pain"), "Fever & Chest");
    }

    #[test]
    fn single_category_gets_issue_suffix() {
        assert_eq!(generate_title("My belly has been hurting"), "Stomach Issue");
        assert_eq!(generate_title("terrible body ache"), "Body Pain Issue");
    }

    #[test]
    fn one_important_category_is_padded_with_first_other() {
        // cough, cold, typhoid: only typhoid is important.
        assert_eq!(generate_title("cough, flu and typhoid"), "Typhoid & Cough");
    }

    #[test]
    fn no_important_category_uses_first_two_matches() {
        assert_eq!(generate_title("dizzy, vomiting and diarrhea"), "Diarrhea & Vomiting");
    }

    #[test]
    fn capitalization_only_touches_first_letters() {
        assert_eq!(capitalize_words("body pain"), "Body Pain");
        assert_eq!(capitalize_words("hIV test"), "HIV Test");
        assert_eq!(capitalize_words(""), "");
    }
}
