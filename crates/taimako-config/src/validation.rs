// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, endpoint URLs, and non-zero windows.

use crate::diagnostic::ConfigError;
use crate::model::TaimakoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TaimakoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.to_lowercase().as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        fail("gateway.bearer_token must not be empty when set".to_string());
    }

    check_url(&mut fail, "groq.endpoint", &config.groq.endpoint);
    if !(0.0..=2.0).contains(&config.groq.temperature) {
        fail(format!(
            "groq.temperature must be between 0.0 and 2.0, got {}",
            config.groq.temperature
        ));
    }
    if config.groq.max_tokens == 0 {
        fail("groq.max_tokens must be at least 1".to_string());
    }

    if let Some(endpoint) = &config.prediction.endpoint {
        check_url(&mut fail, "prediction.endpoint", endpoint);
    }

    if config.ledger.enabled {
        match &config.ledger.endpoint {
            Some(endpoint) => check_url(&mut fail, "ledger.endpoint", endpoint),
            None => fail("ledger.endpoint is required when ledger.enabled = true".to_string()),
        }
    }
    if !matches!(config.ledger.network.as_str(), "testnet" | "mainnet") {
        fail(format!(
            "ledger.network must be `testnet` or `mainnet`, got `{}`",
            config.ledger.network
        ));
    }

    for (name, secs) in [
        ("groq.timeout_secs", config.groq.timeout_secs),
        ("prediction.timeout_secs", config.prediction.timeout_secs),
        ("ledger.timeout_secs", config.ledger.timeout_secs),
    ] {
        if secs == 0 {
            fail(format!("{name} must be at least 1"));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let triage = &config.triage;
    for (name, value) in [
        ("triage.history_window", triage.history_window),
        ("triage.transcript_window", triage.transcript_window),
        (
            "triage.escalation_message_threshold",
            triage.escalation_message_threshold,
        ),
        (
            "triage.escalation_symptom_threshold",
            triage.escalation_symptom_threshold,
        ),
    ] {
        if value == 0 {
            fail(format!("{name} must be at least 1"));
        }
    }
    if triage.default_location.trim().is_empty() {
        fail("triage.default_location must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(fail: &mut impl FnMut(String), name: &str, value: &str) {
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        fail(format!("{name} `{value}` must be an http(s) URL"));
    }
}
