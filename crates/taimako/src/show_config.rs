// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taimako config` command implementation.

use taimako_config::TaimakoConfig;
use taimako_core::TaimakoError;

const REDACTED: &str = "[redacted]";

/// Prints the effective configuration as TOML with secrets redacted.
pub fn run_show_config(config: &TaimakoConfig) -> Result<(), TaimakoError> {
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &TaimakoConfig) -> Result<String, TaimakoError> {
    toml::to_string_pretty(&redacted(config))
        .map_err(|e| TaimakoError::Config(format!("failed to render configuration: {e}")))
}

/// A copy of `config` with every credential replaced.
fn redacted(config: &TaimakoConfig) -> TaimakoConfig {
    let hide = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_string());
    let mut shown = config.clone();
    shown.gateway.bearer_token = hide(&config.gateway.bearer_token);
    shown.groq.api_key = hide(&config.groq.api_key);
    shown.prediction.api_key = hide(&config.prediction.api_key);
    shown.ledger.api_key = hide(&config.ledger.api_key);
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_redacted() {
        let mut config = TaimakoConfig::default();
        config.groq.api_key = Some("gsk-live-123".into());
        config.gateway.bearer_token = Some("tok".into());
        config.ledger.api_key = Some("ledger-key".into());

        let out = render(&config).unwrap();
        assert!(!out.contains("gsk-live-123"));
        assert!(!out.contains("ledger-key"));
        assert!(out.contains(REDACTED));
        assert!(out.contains("[triage]"));
    }

    #[test]
    fn absent_secrets_stay_absent() {
        let out = render(&TaimakoConfig::default()).unwrap();
        assert!(!out.contains(REDACTED));
    }

    #[test]
    fn rendered_config_loads_back() {
        let out = render(&TaimakoConfig::default()).unwrap();
        let back = taimako_config::load_and_validate_str(&out).unwrap();
        assert_eq!(back.gateway.port, 3000);
    }
}
