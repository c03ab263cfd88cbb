// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Taimako triage service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Every section of [`TaimakoConfig`] with the keys it accepts.
///
/// Drives env-var mapping and misplaced-key diagnostics; must list every
/// field of the section structs below.
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("service", &["name", "log_level"]),
    ("gateway", &["host", "port", "bearer_token"]),
    (
        "groq",
        &["api_key", "endpoint", "model", "temperature", "max_tokens", "timeout_secs"],
    ),
    ("prediction", &["endpoint", "api_key", "timeout_secs"]),
    (
        "ledger",
        &[
            "enabled",
            "endpoint",
            "api_key",
            "network",
            "app_name",
            "app_version",
            "timeout_secs",
        ],
    ),
    ("storage", &["database_path", "wal_mode"]),
    (
        "triage",
        &[
            "reuse_window_secs",
            "history_window",
            "transcript_window",
            "escalation_message_threshold",
            "escalation_symptom_threshold",
            "max_follow_up_questions",
            "default_location",
        ],
    ),
];

/// Sections other than `except` that accept `key`.
pub fn sections_with_key(key: &str, except: Option<&str>) -> Vec<&'static str> {
    SECTIONS
        .iter()
        .filter(|(section, keys)| Some(*section) != except && keys.contains(&key))
        .map(|(section, _)| *section)
        .collect()
}

/// Top-level Taimako configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaimakoConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Symptom oracle (Groq chat completions) settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Prediction oracle settings.
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Verification ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation and escalation tuning.
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Assistant name used in prompts and logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "Taimako".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1/chat`. `None` leaves the route open.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Groq (OpenAI-compatible) chat completions configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// API key. `None` requires the `GROQ_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions endpoint.
    #[serde(default = "default_groq_endpoint")]
    pub endpoint: String,

    /// Model identifier.
    #[serde(default = "default_groq_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_groq_timeout")]
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_groq_endpoint(),
            model: default_groq_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_groq_timeout(),
        }
    }
}

fn default_groq_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_groq_timeout() -> u64 {
    60
}

/// Prediction oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionConfig {
    /// URL of the predict-illness procedure. `None` disables escalation.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer credential for the procedure. `None` falls back to
    /// `TAIMAKO_PREDICTION_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_prediction_timeout")]
    pub timeout_secs: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_prediction_timeout(),
        }
    }
}

fn default_prediction_timeout() -> u64 {
    30
}

/// Verification ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Whether prediction fingerprints are submitted at all.
    #[serde(default)]
    pub enabled: bool,

    /// Ledger relay URL accepting one record per request.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer credential for the relay.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Network name used for explorer links (`testnet` or `mainnet`).
    #[serde(default = "default_network")]
    pub network: String,

    /// Application tag written into each record.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Application version written into each record.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Request timeout in seconds.
    #[serde(default = "default_ledger_timeout")]
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            network: default_network(),
            app_name: default_app_name(),
            app_version: default_app_version(),
            timeout_secs: default_ledger_timeout(),
        }
    }
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_app_name() -> String {
    "Taimako".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_ledger_timeout() -> u64 {
    15
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("taimako").join("taimako.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("taimako.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Conversation reuse, history windows, and escalation thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    /// How long an empty conversation stays eligible for reuse.
    #[serde(default = "default_reuse_window_secs")]
    pub reuse_window_secs: u64,

    /// Messages embedded in the oracle's system instruction.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Messages quoted verbatim in the oracle's user instruction.
    #[serde(default = "default_transcript_window")]
    pub transcript_window: usize,

    /// Total messages at which a turn always escalates.
    #[serde(default = "default_escalation_message_threshold")]
    pub escalation_message_threshold: usize,

    /// Merged symptom count at which a turn always escalates.
    #[serde(default = "default_escalation_symptom_threshold")]
    pub escalation_symptom_threshold: usize,

    /// Follow-up questions kept from the oracle reply.
    #[serde(default = "default_max_follow_up_questions")]
    pub max_follow_up_questions: usize,

    /// Location shown to the oracle when the request carries none.
    #[serde(default = "default_location")]
    pub default_location: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            reuse_window_secs: default_reuse_window_secs(),
            history_window: default_history_window(),
            transcript_window: default_transcript_window(),
            escalation_message_threshold: default_escalation_message_threshold(),
            escalation_symptom_threshold: default_escalation_symptom_threshold(),
            max_follow_up_questions: default_max_follow_up_questions(),
            default_location: default_location(),
        }
    }
}

fn default_reuse_window_secs() -> u64 {
    300
}

fn default_history_window() -> usize {
    10
}

fn default_transcript_window() -> usize {
    5
}

fn default_escalation_message_threshold() -> usize {
    4
}

fn default_escalation_symptom_threshold() -> usize {
    3
}

fn default_max_follow_up_questions() -> usize {
    1
}

fn default_location() -> String {
    "Nigeria".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_defaults_match_escalation_rules() {
        let triage = TriageConfig::default();
        assert_eq!(triage.reuse_window_secs, 300);
        assert_eq!(triage.history_window, 10);
        assert_eq!(triage.transcript_window, 5);
        assert_eq!(triage.escalation_message_threshold, 4);
        assert_eq!(triage.escalation_symptom_threshold, 3);
        assert_eq!(triage.max_follow_up_questions, 1);
    }

    #[test]
    fn ledger_is_disabled_by_default() {
        let ledger = LedgerConfig::default();
        assert!(!ledger.enabled);
        assert!(ledger.endpoint.is_none());
        assert_eq!(ledger.network, "testnet");
    }

    #[test]
    fn section_table_covers_every_serialized_key() {
        let mut config = TaimakoConfig::default();
        config.gateway.bearer_token = Some("t".into());
        config.groq.api_key = Some("k".into());
        config.prediction.endpoint = Some("https://p.example".into());
        config.prediction.api_key = Some("k".into());
        config.ledger.endpoint = Some("https://l.example".into());
        config.ledger.api_key = Some("k".into());

        let value = toml::Value::try_from(&config).unwrap();
        let root = value.as_table().unwrap();
        assert_eq!(root.len(), SECTIONS.len());
        for (section, keys) in SECTIONS {
            let table = root[*section].as_table().unwrap();
            let mut actual: Vec<&str> = table.keys().map(String::as_str).collect();
            let mut listed = keys.to_vec();
            actual.sort_unstable();
            listed.sort_unstable();
            assert_eq!(actual, listed, "section [{section}]");
        }
    }

    #[test]
    fn shared_keys_resolve_to_every_owning_section() {
        assert_eq!(
            sections_with_key("endpoint", None),
            vec!["groq", "prediction", "ledger"]
        );
        assert_eq!(sections_with_key("endpoint", Some("groq")), vec!["prediction", "ledger"]);
        assert_eq!(sections_with_key("reuse_window_secs", None), vec!["triage"]);
        assert!(sections_with_key("modle", None).is_empty());
    }

    #[test]
    fn default_database_path_names_taimako_db() {
        let storage = StorageConfig::default();
        assert!(storage.database_path.ends_with("taimako.db"));
        assert!(storage.wal_mode);
    }
}
