// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taimako serve` command implementation.
//!
//! Wires SQLite storage, the Groq symptom oracle, the optional prediction
//! oracle and ledger relay into a triage pipeline, then serves it over HTTP
//! until SIGINT or SIGTERM.

use std::sync::Arc;

use taimako_config::TaimakoConfig;
use taimako_core::{ConversationStore, PluginAdapter, TaimakoError};
use taimako_gateway::{GatewayState, ServerConfig, start_server};
use taimako_groq::GroqOracle;
use taimako_ledger::HttpLedger;
use taimako_predict::HttpPredictionOracle;
use taimako_storage::SqliteStorage;
use taimako_triage::TriagePipeline;
use tracing::{info, warn};

use crate::shutdown;

/// Initialized collaborators shared by `serve` and `chat`.
pub struct Services {
    pub pipeline: Arc<TriagePipeline>,
    pub storage: Arc<SqliteStorage>,
}

impl Services {
    /// Flushes storage; errors are logged since the process is exiting anyway.
    pub async fn shutdown(&self) {
        if let Err(e) = self.storage.shutdown().await {
            warn!(error = %e, "storage shutdown failed");
        }
    }
}

/// Builds the pipeline from configuration.
///
/// Prediction and ledger collaborators are attached only when configured.
pub async fn build_services(config: &TaimakoConfig) -> Result<Services, TaimakoError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let oracle = Arc::new(GroqOracle::new(&config.groq)?);
    let mut pipeline = TriagePipeline::new(storage.clone(), oracle, config);

    match HttpPredictionOracle::from_config(&config.prediction)? {
        Some(prediction) => pipeline = pipeline.with_prediction(Arc::new(prediction)),
        None => info!("no prediction endpoint configured, escalation disabled"),
    }
    if let Some(ledger) = HttpLedger::from_config(&config.ledger)? {
        pipeline = pipeline.with_ledger(Arc::new(ledger));
    }

    Ok(Services {
        pipeline: Arc::new(pipeline),
        storage,
    })
}

/// Runs the `taimako serve` command.
pub async fn run_serve(config: TaimakoConfig) -> Result<(), TaimakoError> {
    init_tracing(&config.service.log_level);
    info!(name = %config.service.name, "starting taimako serve");

    let services = build_services(&config).await?;
    let state = GatewayState::new(
        services.pipeline.clone(),
        config.gateway.bearer_token.clone(),
    );
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = shutdown::install_signal_handler();
    let result = start_server(&server_config, state, async move {
        cancel.cancelled().await;
    })
    .await;

    services.shutdown().await;
    info!("taimako serve shutdown complete");
    result
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taimako={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}
