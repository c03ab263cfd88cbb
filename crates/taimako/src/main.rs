// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Taimako - a symptom-triage chat service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod serve;
mod show_config;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Taimako - a symptom-triage chat service.
#[derive(Parser, Debug)]
#[command(name = "taimako", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Run a single chat turn and print the JSON response.
    Chat {
        /// Message text.
        message: String,
        /// User identifier.
        #[arg(long, default_value = "cli-user")]
        user: String,
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => taimako_config::load_and_validate_path(path),
        None => taimako_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            taimako_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Chat {
            message,
            user,
            conversation,
        }) => chat::run_chat(config, user, message, conversation).await,
        Some(Commands::Config) => show_config::run_show_config(&config),
        None => {
            println!("taimako: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn chat_subcommand_parses() {
        let cli = Cli::parse_from(["taimako", "chat", "I have a fever", "--user", "u-7"]);
        match cli.command {
            Some(Commands::Chat {
                message,
                user,
                conversation,
            }) => {
                assert_eq!(message, "I have a fever");
                assert_eq!(user, "u-7");
                assert!(conversation.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["taimako", "serve", "--config", "/tmp/t.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }
}
