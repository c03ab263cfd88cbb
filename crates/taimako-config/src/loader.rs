// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./taimako.toml` > `~/.config/taimako/taimako.toml` > `/etc/taimako/taimako.toml`
//! with environment variable overrides via `TAIMAKO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::{SECTIONS, TaimakoConfig};

/// System-wide config file path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/taimako/taimako.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "taimako.toml";

/// Per-user config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taimako").join("taimako.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/taimako/taimako.toml` (system-wide)
/// 3. `~/.config/taimako/taimako.toml` (user XDG config)
/// 4. `./taimako.toml` (local directory)
/// 5. `TAIMAKO_*` environment variables
pub fn load_config() -> Result<TaimakoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TaimakoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TaimakoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TaimakoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TaimakoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TaimakoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `TAIMAKO_GROQ_API_KEY` to `groq.api_key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys like `reuse_window_secs` keep their underscores.
pub fn env_provider() -> Env {
    Env::prefixed("TAIMAKO_").map(|key| map_env_key(key.as_str()).into())
}

/// Environment variable that overrides the dotted config `path`.
pub fn env_var_name(path: &[String]) -> String {
    format!("TAIMAKO_{}", path.join("_").to_uppercase())
}

fn map_env_key(key: &str) -> String {
    for (section, _) in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
