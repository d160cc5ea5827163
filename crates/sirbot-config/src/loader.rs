// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./sirbot.toml` > `~/.config/sirbot/sirbot.toml` >
//! `/etc/sirbot/sirbot.toml`, with `SIRBOT_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SirbotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sirbot/sirbot.toml`
/// 3. `~/.config/sirbot/sirbot.toml`
/// 4. `./sirbot.toml`
/// 5. `SIRBOT_*` environment variables
pub fn load_config() -> Result<SirbotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SirbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SirbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SirbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SirbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SirbotConfig::default()))
        .merge(Toml::file("/etc/sirbot/sirbot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sirbot/sirbot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sirbot.toml"))
        .merge(env_provider())
}

/// Environment provider for `SIRBOT_CORE_*` and `SIRBOT_LOGLEVEL`.
///
/// Only the core section is overridable from the environment; client
/// sections come from files. `Env::map()` is used instead of `split("_")`
/// so `SIRBOT_CORE_DRAIN_TIMEOUT_SECS` maps to `core.drain_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("SIRBOT_")
        .filter(|key| {
            let key = key.as_str().to_ascii_lowercase();
            key.starts_with("core_") || key == "loglevel"
        })
        .map(|key| {
            key.as_str()
                .to_ascii_lowercase()
                .replacen("core_", "core.", 1)
                .into()
        })
}
