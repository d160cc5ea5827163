// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sirbot framework.
//!
//! The reserved `[core]` section is strict (`deny_unknown_fields`). Every
//! other top-level table belongs to the client of the same name and is
//! passed through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sirbot_core::ClientConfig;

/// Top-level Sirbot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SirbotConfig {
    /// Engine settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Framework-wide log level. Takes precedence over `core.loglevel`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<String>,

    /// Client sections keyed by client name.
    #[serde(flatten)]
    pub clients: BTreeMap<String, serde_json::Value>,
}

impl SirbotConfig {
    /// The configuration section for the client called `name`.
    ///
    /// Missing sections yield an empty [`ClientConfig`].
    pub fn client_section(&self, name: &str) -> ClientConfig {
        self.clients
            .get(name)
            .cloned()
            .map(ClientConfig::from_value)
            .unwrap_or_default()
    }

    /// The log level in effect, top-level `loglevel` first.
    pub fn effective_loglevel(&self) -> &str {
        self.loglevel.as_deref().unwrap_or(&self.core.loglevel)
    }
}

/// The reserved `[core]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Plugin modules to load, in order.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Address the HTTP host binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP host binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How long shutdown waits for in-flight message handlers.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            plugins: Vec::new(),
            host: default_host(),
            port: default_port(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_drain_timeout_secs() -> u64 {
    10
}

/// Map a configured log level onto a `tracing` level directive.
///
/// Accepts the `tracing` names plus `warning` and `critical`, in any case.
pub fn tracing_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SirbotConfig::default();
        assert_eq!(config.core.loglevel, "info");
        assert!(config.core.plugins.is_empty());
        assert_eq!(config.core.port, 8080);
        assert_eq!(config.core.drain_timeout_secs, 10);
        assert!(config.clients.is_empty());
    }

    #[test]
    fn missing_client_section_is_empty() {
        let config = SirbotConfig::default();
        assert!(config.client_section("slack").is_empty());
    }

    #[test]
    fn top_level_loglevel_wins() {
        let mut config = SirbotConfig::default();
        assert_eq!(config.effective_loglevel(), "info");
        config.loglevel = Some("debug".into());
        assert_eq!(config.effective_loglevel(), "debug");
    }

    #[test]
    fn tracing_level_accepts_aliases() {
        assert_eq!(tracing_level("DEBUG"), Some("debug"));
        assert_eq!(tracing_level("warning"), Some("warn"));
        assert_eq!(tracing_level("critical"), Some("error"));
        assert_eq!(tracing_level("loud"), None);
    }
}
