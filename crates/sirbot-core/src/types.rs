// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the plugin registry, clients, and the engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SirbotError;

/// The statically known extension points a plugin may implement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Client,
    Dispatcher,
}

/// Lifecycle of a supervised client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    /// Returned by a provider, not yet configured.
    Registered,
    /// `configure` succeeded; waiting for host startup.
    Configured,
    /// Connection task spawned, `connect` not yet parked.
    Connecting,
    /// `connect` is running.
    Connected,
    /// `configure` or `connect` failed, or `connect` returned early.
    Failed,
    /// Cancellation requested at shutdown.
    Cancelling,
    /// Connection task finished after cancellation.
    Stopped,
}

/// Terminal or running status of a supervised background task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    /// Returned on its own before being cancelled.
    Completed,
    Cancelled,
    Failed(String),
    Panicked(String),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

/// The configuration section handed to a client's `configure` call.
///
/// A client whose section is absent from the configuration receives an
/// empty section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientConfig(serde_json::Map<String, serde_json::Value>);

impl ClientConfig {
    pub fn new(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(values)
    }

    /// Build from an arbitrary JSON value. Anything but an object yields an
    /// empty section.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize the section into a client's typed settings.
    ///
    /// Types with `#[serde(default)]` fields parse an empty section into
    /// their defaults.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, SirbotError> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
            .map_err(|e| SirbotError::Config(format!("invalid client section: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Settings {
        token: Option<String>,
        retries: u32,
    }

    #[test]
    fn capability_kind_round_trips_through_strings() {
        assert_eq!(CapabilityKind::Client.to_string(), "client");
        assert_eq!(
            CapabilityKind::from_str("dispatcher").unwrap(),
            CapabilityKind::Dispatcher
        );
    }

    #[test]
    fn client_state_display() {
        assert_eq!(ClientState::Connecting.to_string(), "connecting");
        assert_eq!(ClientState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn task_status_terminality() {
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(TaskStatus::Failed("boom".into()).is_terminal());
    }

    #[test]
    fn empty_client_config_parses_to_defaults() {
        let config = ClientConfig::default();
        let settings: Settings = config.parse().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn client_config_parses_values() {
        let config = ClientConfig::from_value(serde_json::json!({"token": "abc", "retries": 3}));
        let settings: Settings = config.parse().unwrap();
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.retries, 3);
    }

    #[test]
    fn non_object_client_config_is_empty() {
        let config = ClientConfig::from_value(serde_json::json!("oops"));
        assert!(config.is_empty());
    }

    #[test]
    fn client_config_type_mismatch_is_config_error() {
        let config = ClientConfig::from_value(serde_json::json!({"retries": "many"}));
        let err = config.parse::<Settings>().unwrap_err();
        assert!(matches!(err, SirbotError::Config(_)));
    }
}
