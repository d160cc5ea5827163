// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Sirbot configuration system.

use sirbot_config::diagnostic::ConfigError;
use sirbot_config::{load_and_validate_str, load_config_from_str};

/// A full configuration with core and client sections deserializes.
#[test]
fn valid_toml_deserializes_into_sirbot_config() {
    let toml = r#"
[core]
loglevel = "debug"
plugins = ["sirbot.webhook", "sirbot.log"]
host = "127.0.0.1"
port = 9000
drain_timeout_secs = 2

[webhook]
path = "/incoming"
token = "s3cret"

[slack]
token = "xoxb-123"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.core.loglevel, "debug");
    assert_eq!(config.core.plugins, vec!["sirbot.webhook", "sirbot.log"]);
    assert_eq!(config.core.host, "127.0.0.1");
    assert_eq!(config.core.port, 9000);
    assert_eq!(config.core.drain_timeout_secs, 2);
    assert_eq!(config.clients.len(), 2);

    let webhook = config.client_section("webhook");
    assert_eq!(webhook.get("path"), Some(&serde_json::json!("/incoming")));
    assert_eq!(webhook.get("token"), Some(&serde_json::json!("s3cret")));
}

/// Client sections are optional; missing ones come back empty.
#[test]
fn absent_client_section_is_empty() {
    let config = load_config_from_str("[core]\nplugins = [\"sirbot.webhook\"]\n").unwrap();
    assert!(config.clients.is_empty());
    assert!(config.client_section("webhook").is_empty());
}

/// Empty input yields defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("empty config should be valid");
    assert_eq!(config.core.loglevel, "info");
    assert_eq!(config.core.host, "0.0.0.0");
    assert_eq!(config.core.port, 8080);
    assert!(config.core.plugins.is_empty());
}

/// The legacy top-level `loglevel` is not mistaken for a client section.
#[test]
fn top_level_loglevel_is_not_a_client() {
    let config = load_and_validate_str("loglevel = \"warning\"\n").unwrap();
    assert_eq!(config.loglevel.as_deref(), Some("warning"));
    assert_eq!(config.effective_loglevel(), "warning");
    assert!(config.clients.is_empty());
}

/// Unknown keys in `[core]` are rejected with a suggestion.
#[test]
fn unknown_core_key_produces_suggestion() {
    let errors = load_and_validate_str("[core]\nplugin = [\"sirbot.log\"]\n")
        .expect_err("unknown core key should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "plugin");
            assert_eq!(suggestion.as_deref(), Some("plugins"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value types in `[core]` are reported as InvalidType.
#[test]
fn wrong_type_in_core_is_invalid_type() {
    let errors = load_and_validate_str("[core]\nport = \"eighty\"\n")
        .expect_err("string port should fail");
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("port")));
}

/// Semantic validation runs after deserialization.
#[test]
fn invalid_loglevel_fails_validation() {
    let errors = load_and_validate_str("[core]\nloglevel = \"chatty\"\n")
        .expect_err("bad log level should fail");
    assert!(
        matches!(&errors[0], ConfigError::Validation { message } if message.contains("chatty"))
    );
}

/// Unknown plugin names are not a config error; loading them fails later.
#[test]
fn unknown_plugin_name_passes_validation() {
    let config = load_and_validate_str("[core]\nplugins = [\"does.not.exist\"]\n").unwrap();
    assert_eq!(config.core.plugins, vec!["does.not.exist"]);
}
