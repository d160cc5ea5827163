// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{SirbotConfig, tracing_level};

/// Task name reserved for the dispatch loop; no client may use it.
pub const RESERVED_CLIENT_NAME: &str = "incoming";

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SirbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if tracing_level(&config.core.loglevel).is_none() {
        errors.push(ConfigError::Validation {
            message: format!(
                "core.loglevel `{}` is not one of trace, debug, info, warn, error",
                config.core.loglevel
            ),
        });
    }

    if let Some(level) = &config.loglevel
        && tracing_level(level).is_none()
    {
        errors.push(ConfigError::Validation {
            message: format!("loglevel `{level}` is not one of trace, debug, info, warn, error"),
        });
    }

    if config.core.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "core.host must not be empty".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for plugin in &config.core.plugins {
        if plugin.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "core.plugins must not contain empty module names".to_string(),
            });
        } else if !seen.insert(plugin.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("core.plugins lists `{plugin}` more than once"),
            });
        }
    }

    for (name, section) in &config.clients {
        if name == RESERVED_CLIENT_NAME {
            errors.push(ConfigError::Validation {
                message: format!("`{RESERVED_CLIENT_NAME}` is reserved and cannot name a client"),
            });
        }
        if !section.is_object() {
            errors.push(ConfigError::Validation {
                message: format!("client section `{name}` must be a table"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&SirbotConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = SirbotConfig::default();
        config.core.loglevel = "loud".into();
        config.core.host = " ".into();
        config.core.plugins = vec!["a".into(), "a".into(), "".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn reserved_client_name_is_rejected() {
        let mut config = SirbotConfig::default();
        config
            .clients
            .insert("incoming".into(), serde_json::json!({}));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("reserved"));
    }

    #[test]
    fn scalar_client_section_is_rejected() {
        let mut config = SirbotConfig::default();
        config.clients.insert("slack".into(), serde_json::json!(42));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("must be a table"));
    }

    #[test]
    fn parsed_config_with_reserved_section_is_rejected() {
        let toml_str = r#"
[core]
plugins = ["sirbot.webhook"]

[incoming]
path = "/x"
"#;
        let config: SirbotConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("`incoming` is reserved"));
    }

    #[test]
    fn parsed_config_with_client_tables_is_valid() {
        let toml_str = r#"
loglevel = "debug"

[core]
plugins = ["sirbot.webhook", "sirbot.log"]

[webhook]
path = "/hook"
"#;
        let config: SirbotConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.clients.len(), 1);
    }
}
