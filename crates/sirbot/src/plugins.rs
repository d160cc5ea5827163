// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sirbot plugins` and `sirbot check-config` command implementations.

use sirbot_config::SirbotConfig;
use sirbot_plugin::PluginCatalog;

/// One line per catalog entry matching `query`, marking enabled modules.
pub fn list_plugins(
    catalog: &PluginCatalog,
    config: &SirbotConfig,
    query: Option<&str>,
) -> Vec<String> {
    let entries = match query {
        Some(query) => catalog.search(query),
        None => catalog.list(),
    };

    entries
        .into_iter()
        .map(|entry| {
            let marker = if config.core.plugins.contains(&entry.name) {
                "*"
            } else {
                " "
            };
            format!("{marker} {:<20} {}", entry.name, entry.description)
        })
        .collect()
}

/// Configured plugin modules that the catalog cannot load.
pub fn missing_plugins<'a>(catalog: &PluginCatalog, config: &'a SirbotConfig) -> Vec<&'a str> {
    config
        .core
        .plugins
        .iter()
        .filter(|name| !catalog.contains(name))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use sirbot_builtin::builtin_catalog;

    use super::*;

    #[test]
    fn enabled_plugins_are_marked() {
        let mut config = SirbotConfig::default();
        config.core.plugins = vec!["sirbot.log".into()];

        let lines = list_plugins(&builtin_catalog(), &config, None);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("* sirbot.log"));
        assert!(lines[1].starts_with("  sirbot.webhook"));
    }

    #[test]
    fn query_filters_entries() {
        let lines = list_plugins(&builtin_catalog(), &SirbotConfig::default(), Some("WEBHOOK"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("sirbot.webhook"));
    }

    #[test]
    fn unknown_modules_are_reported() {
        let mut config = SirbotConfig::default();
        config.core.plugins = vec!["sirbot.webhook".into(), "does.not.exist".into()];
        assert_eq!(missing_plugins(&builtin_catalog(), &config), vec!["does.not.exist"]);
    }
}
