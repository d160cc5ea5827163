// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine tests.
//!
//! `TestHarness` assembles a plugin catalog from mock plugins and a
//! configuration that loads them, ready to hand to the engine.

use std::sync::Arc;

use sirbot_config::SirbotConfig;
use sirbot_core::Plugin;
use sirbot_plugin::PluginCatalog;

use crate::mock_plugin::MockPlugin;

/// Builder for creating test environments.
pub struct TestHarnessBuilder {
    plugins: Vec<MockPlugin>,
    extra_modules: Vec<String>,
    sections: Vec<(String, serde_json::Value)>,
    drain_timeout_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            plugins: Vec::new(),
            extra_modules: Vec::new(),
            sections: Vec::new(),
            drain_timeout_secs: 1,
        }
    }

    /// Add a plugin to the catalog and to `core.plugins`.
    pub fn with_plugin(mut self, plugin: MockPlugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// List a module in `core.plugins` without adding it to the catalog.
    pub fn with_missing_module(mut self, module: &str) -> Self {
        self.extra_modules.push(module.to_string());
        self
    }

    /// Add a client configuration section.
    pub fn with_section(mut self, client: &str, section: serde_json::Value) -> Self {
        self.sections.push((client.to_string(), section));
        self
    }

    pub fn with_drain_timeout(mut self, secs: u64) -> Self {
        self.drain_timeout_secs = secs;
        self
    }

    pub fn build(self) -> TestHarness {
        let mut catalog = PluginCatalog::new();
        let mut config = SirbotConfig::default();

        for plugin in self.plugins {
            let name = plugin.name().to_string();
            config.core.plugins.push(name.clone());
            catalog.register(&name, "test plugin", move || {
                Arc::new(plugin.clone()) as Arc<dyn Plugin>
            });
        }
        config.core.plugins.extend(self.extra_modules);
        config.core.drain_timeout_secs = self.drain_timeout_secs;
        config.clients.extend(self.sections);

        TestHarness { catalog, config }
    }
}

/// A plugin catalog and a configuration that loads it.
pub struct TestHarness {
    pub catalog: PluginCatalog,
    pub config: SirbotConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
