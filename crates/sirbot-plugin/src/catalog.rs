// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog of compiled-in plugin modules.
//!
//! Loading a plugin module means resolving its name here and calling its
//! factory. Names not present in the catalog cannot be loaded.

use std::collections::BTreeMap;
use std::sync::Arc;

use sirbot_core::{Plugin, SirbotError};

type PluginFactory = Box<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// A single catalog entry.
pub struct CatalogEntry {
    /// Dotted module name, e.g. `sirbot.webhook`.
    pub name: String,
    /// One-line description shown by `sirbot plugins`.
    pub description: String,
    factory: PluginFactory,
}

impl CatalogEntry {
    /// Instantiate the plugin.
    pub fn instantiate(&self) -> Arc<dyn Plugin> {
        (self.factory)()
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Name-addressed table of plugin factories.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl PluginCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, description: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.entries.insert(
            name.to_string(),
            CatalogEntry {
                name: name.to_string(),
                description: description.to_string(),
                factory: Box::new(factory),
            },
        );
    }

    /// Load the module called `name`.
    pub fn load(&self, name: &str) -> Result<Arc<dyn Plugin>, SirbotError> {
        self.entries
            .get(name)
            .map(CatalogEntry::instantiate)
            .ok_or_else(|| SirbotError::PluginNotFound {
                module: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries, sorted by name.
    pub fn list(&self) -> Vec<&CatalogEntry> {
        self.entries.values().collect()
    }

    /// Entries whose name or description contains `query` (case-insensitive).
    ///
    /// An empty query returns every entry.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let needle = query.to_lowercase();
        self.entries
            .values()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
    }

    fn catalog() -> PluginCatalog {
        let mut catalog = PluginCatalog::new();
        catalog.register("sirbot.webhook", "HTTP webhook client", || {
            Arc::new(Named("sirbot.webhook"))
        });
        catalog.register("sirbot.log", "Logging dispatcher", || {
            Arc::new(Named("sirbot.log"))
        });
        catalog
    }

    #[test]
    fn load_known_module() {
        let plugin = catalog().load("sirbot.log").unwrap();
        assert_eq!(plugin.name(), "sirbot.log");
    }

    #[test]
    fn load_unknown_module_is_plugin_not_found() {
        let err = catalog().load("does.not.exist").err().unwrap();
        match err {
            SirbotError::PluginNotFound { module } => assert_eq!(module, "does.not.exist"),
            other => panic!("expected PluginNotFound, got {other}"),
        }
    }

    #[test]
    fn list_is_sorted_by_name() {
        let catalog = catalog();
        let names: Vec<_> = catalog.list().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sirbot.log", "sirbot.webhook"]);
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn search_matches_description_case_insensitive() {
        let catalog = catalog();
        let found = catalog.search("WEBHOOK");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "sirbot.webhook");

        assert_eq!(catalog.search("dispatcher").len(), 1);
        assert_eq!(catalog.search("").len(), 2);
        assert!(catalog.search("telegram").is_empty());
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut catalog = catalog();
        catalog.register("sirbot.log", "Replacement", || Arc::new(Named("sirbot.log")));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("sirbot.log"));
        assert_eq!(catalog.search("replacement").len(), 1);
    }
}
