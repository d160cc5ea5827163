// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability registry built from the configured plugin modules.
//!
//! The registry is constructed once at engine startup and owned by the
//! engine; it is never mutated after discovery. Providers are kept in
//! registration order so query results are deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use sirbot_core::{
    CapabilityKind, ClientProvider, DispatcherProvider, NamedClient, NamedDispatcher, Plugin,
    QueueSender, SirbotError,
};
use tracing::{debug, info, warn};

use crate::catalog::PluginCatalog;

/// Providers grouped by capability kind.
#[derive(Default)]
pub struct CapabilityRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    clients: Vec<(String, Arc<dyn ClientProvider>)>,
    dispatchers: Vec<(String, Arc<dyn DispatcherProvider>)>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every module in `modules` from `catalog` and register it.
    ///
    /// Fails on the first module that cannot be loaded; a misconfigured
    /// plugin is never skipped silently.
    pub fn discover<S: AsRef<str>>(
        modules: &[S],
        catalog: &PluginCatalog,
    ) -> Result<Self, SirbotError> {
        debug!("importing plugins");
        let mut registry = Self::new();
        let mut loaded = HashSet::new();

        for module in modules {
            let module = module.as_ref();
            if !loaded.insert(module) {
                warn!(plugin = %module, "plugin listed more than once, ignoring duplicate");
                continue;
            }
            let plugin = catalog.load(module)?;
            registry.register(plugin);
        }

        info!(count = registry.len(), "capability registry initialized");
        Ok(registry)
    }

    /// Register a plugin and each capability it provides.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        let name = plugin.name().to_string();

        if let Some(provider) = plugin.client_provider() {
            self.clients.push((name.clone(), provider));
        }
        if let Some(provider) = plugin.dispatcher_provider() {
            self.dispatchers.push((name.clone(), provider));
        }

        info!(
            plugin = %name,
            version = %plugin.version(),
            capabilities = ?plugin.capabilities(),
            "plugin registered"
        );
        self.plugins.push(plugin);
    }

    /// Invoke every client provider and collect the clients they return.
    ///
    /// Returns [`SirbotError::NoClients`] when no provider produced a
    /// client. Callers are expected to report it and carry on.
    pub fn query_clients(&self, queue: &QueueSender) -> Result<Vec<NamedClient>, SirbotError> {
        let clients: Vec<NamedClient> = self
            .clients
            .iter()
            .filter_map(|(plugin, provider)| {
                let client = provider.client(queue.clone());
                if client.is_none() {
                    debug!(plugin = %plugin, "client provider declined");
                }
                client
            })
            .collect();

        if clients.is_empty() {
            return Err(SirbotError::NoClients);
        }
        Ok(clients)
    }

    /// Invoke every dispatcher provider and collect the dispatchers they return.
    pub fn query_dispatchers(&self) -> Vec<NamedDispatcher> {
        self.dispatchers
            .iter()
            .filter_map(|(plugin, provider)| {
                let dispatcher = provider.dispatcher();
                if dispatcher.is_none() {
                    debug!(plugin = %plugin, "dispatcher provider declined");
                }
                dispatcher
            })
            .collect()
    }

    /// Number of providers registered for `kind`.
    pub fn provider_count(&self, kind: CapabilityKind) -> usize {
        match kind {
            CapabilityKind::Client => self.clients.len(),
            CapabilityKind::Dispatcher => self.dispatchers.len(),
        }
    }

    /// Registered plugins, in registration order.
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("clients", &self.clients.len())
            .field("dispatchers", &self.dispatchers.len())
            .finish()
    }
}
