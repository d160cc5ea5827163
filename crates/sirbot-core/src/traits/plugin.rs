// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait implemented by every plugin module.

use std::sync::Arc;

use crate::traits::client::ClientProvider;
use crate::traits::dispatcher::DispatcherProvider;
use crate::types::CapabilityKind;

/// A plugin module that may provide clients, dispatchers, or both.
pub trait Plugin: Send + Sync + 'static {
    /// Module name, as listed in `core.plugins` (e.g. `sirbot.webhook`).
    fn name(&self) -> &str;

    /// Returns the semantic version of this plugin.
    fn version(&self) -> semver::Version;

    /// The client capability, if this plugin offers one.
    fn client_provider(&self) -> Option<Arc<dyn ClientProvider>> {
        None
    }

    /// The dispatcher capability, if this plugin offers one.
    fn dispatcher_provider(&self) -> Option<Arc<dyn DispatcherProvider>> {
        None
    }

    /// Capability kinds this plugin implements.
    fn capabilities(&self) -> Vec<CapabilityKind> {
        let mut kinds = Vec::new();
        if self.client_provider().is_some() {
            kinds.push(CapabilityKind::Client);
        }
        if self.dispatcher_provider().is_some() {
            kinds.push(CapabilityKind::Dispatcher);
        }
        kinds
    }
}
