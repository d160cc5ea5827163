// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in Sirbot plugin modules.
//!
//! - `sirbot.webhook`: a client fed by JSON POSTs to a host route
//! - `sirbot.log`: a dispatcher that logs messages and traces HTTP requests

pub mod log;
pub mod webhook;

use std::sync::Arc;

use sirbot_core::Plugin;
use sirbot_plugin::PluginCatalog;

pub use log::{LogDispatcher, LogPlugin};
pub use webhook::{WEBHOOK_CLIENT, WebhookClient, WebhookPlugin, WebhookSettings};

/// Register every built-in plugin module in `catalog`.
pub fn register_builtins(catalog: &mut PluginCatalog) {
    catalog.register(
        "sirbot.webhook",
        "Client that turns JSON POSTs to a host route into incoming messages",
        || Arc::new(WebhookPlugin) as Arc<dyn Plugin>,
    );
    catalog.register(
        "sirbot.log",
        "Dispatcher that logs every incoming message and traces HTTP requests",
        || Arc::new(LogPlugin) as Arc<dyn Plugin>,
    );
}

/// A catalog holding only the built-in plugins.
pub fn builtin_catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    register_builtins(&mut catalog);
    catalog
}
