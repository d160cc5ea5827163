// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher capability: turns queued messages into application handling.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use sirbot_queue::Payload;

use crate::error::SirbotError;

/// Handles messages pulled from the incoming queue.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    /// Handle one message produced by the client named `source`.
    async fn incoming_message(&self, source: &str, payload: Payload) -> Result<(), SirbotError>;

    /// Wrap the host router with this dispatcher's middleware.
    fn middleware(&self, router: Router) -> Router {
        router
    }
}

/// A dispatcher instance together with its name.
#[derive(Clone)]
pub struct NamedDispatcher {
    pub name: String,
    pub dispatcher: Arc<dyn Dispatcher>,
}

impl NamedDispatcher {
    pub fn new(name: impl Into<String>, dispatcher: impl Dispatcher) -> Self {
        Self {
            name: name.into(),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl std::fmt::Debug for NamedDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedDispatcher")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Dispatcher capability of a plugin.
pub trait DispatcherProvider: Send + Sync {
    /// Build this plugin's dispatcher, or `None` to decline.
    fn dispatcher(&self) -> Option<NamedDispatcher>;
}
