// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client capability: one connection to an external chat backend.

use async_trait::async_trait;
use sirbot_queue::QueueSender;

use crate::error::SirbotError;
use crate::router::HostRouter;
use crate::types::ClientConfig;

/// A connection to a chat backend that feeds the incoming queue.
///
/// The engine calls [`configure`](Client::configure) exactly once, before
/// any connection attempt, then runs [`connect`](Client::connect) in a
/// supervised background task until shutdown.
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Apply this client's configuration section and register any HTTP
    /// routes it needs.
    ///
    /// `config` is empty when the configuration has no section for this
    /// client; that must not be treated as an error.
    fn configure(
        &mut self,
        config: &ClientConfig,
        router: &mut HostRouter,
    ) -> Result<(), SirbotError>;

    /// Run the connection until cancelled.
    ///
    /// Returning at all, with `Ok` or `Err`, is treated as an abnormal exit.
    /// Reconnection, if any, is the client's own concern.
    async fn connect(&self) -> Result<(), SirbotError>;
}

/// A client instance together with its unique name.
pub struct NamedClient {
    pub name: String,
    pub client: Box<dyn Client>,
}

impl NamedClient {
    pub fn new(name: impl Into<String>, client: impl Client) -> Self {
        Self {
            name: name.into(),
            client: Box::new(client),
        }
    }
}

impl std::fmt::Debug for NamedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedClient")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Client capability of a plugin.
pub trait ClientProvider: Send + Sync {
    /// Build this plugin's client, wired to the incoming queue.
    ///
    /// Returning `None` declines; the plugin then contributes no client.
    fn client(&self, queue: QueueSender) -> Option<NamedClient>;
}
