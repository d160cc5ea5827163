// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client registry: configuration, connection tasks, and lifecycle state.

use std::collections::BTreeMap;
use std::future::poll_fn;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use sirbot_config::SirbotConfig;
use sirbot_config::validation::RESERVED_CLIENT_NAME;
use sirbot_core::{Client, ClientState, HostRouter, NamedClient, SirbotError, TaskStatus};
use tracing::{debug, error, info};

use crate::supervisor::TaskTable;

struct ConfiguredClient {
    name: String,
    client: Arc<dyn Client>,
}

/// Clients by unique name, with the lifecycle state of each.
#[derive(Default)]
pub struct ClientRegistry {
    configured: Mutex<Vec<ConfiguredClient>>,
    states: Arc<DashMap<String, ClientState>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure `clients` in order, handing each its own config section.
    ///
    /// A client whose name is taken or reserved is skipped. A client whose
    /// `configure` fails is marked [`ClientState::Failed`] and never
    /// connected. Returns the number of clients ready to connect.
    pub fn configure_all(
        &self,
        clients: Vec<NamedClient>,
        config: &SirbotConfig,
        router: &mut HostRouter,
    ) -> usize {
        let mut configured = self.configured.lock().unwrap_or_else(PoisonError::into_inner);

        for NamedClient { name, mut client } in clients {
            if name == RESERVED_CLIENT_NAME {
                error!(client = %name, "client name is reserved for the dispatch task, skipping");
                continue;
            }
            if self.states.contains_key(&name) {
                error!(client = %name, "duplicate client name, skipping");
                continue;
            }
            self.states.insert(name.clone(), ClientState::Registered);

            let section = config.client_section(&name);
            if section.is_empty() {
                debug!(client = %name, "no configuration section, using an empty one");
            }

            match client.configure(&section, router) {
                Ok(()) => {
                    info!(client = %name, "client configured");
                    self.states.insert(name.clone(), ClientState::Configured);
                    configured.push(ConfiguredClient {
                        name,
                        client: Arc::from(client),
                    });
                }
                Err(e) => {
                    error!(client = %name, error = %e, "client configuration failed");
                    self.states.insert(name, ClientState::Failed);
                }
            }
        }

        configured.len()
    }

    /// Spawn one supervised connection task per configured client.
    pub async fn connect_all(&self, tasks: &TaskTable) -> Result<(), SirbotError> {
        let clients: Vec<(String, Arc<dyn Client>)> = self
            .configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| (c.name.clone(), Arc::clone(&c.client)))
            .collect();

        for (name, client) in clients {
            self.states.insert(name.clone(), ClientState::Connecting);

            let exit_states = Arc::clone(&self.states);
            let exit_name = name.clone();
            tasks
                .spawn(
                    &name,
                    run_connection(name.clone(), client, Arc::clone(&self.states)),
                    move |status| {
                        let state = match status {
                            TaskStatus::Cancelled => ClientState::Stopped,
                            _ => ClientState::Failed,
                        };
                        exit_states.insert(exit_name, state);
                    },
                )
                .await?;
            debug!(client = %name, "connection task started");
        }
        Ok(())
    }

    /// Mark every live client as cancelling ahead of shutdown.
    pub fn mark_cancelling(&self) {
        for mut entry in self.states.iter_mut() {
            if matches!(
                *entry.value(),
                ClientState::Connecting | ClientState::Connected
            ) {
                *entry.value_mut() = ClientState::Cancelling;
            }
        }
    }

    pub fn state(&self, name: &str) -> Option<ClientState> {
        self.states.get(name).map(|entry| *entry.value())
    }

    /// Snapshot of every client state, sorted by name.
    pub fn states(&self) -> BTreeMap<String, ClientState> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Names of the successfully configured clients, in configuration order.
    pub fn names(&self) -> Vec<String> {
        self.configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("states", &self.states())
            .finish()
    }
}

/// Drive `client.connect()`, marking the client connected once the
/// connection is parked waiting on its backend.
async fn run_connection(
    name: String,
    client: Arc<dyn Client>,
    states: Arc<DashMap<String, ClientState>>,
) -> Result<(), SirbotError> {
    let mut connect = client.connect();
    let mut parked = false;

    poll_fn(|cx| {
        let poll = connect.as_mut().poll(cx);
        if poll.is_pending() && !parked {
            parked = true;
            states.insert(name.clone(), ClientState::Connected);
            info!(client = %name, "client connected");
        }
        poll
    })
    .await
}
