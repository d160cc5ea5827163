// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Sirbot engine: wires plugins, clients, dispatchers, and the incoming
//! queue into the HTTP host's lifecycle.
//!
//! Construction does everything that can fail on bad configuration
//! (plugin loading, client configuration). Background work starts only in
//! the host's startup hook and is torn down in its cleanup hook.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sirbot_config::SirbotConfig;
use sirbot_core::{ClientState, Dispatcher, IncomingQueue, SirbotError, TaskStatus};
use sirbot_plugin::{CapabilityRegistry, PluginCatalog};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::clients::ClientRegistry;
use crate::dispatch::{DispatchLoop, DispatcherSet};
use crate::health::{self, HEALTH_PATH, HealthResponse};
use crate::host::HostApp;
use crate::shutdown::install_signal_handler;
use crate::supervisor::{INCOMING_TASK, TaskTable};

/// Engine state shared with the host's lifecycle hooks and handlers.
pub(crate) struct EngineState {
    pub(crate) queue: IncomingQueue,
    pub(crate) dispatcher: Arc<DispatcherSet>,
    pub(crate) clients: ClientRegistry,
    pub(crate) tasks: TaskTable,
    pub(crate) fanout: TaskTracker,
    started: AtomicBool,
    drain_timeout: Duration,
}

impl EngineState {
    async fn start(&self) -> Result<(), SirbotError> {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("engine already started, ignoring");
            return Ok(());
        }

        info!("starting sirbot");
        self.clients.connect_all(&self.tasks).await?;

        let dispatcher: Arc<dyn Dispatcher> = self.dispatcher.clone();
        let dispatch = DispatchLoop::new(self.queue.clone(), dispatcher, self.fanout.clone());
        self.tasks.spawn(INCOMING_TASK, dispatch.run(), |_| {}).await?;

        info!(clients = self.clients.names().len(), "sirbot started");
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), SirbotError> {
        info!("stopping sirbot");
        self.clients.mark_cancelling();
        self.queue.close();

        let finished = self.tasks.cancel_all().await;
        debug!(tasks = finished.len(), "background tasks stopped");

        self.fanout.close();
        match tokio::time::timeout(self.drain_timeout, self.fanout.wait()).await {
            Ok(()) => debug!("message handlers drained"),
            Err(_) => warn!(
                in_flight = self.fanout.len(),
                timeout_secs = self.drain_timeout.as_secs(),
                "message handlers still running after drain timeout"
            ),
        }

        info!("sirbot stopped");
        Ok(())
    }
}

/// A configured bot, ready to be served.
pub struct SirBot {
    config: SirbotConfig,
    registry: CapabilityRegistry,
    state: Arc<EngineState>,
    app: HostApp,
}

impl SirBot {
    /// Build the engine from `config`, loading plugins from `catalog`.
    ///
    /// Fails if a configured plugin module is not in the catalog. A missing
    /// client is reported but not fatal, and a client that fails to
    /// configure is skipped.
    pub fn new(config: SirbotConfig, catalog: &PluginCatalog) -> Result<Self, SirbotError> {
        info!("initializing sirbot");

        let registry = CapabilityRegistry::discover(&config.core.plugins, catalog)?;

        let shutdown = CancellationToken::new();
        let queue = IncomingQueue::with_cancellation(shutdown.child_token());
        let dispatcher = Arc::new(DispatcherSet::new(registry.query_dispatchers()));

        let state = Arc::new(EngineState {
            queue: queue.clone(),
            dispatcher: Arc::clone(&dispatcher),
            clients: ClientRegistry::new(),
            tasks: TaskTable::new(shutdown),
            fanout: TaskTracker::new(),
            started: AtomicBool::new(false),
            drain_timeout: Duration::from_secs(config.core.drain_timeout_secs),
        });

        let mut app = HostApp::new();
        app.add_middleware(move |router| dispatcher.middleware(router));
        let startup_state = Arc::clone(&state);
        app.on_startup(move || {
            let state = Arc::clone(&startup_state);
            async move { state.start().await }
        });
        let cleanup_state = Arc::clone(&state);
        app.on_cleanup(move || {
            let state = Arc::clone(&cleanup_state);
            async move { state.cleanup().await }
        });
        app.router_mut()
            .route(HEALTH_PATH, health::handler(Arc::clone(&state)))?;

        let clients = match registry.query_clients(&queue.sender()) {
            Ok(clients) => clients,
            Err(SirbotError::NoClients) => {
                error!("no client found");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let ready = state
            .clients
            .configure_all(clients, &config, app.router_mut());

        info!(
            plugins = registry.len(),
            clients = ready,
            dispatchers = state.dispatcher.len(),
            "sirbot initialized"
        );

        Ok(Self {
            config,
            registry,
            state,
            app,
        })
    }

    /// Start the clients and the dispatch loop.
    ///
    /// Normally run by the host's startup hook. Calling it again is a no-op.
    pub async fn start(&self) -> Result<(), SirbotError> {
        self.state.start().await
    }

    /// Cancel every background task and wait for them, then give in-flight
    /// message handlers up to `core.drain_timeout_secs` to finish.
    ///
    /// Normally run by the host's cleanup hook.
    pub async fn cleanup(&self) -> Result<(), SirbotError> {
        self.state.cleanup().await
    }

    /// Serve on `host:port` until SIGINT or SIGTERM.
    pub async fn run(self, host: &str, port: u16) -> Result<(), SirbotError> {
        self.run_until(host, port, install_signal_handler()).await
    }

    /// Serve on `host:port` until `shutdown` is cancelled.
    pub async fn run_until(
        self,
        host: &str,
        port: u16,
        shutdown: CancellationToken,
    ) -> Result<(), SirbotError> {
        self.app.run(host, port, shutdown).await
    }

    pub fn app(&self) -> &HostApp {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut HostApp {
        &mut self.app
    }

    pub fn into_app(self) -> HostApp {
        self.app
    }

    pub fn config(&self) -> &SirbotConfig {
        &self.config
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// The incoming queue clients push to.
    pub fn queue(&self) -> &IncomingQueue {
        &self.state.queue
    }

    /// Names of the clients that configured successfully.
    pub fn client_names(&self) -> Vec<String> {
        self.state.clients.names()
    }

    pub fn client_state(&self, name: &str) -> Option<ClientState> {
        self.state.clients.state(name)
    }

    pub fn client_states(&self) -> BTreeMap<String, ClientState> {
        self.state.clients.states()
    }

    pub fn task_status(&self, name: &str) -> Option<TaskStatus> {
        self.state.tasks.status(name)
    }

    pub fn task_statuses(&self) -> BTreeMap<String, TaskStatus> {
        self.state.tasks.statuses()
    }

    /// Message handlers currently running.
    pub fn in_flight(&self) -> usize {
        self.state.fanout.len()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse::from_state(&self.state)
    }
}

impl std::fmt::Debug for SirBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SirBot")
            .field("plugins", &self.config.core.plugins)
            .field("clients", &self.state.clients)
            .field("tasks", &self.state.tasks)
            .field("app", &self.app)
            .finish()
    }
}
