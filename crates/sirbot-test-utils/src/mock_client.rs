// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock client for deterministic testing.
//!
//! `MockClient` is a [`ClientProvider`] whose clients push a scripted list
//! of payloads when they connect, then forward injected payloads until
//! cancelled (or return, fail, or panic, as configured). Every clone shares
//! one probe, so a test keeps a handle and inspects what the engine did.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::routing::get;
use sirbot_core::{
    Client, ClientConfig, ClientProvider, HostRouter, NamedClient, Payload, QueueSender,
    SirbotError,
};
use tokio::sync::Notify;

/// What `connect` does once the scripted payloads have been pushed.
#[derive(Debug, Clone, Default)]
pub enum ConnectOutcome {
    /// Keep running, forwarding injected payloads, until cancelled.
    #[default]
    Park,
    /// Return `Ok(())` immediately.
    Return,
    /// Return a client error with this message.
    Fail(String),
    /// Panic with this message.
    Panic(String),
}

#[derive(Default)]
struct Probe {
    inbound: Mutex<VecDeque<Payload>>,
    notify: Notify,
    configured: Mutex<Vec<ClientConfig>>,
    connects: AtomicUsize,
    stopped: AtomicBool,
}

/// A scripted client provider.
#[derive(Clone)]
pub struct MockClient {
    name: String,
    script: Vec<Payload>,
    outcome: ConnectOutcome,
    configure_error: Option<String>,
    route: Option<String>,
    probe: Arc<Probe>,
}

impl MockClient {
    /// A client called `name` that pushes nothing and parks.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Vec::new(),
            outcome: ConnectOutcome::Park,
            configure_error: None,
            route: None,
            probe: Arc::new(Probe::default()),
        }
    }

    /// Push `payloads`, in order, as soon as `connect` runs.
    pub fn with_messages<I>(mut self, payloads: I) -> Self
    where
        I: IntoIterator<Item = Payload>,
    {
        self.script.extend(payloads);
        self
    }

    pub fn with_outcome(mut self, outcome: ConnectOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Make `configure` fail with `message`.
    pub fn failing_configure(mut self, message: &str) -> Self {
        self.configure_error = Some(message.to_string());
        self
    }

    /// Register a GET route at `path` during `configure`.
    pub fn with_route(mut self, path: &str) -> Self {
        self.route = Some(path.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a payload for a running (or future) connection to push.
    pub fn inject(&self, payload: Payload) {
        lock(&self.probe.inbound).push_back(payload);
        self.probe.notify.notify_waiters();
    }

    /// Every config section passed to `configure`, in call order.
    pub fn configure_calls(&self) -> Vec<ClientConfig> {
        lock(&self.probe.configured).clone()
    }

    /// Number of times `connect` has been called.
    pub fn connect_count(&self) -> usize {
        self.probe.connects.load(Ordering::SeqCst)
    }

    /// Whether a `connect` call has finished or been dropped.
    pub fn is_stopped(&self) -> bool {
        self.probe.stopped.load(Ordering::SeqCst)
    }
}

impl ClientProvider for MockClient {
    fn client(&self, queue: QueueSender) -> Option<NamedClient> {
        Some(NamedClient::new(
            self.name.clone(),
            BoundMockClient {
                mock: self.clone(),
                queue,
            },
        ))
    }
}

/// A [`MockClient`] wired to the incoming queue.
struct BoundMockClient {
    mock: MockClient,
    queue: QueueSender,
}

impl BoundMockClient {
    fn forward_injected(&self) -> Result<(), SirbotError> {
        let pending: Vec<Payload> = lock(&self.mock.probe.inbound).drain(..).collect();
        for payload in pending {
            self.queue.push(self.mock.name.as_str(), payload)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Client for BoundMockClient {
    fn configure(
        &mut self,
        config: &ClientConfig,
        router: &mut HostRouter,
    ) -> Result<(), SirbotError> {
        lock(&self.mock.probe.configured).push(config.clone());

        if let Some(message) = &self.mock.configure_error {
            return Err(SirbotError::client(&self.mock.name, message.as_str()));
        }
        if let Some(path) = &self.mock.route {
            let name = self.mock.name.clone();
            router.route(path, get(move || async move { name }))?;
        }
        Ok(())
    }

    async fn connect(&self) -> Result<(), SirbotError> {
        let probe = &self.mock.probe;
        probe.connects.fetch_add(1, Ordering::SeqCst);
        let _stopped = StopGuard(probe);

        for payload in &self.mock.script {
            self.queue.push(self.mock.name.as_str(), payload.clone())?;
        }

        match &self.mock.outcome {
            ConnectOutcome::Park => loop {
                let notified = probe.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                self.forward_injected()?;
                notified.await;
            },
            ConnectOutcome::Return => Ok(()),
            ConnectOutcome::Fail(message) => {
                Err(SirbotError::client(&self.mock.name, message.as_str()))
            }
            ConnectOutcome::Panic(message) => panic!("{message}"),
        }
    }
}

/// Marks the probe stopped when `connect` finishes or is dropped.
struct StopGuard<'a>(&'a Probe);

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
