// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording dispatcher for asserting what the engine dispatched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sirbot_core::{
    Dispatcher, DispatcherProvider, IncomingMessage, NamedDispatcher, Payload, SirbotError,
};
use tokio::sync::Notify;

#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<IncomingMessage>>,
    completed: AtomicUsize,
    notify: Notify,
}

/// A dispatcher that records every invocation in start order.
///
/// Clones share one recording.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    recording: Arc<Recording>,
    fail_on: Vec<Payload>,
    delay: Option<Duration>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail (after recording) whenever the payload equals `payload`.
    pub fn failing_on(mut self, payload: Payload) -> Self {
        self.fail_on.push(payload);
        self
    }

    /// Sleep for `delay` after recording each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every invocation so far, in the order they started.
    pub fn calls(&self) -> Vec<IncomingMessage> {
        self.recording
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of invocations that ran to completion.
    pub fn completed(&self) -> usize {
        self.recording.completed.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` invocations have started.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.recording.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if self.calls().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn incoming_message(&self, source: &str, payload: Payload) -> Result<(), SirbotError> {
        self.recording
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(IncomingMessage::new(source, payload.clone()));
        self.recording.notify.notify_waiters();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.recording.completed.fetch_add(1, Ordering::SeqCst);

        if self.fail_on.contains(&payload) {
            return Err(SirbotError::dispatch(source, format!("refusing {payload}")));
        }
        Ok(())
    }
}

impl DispatcherProvider for RecordingDispatcher {
    fn dispatcher(&self) -> Option<NamedDispatcher> {
        Some(NamedDispatcher::new("recording", self.clone()))
    }
}
