// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message dispatch: the loop that drains the incoming queue and the
//! dispatcher set it hands messages to.
//!
//! The loop never waits for a handler. Each message is handed to the
//! dispatcher set in its own task tracked by a [`TaskTracker`], and the
//! queue item is acknowledged when that task finishes, whatever the outcome.

use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use futures::future::join_all;
use futures::{FutureExt, StreamExt};
use sirbot_core::{
    Ack, Dispatcher, IncomingMessage, IncomingQueue, NamedDispatcher, Payload, SirbotError,
};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace};

use crate::supervisor::panic_message;

/// Every registered dispatcher, behind the single [`Dispatcher`] interface.
///
/// Each message is offered to all dispatchers concurrently; each decides
/// on its own whether it cares about the message.
#[derive(Debug, Default)]
pub struct DispatcherSet {
    dispatchers: Vec<NamedDispatcher>,
}

impl DispatcherSet {
    pub fn new(dispatchers: Vec<NamedDispatcher>) -> Self {
        info!(
            count = dispatchers.len(),
            names = ?dispatchers.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "dispatchers registered"
        );
        Self { dispatchers }
    }

    pub fn names(&self) -> Vec<&str> {
        self.dispatchers.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}

#[async_trait]
impl Dispatcher for DispatcherSet {
    async fn incoming_message(&self, source: &str, payload: Payload) -> Result<(), SirbotError> {
        match self.dispatchers.as_slice() {
            [] => {
                debug!(source = %source, "no dispatcher registered, dropping message");
                Ok(())
            }
            [single] => single.dispatcher.incoming_message(source, payload).await,
            many => {
                let results = join_all(
                    many.iter()
                        .map(|d| d.dispatcher.incoming_message(source, payload.clone())),
                )
                .await;

                let failures: Vec<String> = many
                    .iter()
                    .zip(results)
                    .filter_map(|(d, result)| result.err().map(|e| format!("{}: {e}", d.name)))
                    .collect();
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(SirbotError::dispatch(source, failures.join("; ")))
                }
            }
        }
    }

    fn middleware(&self, router: Router) -> Router {
        self.dispatchers
            .iter()
            .fold(router, |router, d| d.dispatcher.middleware(router))
    }
}

/// Pulls messages off the incoming queue and fans them out.
pub struct DispatchLoop {
    queue: IncomingQueue,
    dispatcher: Arc<dyn Dispatcher>,
    fanout: TaskTracker,
}

impl DispatchLoop {
    pub fn new(queue: IncomingQueue, dispatcher: Arc<dyn Dispatcher>, fanout: TaskTracker) -> Self {
        Self {
            queue,
            dispatcher,
            fanout,
        }
    }

    /// Run until the queue is cancelled.
    ///
    /// Handlers start in queue order: each one is polled once inline before
    /// it is moved to its own task, so later messages never overtake it,
    /// regardless of the scheduler.
    pub async fn run(self) -> Result<(), SirbotError> {
        debug!("dispatch loop started");
        let mut items = pin!(self.queue.stream());

        while let Some(item) = items.next().await {
            let (message, ack) = item.into_parts();
            trace!(source = %message.source, "incoming message");

            let mut handling = Box::pin(handle(Arc::clone(&self.dispatcher), message, ack));
            if futures::poll!(&mut handling).is_pending() {
                self.fanout.spawn(handling);
            }
        }

        debug!("incoming queue cancelled, dispatch loop stopping");
        Ok(())
    }
}

/// Hand one message to the dispatcher, log any failure, then acknowledge it.
async fn handle(dispatcher: Arc<dyn Dispatcher>, message: IncomingMessage, ack: Ack) {
    let IncomingMessage { source, payload } = message;
    let outcome = AssertUnwindSafe(dispatcher.incoming_message(&source, payload))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => trace!(source = %source, "message handled"),
        Ok(Err(e)) => error!(source = %source, error = %e, "message handler failed"),
        Err(panic) => error!(
            source = %source,
            panic = %panic_message(panic.as_ref()),
            "message handler panicked"
        ),
    }
    ack.done();
}
