// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incoming message queue for the Sirbot engine.
//!
//! Every connected client pushes `(source, payload)` pairs into one
//! [`IncomingQueue`]; the dispatch loop is its single consumer. The queue is
//! unbounded, so producers never wait on the consumer.
//!
//! Each pulled [`QueueItem`] carries an [`Ack`] token. The queue counts items
//! that were pushed but not yet acknowledged, and [`IncomingQueue::join`]
//! waits until that count reaches zero. Acknowledgement is tied to the token:
//! it happens exactly once, either through [`Ack::done`] or when the token is
//! dropped unacknowledged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Opaque message body as produced by a client.
pub type Payload = serde_json::Value;

/// A message received from a client, tagged with the client's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Name of the client that produced the message.
    pub source: String,
    /// Client-specific message body.
    pub payload: Payload,
}

impl IncomingMessage {
    pub fn new(source: impl Into<String>, payload: Payload) -> Self {
        Self {
            source: source.into(),
            payload,
        }
    }
}

/// Errors returned by queue producers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was closed or cancelled and no longer accepts messages.
    #[error("incoming queue is closed")]
    Closed,
}

/// Counters and signals shared by every handle to one queue.
struct Shared {
    /// Pushed but not yet acknowledged.
    unfinished: AtomicUsize,
    /// Pushed but not yet pulled.
    queued: AtomicUsize,
    accepting: AtomicBool,
    drained: Notify,
    closed: CancellationToken,
    cancel: CancellationToken,
}

impl Shared {
    fn acknowledge(&self) {
        let previous = self.unfinished.fetch_sub(1, Ordering::AcqRel);
        if previous == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Producer half of an [`IncomingQueue`].
///
/// Handed to clients so they can push messages without being able to
/// consume them.
#[derive(Clone)]
pub struct QueueSender {
    tx: mpsc::UnboundedSender<IncomingMessage>,
    shared: Arc<Shared>,
}

impl QueueSender {
    /// Enqueue a message. Never waits; fails only once the queue is closed.
    pub fn push(&self, source: impl Into<String>, payload: Payload) -> Result<(), QueueError> {
        self.push_message(IncomingMessage::new(source, payload))
    }

    /// Enqueue an already-built message.
    pub fn push_message(&self, message: IncomingMessage) -> Result<(), QueueError> {
        if !self.shared.accepting.load(Ordering::Acquire) || self.shared.cancel.is_cancelled() {
            return Err(QueueError::Closed);
        }

        // Count the item before it becomes visible so `join` never observes
        // zero while it is in flight.
        self.shared.unfinished.fetch_add(1, Ordering::AcqRel);
        self.shared.queued.fetch_add(1, Ordering::AcqRel);

        if self.tx.send(message).is_err() {
            self.shared.queued.fetch_sub(1, Ordering::AcqRel);
            self.shared.acknowledge();
            return Err(QueueError::Closed);
        }
        Ok(())
    }

    /// Returns true once the queue stopped accepting messages.
    pub fn is_closed(&self) -> bool {
        !self.shared.accepting.load(Ordering::Acquire) || self.shared.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for QueueSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSender")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Completion token for one pulled message.
///
/// Dropping an unacknowledged token acknowledges it, so an item can never
/// hold up [`IncomingQueue::join`] forever.
pub struct Ack {
    shared: Arc<Shared>,
    acknowledged: bool,
}

impl Ack {
    /// Mark the originating item as processed.
    pub fn done(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if !self.acknowledged {
            self.acknowledged = true;
            self.shared.acknowledge();
        }
    }
}

impl Drop for Ack {
    fn drop(&mut self) {
        if !self.acknowledged {
            debug!("queue item dropped without acknowledgement");
            self.complete();
        }
    }
}

impl std::fmt::Debug for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ack")
            .field("acknowledged", &self.acknowledged)
            .finish()
    }
}

/// A message pulled from the queue together with its completion token.
#[derive(Debug)]
pub struct QueueItem {
    pub message: IncomingMessage,
    pub ack: Ack,
}

impl QueueItem {
    pub fn source(&self) -> &str {
        &self.message.source
    }

    pub fn payload(&self) -> &Payload {
        &self.message.payload
    }

    /// Split the item so the message and its token can move independently.
    pub fn into_parts(self) -> (IncomingMessage, Ack) {
        (self.message, self.ack)
    }

    /// Acknowledge the item, discarding the message.
    pub fn done(self) {
        self.ack.done();
    }
}

/// Unbounded multi-producer queue of [`IncomingMessage`]s.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct IncomingQueue {
    sender: QueueSender,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<IncomingMessage>>>,
}

impl IncomingQueue {
    /// Create a queue with its own cancellation token.
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Create a queue that stops yielding items once `cancel` fires.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            unfinished: AtomicUsize::new(0),
            queued: AtomicUsize::new(0),
            accepting: AtomicBool::new(true),
            drained: Notify::new(),
            closed: CancellationToken::new(),
            cancel,
        });
        Self {
            sender: QueueSender { tx, shared },
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// A producer-only handle to this queue.
    pub fn sender(&self) -> QueueSender {
        self.sender.clone()
    }

    pub fn push(&self, source: impl Into<String>, payload: Payload) -> Result<(), QueueError> {
        self.sender.push(source, payload)
    }

    /// Pull the next item.
    ///
    /// Suspends until an item is available. Returns `None` once the queue is
    /// cancelled, or once it is closed and empty.
    pub async fn recv(&self) -> Option<QueueItem> {
        let shared = &self.sender.shared;

        let mut rx = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return None,
            rx = self.rx.lock() => rx,
        };

        let message = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return None,
            message = rx.recv() => message,
            _ = shared.closed.cancelled() => rx.try_recv().ok(),
        }?;

        shared.queued.fetch_sub(1, Ordering::AcqRel);
        trace!(source = %message.source, "incoming queue item pulled");

        Some(QueueItem {
            message,
            ack: Ack {
                shared: Arc::clone(shared),
                acknowledged: false,
            },
        })
    }

    /// A stream over the queue's items.
    ///
    /// Each call starts a fresh iteration over the same underlying queue. The
    /// stream ends cleanly on cancellation.
    pub fn stream(&self) -> impl Stream<Item = QueueItem> + Send + 'static {
        futures::stream::unfold(self.clone(), |queue| async move {
            let item = queue.recv().await?;
            Some((item, queue))
        })
    }

    /// Wait until every pushed item has been acknowledged.
    pub async fn join(&self) {
        let shared = &self.sender.shared;
        loop {
            let notified = shared.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if shared.unfinished.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting new messages. Items already queued can still be pulled.
    pub fn close(&self) {
        self.sender.shared.accepting.store(false, Ordering::Release);
        self.sender.shared.closed.cancel();
    }

    /// Wake every waiting consumer and end all iterations.
    pub fn cancel(&self) {
        self.sender.shared.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender.shared.cancel.is_cancelled()
    }

    /// Number of items pushed but not yet pulled.
    pub fn len(&self) -> usize {
        self.sender.shared.queued.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items pushed but not yet acknowledged.
    pub fn unfinished(&self) -> usize {
        self.sender.shared.unfinished.load(Ordering::Acquire)
    }
}

impl Default for IncomingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IncomingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingQueue")
            .field("queued", &self.len())
            .field("unfinished", &self.unfinished())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
