// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sirbot chat-bot framework.
//!
//! This crate provides the capability traits, error type, and common types
//! used throughout the Sirbot workspace. Every plugin implements traits
//! defined here.

pub mod error;
pub mod router;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SirbotError;
pub use router::HostRouter;
pub use types::{CapabilityKind, ClientConfig, ClientState, TaskStatus};

pub use traits::{
    Client, ClientProvider, Dispatcher, DispatcherProvider, NamedClient, NamedDispatcher, Plugin,
};

pub use sirbot_queue::{
    Ack, IncomingMessage, IncomingQueue, Payload, QueueError, QueueItem, QueueSender,
};
