// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sirbot framework.

use sirbot_queue::QueueError;
use thiserror::Error;

/// The primary error type used across Sirbot capability traits and the engine.
#[derive(Debug, Error)]
pub enum SirbotError {
    /// Configuration errors (invalid section, unparsable client settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// A plugin module named in `core.plugins` is not compiled in.
    #[error("plugin module not found: {module}")]
    PluginNotFound { module: String },

    /// No plugin provided a client.
    #[error("no client found")]
    NoClients,

    /// Client errors (configuration rejected, connection lost).
    #[error("client `{name}` error: {message}")]
    Client {
        name: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A dispatcher failed to handle a message.
    #[error("dispatch error for message from `{origin}`: {message}")]
    Dispatch {
        origin: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The incoming queue rejected a message.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// HTTP host errors (bind failure, server error, lifecycle hook failure).
    #[error("host error: {message}")]
    Host {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SirbotError {
    /// Shorthand for a [`SirbotError::Client`] without an underlying source.
    pub fn client(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`SirbotError::Dispatch`] without an underlying source.
    pub fn dispatch(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatch {
            origin: origin.into(),
            message: message.into(),
            source: None,
        }
    }
}
