// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the Sirbot plugin architecture.
//!
//! A [`Plugin`] is a compiled-in module exposing zero or more capability
//! providers. Each capability kind has its own provider trait returning a
//! value that satisfies a named contract ([`Client`] or [`Dispatcher`]).

pub mod client;
pub mod dispatcher;
pub mod plugin;

pub use client::{Client, ClientProvider, NamedClient};
pub use dispatcher::{Dispatcher, DispatcherProvider, NamedDispatcher};
pub use plugin::Plugin;
