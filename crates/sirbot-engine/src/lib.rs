// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine lifecycle, client supervision, and message dispatch for Sirbot.
//!
//! The [`SirBot`] engine loads plugins, configures their clients against
//! an HTTP [`HostApp`], and on host startup runs every client plus a single
//! dispatch loop as supervised background tasks. On host cleanup those
//! tasks are cancelled and awaited, and in-flight message handlers are
//! given a bounded time to drain.

pub mod clients;
pub mod dispatch;
pub mod engine;
pub mod health;
pub mod host;
pub mod shutdown;
pub mod supervisor;

pub use clients::ClientRegistry;
pub use dispatch::{DispatchLoop, DispatcherSet};
pub use engine::SirBot;
pub use health::{HEALTH_PATH, HealthResponse};
pub use host::{HostApp, LifecycleHook, Middleware};
pub use shutdown::install_signal_handler;
pub use supervisor::{INCOMING_TASK, TaskTable};
