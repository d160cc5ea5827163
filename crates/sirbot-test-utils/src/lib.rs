// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Sirbot integration tests.
//!
//! Provides mock plugins and a harness for fast, deterministic,
//! CI-runnable engine tests without external chat backends.
//!
//! # Components
//!
//! - [`MockClient`] - Scripted client provider with payload injection
//! - [`RecordingDispatcher`] - Dispatcher that records invocations
//! - [`MockPlugin`] - Plugin bundling the two
//! - [`TestHarness`] - Catalog plus matching configuration

pub mod harness;
pub mod mock_client;
pub mod mock_plugin;
pub mod recording_dispatcher;

pub use harness::TestHarness;
pub use mock_client::{ConnectOutcome, MockClient};
pub use mock_plugin::MockPlugin;
pub use recording_dispatcher::RecordingDispatcher;
