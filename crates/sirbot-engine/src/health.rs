// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GET /health: engine liveness for load balancers and operators.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::routing::{MethodRouter, get};
use serde::Serialize;
use sirbot_core::{ClientState, TaskStatus};

use crate::engine::EngineState;

/// Path the health handler is mounted on.
pub const HEALTH_PATH: &str = "/health";

/// Response body for GET /health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when a client or task has failed.
    pub status: String,
    pub version: String,
    pub clients: BTreeMap<String, ClientState>,
    pub tasks: BTreeMap<String, TaskStatus>,
    /// Messages waiting to be pulled by the dispatch loop.
    pub queued: usize,
    /// Messages pushed but not yet acknowledged.
    pub unfinished: usize,
    /// Message handlers currently running.
    pub in_flight: usize,
}

impl HealthResponse {
    pub(crate) fn from_state(state: &EngineState) -> Self {
        let clients = state.clients.states();
        let tasks = state.tasks.statuses();

        let degraded = clients.values().any(|s| *s == ClientState::Failed)
            || tasks.values().any(|s| {
                matches!(
                    s,
                    TaskStatus::Completed | TaskStatus::Failed(_) | TaskStatus::Panicked(_)
                )
            });

        Self {
            status: if degraded { "degraded" } else { "ok" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            clients,
            tasks,
            queued: state.queue.len(),
            unfinished: state.queue.unfinished(),
            in_flight: state.fanout.len(),
        }
    }
}

/// The health handler, bound to `state`.
pub(crate) fn handler(state: Arc<EngineState>) -> MethodRouter {
    get(get_health).with_state(state)
}

async fn get_health(State(state): State<Arc<EngineState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}
