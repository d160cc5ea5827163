// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mutable handle to the host's HTTP router.
//!
//! Clients receive a `&mut HostRouter` during `configure` and may register
//! routes (webhooks, OAuth callbacks) on it before the host starts serving.

use axum::Router;
use axum::routing::MethodRouter;

use crate::error::SirbotError;

/// Accumulates routes for the host application.
#[derive(Debug, Default)]
pub struct HostRouter {
    router: Router,
    paths: Vec<String>,
}

impl HostRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `path`.
    ///
    /// Fails if `path` does not start with `/` or is already registered.
    pub fn route(
        &mut self,
        path: &str,
        method_router: MethodRouter,
    ) -> Result<&mut Self, SirbotError> {
        if !path.starts_with('/') {
            return Err(SirbotError::Host {
                message: format!("route path `{path}` must start with `/`"),
                source: None,
            });
        }
        if self.paths.iter().any(|p| p == path) {
            return Err(SirbotError::Host {
                message: format!("route `{path}` is already registered"),
                source: None,
            });
        }

        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, method_router);
        self.paths.push(path.to_string());
        Ok(self)
    }

    /// Paths registered so far, in registration order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
