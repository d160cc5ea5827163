// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The HTTP host application built on axum.
//!
//! Clients register routes on the host while they are configured, and
//! dispatchers contribute middleware. The host owns the process lifecycle:
//! startup hooks run before the listener accepts requests and cleanup hooks
//! run after it has stopped.

use std::future::Future;

use axum::Router;
use futures::FutureExt;
use futures::future::BoxFuture;
use sirbot_core::{HostRouter, SirbotError};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Wraps the final router, e.g. with a tower layer.
pub type Middleware = Box<dyn Fn(Router) -> Router + Send + Sync>;

/// A startup or cleanup hook.
pub type LifecycleHook = Box<dyn Fn() -> BoxFuture<'static, Result<(), SirbotError>> + Send + Sync>;

/// Routes, middleware, and lifecycle hooks of the HTTP host.
#[derive(Default)]
pub struct HostApp {
    router: HostRouter,
    middleware: Vec<Middleware>,
    startup: Vec<LifecycleHook>,
    cleanup: Vec<LifecycleHook>,
}

impl HostApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// The router clients register their routes on.
    pub fn router_mut(&mut self) -> &mut HostRouter {
        &mut self.router
    }

    /// Paths registered so far, in registration order.
    pub fn paths(&self) -> &[String] {
        self.router.paths()
    }

    /// Add middleware. It wraps the router when the host starts serving,
    /// so it also covers routes added after this call.
    pub fn add_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(Router) -> Router + Send + Sync + 'static,
    {
        self.middleware.push(Box::new(middleware));
    }

    /// Register a hook that runs before the host accepts requests.
    pub fn on_startup<F, Fut>(&mut self, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SirbotError>> + Send + 'static,
    {
        self.startup.push(Box::new(move || hook().boxed()));
    }

    /// Register a hook that runs after the host has stopped serving.
    pub fn on_cleanup<F, Fut>(&mut self, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SirbotError>> + Send + 'static,
    {
        self.cleanup.push(Box::new(move || hook().boxed()));
    }

    /// Run startup hooks in registration order, stopping at the first error.
    pub async fn startup(&self) -> Result<(), SirbotError> {
        debug!(hooks = self.startup.len(), "running startup hooks");
        for hook in &self.startup {
            hook().await?;
        }
        Ok(())
    }

    /// Run every cleanup hook in registration order.
    ///
    /// A failing hook does not prevent later hooks from running; the first
    /// error is returned once all have run.
    pub async fn cleanup(&self) -> Result<(), SirbotError> {
        debug!(hooks = self.cleanup.len(), "running cleanup hooks");
        let mut first_error = None;
        for hook in &self.cleanup {
            if let Err(e) = hook().await {
                error!(error = %e, "cleanup hook failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Take the registered routes and wrap them with every middleware.
    ///
    /// Routes registered after this call are not served.
    pub fn build_router(&mut self) -> Router {
        let router = std::mem::take(&mut self.router).into_router();
        self.middleware
            .iter()
            .fold(router, |router, middleware| middleware(router))
    }

    /// Bind `host:port` and serve until `shutdown` is cancelled.
    pub async fn run(
        self,
        host: &str,
        port: u16,
        shutdown: CancellationToken,
    ) -> Result<(), SirbotError> {
        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| SirbotError::Host {
                message: format!("failed to bind host to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled.
    ///
    /// Startup hooks run before the first request is accepted. Cleanup hooks
    /// run after the server stops, and also when a startup hook fails.
    pub async fn serve(
        mut self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), SirbotError> {
        if let Err(e) = self.startup().await {
            error!(error = %e, "startup failed, cleaning up");
            if let Err(cleanup_error) = self.cleanup().await {
                debug!(error = %cleanup_error, "cleanup after failed startup also failed");
            }
            return Err(e);
        }

        let router = self.build_router();
        match listener.local_addr() {
            Ok(addr) => info!("host listening on {addr}"),
            Err(_) => info!("host listening"),
        }

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| SirbotError::Host {
                message: format!("host server error: {e}"),
                source: Some(Box::new(e)),
            });

        info!("host stopped, running cleanup");
        let cleaned = self.cleanup().await;
        served.and(cleaned)
    }
}

impl std::fmt::Debug for HostApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostApp")
            .field("paths", &self.router.paths())
            .field("middleware", &self.middleware.len())
            .field("startup_hooks", &self.startup.len())
            .field("cleanup_hooks", &self.cleanup.len())
            .finish()
    }
}
