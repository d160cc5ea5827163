// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging dispatcher: records every incoming message and traces every
//! HTTP request served by the host.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use sirbot_core::{Dispatcher, DispatcherProvider, NamedDispatcher, Payload, Plugin, SirbotError};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Logs each message it receives at info level.
#[derive(Debug, Default)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn incoming_message(&self, source: &str, payload: Payload) -> Result<(), SirbotError> {
        info!(source = %source, payload = %payload, "incoming message");
        Ok(())
    }

    fn middleware(&self, router: Router) -> Router {
        router.layer(TraceLayer::new_for_http())
    }
}

struct LogProvider;

impl DispatcherProvider for LogProvider {
    fn dispatcher(&self) -> Option<NamedDispatcher> {
        Some(NamedDispatcher::new("log", LogDispatcher))
    }
}

/// The `sirbot.log` plugin module.
pub struct LogPlugin;

impl Plugin for LogPlugin {
    fn name(&self) -> &str {
        "sirbot.log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn dispatcher_provider(&self) -> Option<Arc<dyn DispatcherProvider>> {
        Some(Arc::new(LogProvider))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use serde_json::json;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn messages_are_logged_with_their_source() {
        LogDispatcher
            .incoming_message("webhook", json!({"text": "hello"}))
            .await
            .unwrap();
        assert!(logs_contain("incoming message"));
        assert!(logs_contain("source=webhook"));
    }

    #[tokio::test]
    async fn middleware_keeps_routes_working() {
        let routes = Router::new().route("/ping", get(|| async { "pong" }));
        let router = LogDispatcher.middleware(routes);
        let response = router
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
