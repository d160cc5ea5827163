// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook client.
//!
//! Registers a POST route on the host. Each JSON body posted to it becomes
//! one incoming message from the `webhook` client. Requests are buffered in
//! a bounded channel and forwarded into the incoming queue only while the
//! client is connected.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde::Deserialize;
use sirbot_core::{
    Client, ClientConfig, ClientProvider, HostRouter, NamedClient, Payload, Plugin, QueueSender,
    SirbotError,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Name of the webhook client and of its configuration section.
pub const WEBHOOK_CLIENT: &str = "webhook";

/// Settings read from the `[webhook]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookSettings {
    /// Route the webhook listens on.
    pub path: String,
    /// Bearer token callers must present. No token means no auth.
    pub token: Option<String>,
    /// Requests buffered before the route answers 503.
    pub capacity: usize,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            path: "/webhook".to_string(),
            token: None,
            capacity: 1024,
        }
    }
}

/// Shared state for the webhook route.
#[derive(Clone)]
struct WebhookState {
    tx: mpsc::Sender<Payload>,
    token: Option<Arc<str>>,
}

/// The webhook client.
pub struct WebhookClient {
    queue: QueueSender,
    inbox: Mutex<Option<mpsc::Receiver<Payload>>>,
}

impl WebhookClient {
    pub fn new(queue: QueueSender) -> Self {
        Self {
            queue,
            inbox: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Client for WebhookClient {
    fn configure(
        &mut self,
        config: &ClientConfig,
        router: &mut HostRouter,
    ) -> Result<(), SirbotError> {
        let settings: WebhookSettings = config.parse()?;
        if settings.capacity == 0 {
            return Err(SirbotError::client(
                WEBHOOK_CLIENT,
                "capacity must be greater than zero",
            ));
        }

        let (tx, rx) = mpsc::channel(settings.capacity);
        let state = WebhookState {
            tx,
            token: settings.token.as_deref().map(Arc::from),
        };
        router.route(&settings.path, post(receive).with_state(state))?;
        *self.inbox.get_mut() = Some(rx);

        info!(
            path = %settings.path,
            authenticated = settings.token.is_some(),
            "webhook route registered"
        );
        Ok(())
    }

    async fn connect(&self) -> Result<(), SirbotError> {
        let mut inbox = self.inbox.lock().await;
        let Some(rx) = inbox.as_mut() else {
            return Err(SirbotError::client(
                WEBHOOK_CLIENT,
                "connect called before configure",
            ));
        };

        debug!("webhook client connected");
        while let Some(payload) = rx.recv().await {
            self.queue.push(WEBHOOK_CLIENT, payload)?;
        }
        Err(SirbotError::client(WEBHOOK_CLIENT, "webhook route dropped"))
    }
}

/// POST handler: authenticate, then hand the body to the connected client.
async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(payload): Json<Payload>,
) -> StatusCode {
    if let Some(expected) = &state.token {
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_ref()) {
            warn!("webhook request rejected: bad or missing bearer token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    match state.tx.try_send(payload) {
        Ok(()) => StatusCode::ACCEPTED,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("webhook buffer full, rejecting request");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(mpsc::error::TrySendError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

struct WebhookProvider;

impl ClientProvider for WebhookProvider {
    fn client(&self, queue: QueueSender) -> Option<NamedClient> {
        Some(NamedClient::new(WEBHOOK_CLIENT, WebhookClient::new(queue)))
    }
}

/// The `sirbot.webhook` plugin module.
pub struct WebhookPlugin;

impl Plugin for WebhookPlugin {
    fn name(&self) -> &str {
        "sirbot.webhook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn client_provider(&self) -> Option<Arc<dyn ClientProvider>> {
        Some(Arc::new(WebhookProvider))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use sirbot_core::IncomingQueue;
    use tower::ServiceExt;

    use super::*;

    fn configured(section: serde_json::Value) -> (IncomingQueue, WebhookClient, axum::Router) {
        let queue = IncomingQueue::new();
        let mut client = WebhookClient::new(queue.sender());
        let mut router = HostRouter::new();
        client
            .configure(&ClientConfig::from_value(section), &mut router)
            .unwrap();
        (queue, client, router.into_router())
    }

    fn post_json(path: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
        let mut request = Request::post(path).header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    #[test]
    fn empty_section_uses_defaults() {
        let settings: WebhookSettings = ClientConfig::default().parse().unwrap();
        assert_eq!(settings, WebhookSettings::default());
    }

    #[test]
    fn unknown_setting_fails_configure() {
        let mut client = WebhookClient::new(IncomingQueue::new().sender());
        let err = client
            .configure(
                &ClientConfig::from_value(json!({"pth": "/x"})),
                &mut HostRouter::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("pth"));
    }

    #[tokio::test]
    async fn posted_body_reaches_the_queue_once_connected() {
        let (queue, client, router) = configured(json!({"path": "/hook"}));

        let response = router
            .oneshot(post_json("/hook", json!({"text": "hello"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(queue.is_empty());

        let connected = tokio::spawn(async move { client.connect().await });
        let item = tokio::time::timeout(Duration::from_secs(5), queue.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.source(), WEBHOOK_CLIENT);
        assert_eq!(item.payload(), &json!({"text": "hello"}));
        item.done();
        connected.abort();
    }

    #[tokio::test]
    async fn token_is_enforced() {
        let (_queue, _client, router) = configured(json!({"token": "s3cret"}));

        let response = router
            .clone()
            .oneshot(post_json("/webhook", json!("hi"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(post_json("/webhook", json!("hi"), Some("s3cret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn full_buffer_answers_503() {
        let (_queue, _client, router) = configured(json!({"capacity": 1}));

        let first = router
            .clone()
            .oneshot(post_json("/webhook", json!(1), None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = router
            .oneshot(post_json("/webhook", json!(2), None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn connect_before_configure_fails() {
        let client = WebhookClient::new(IncomingQueue::new().sender());
        assert!(client.connect().await.is_err());
    }
}
