// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin bundling an optional client and dispatcher.

use std::sync::Arc;

use sirbot_core::{ClientProvider, DispatcherProvider, Plugin};

use crate::mock_client::MockClient;
use crate::recording_dispatcher::RecordingDispatcher;

/// A plugin module assembled from test doubles.
#[derive(Clone)]
pub struct MockPlugin {
    name: String,
    client: Option<MockClient>,
    dispatcher: Option<RecordingDispatcher>,
}

impl MockPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            client: None,
            dispatcher: None,
        }
    }

    pub fn with_client(mut self, client: MockClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: RecordingDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn client_provider(&self) -> Option<Arc<dyn ClientProvider>> {
        self.client
            .clone()
            .map(|client| Arc::new(client) as Arc<dyn ClientProvider>)
    }

    fn dispatcher_provider(&self) -> Option<Arc<dyn DispatcherProvider>> {
        self.dispatcher
            .clone()
            .map(|dispatcher| Arc::new(dispatcher) as Arc<dyn DispatcherProvider>)
    }
}
