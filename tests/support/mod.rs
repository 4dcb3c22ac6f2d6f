#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use httpmock::MockServer;
use std::time::Duration;
use text_analytics::{ClientOptions, ServiceConfig};

/// Key the mock service expects in `Ocp-Apim-Subscription-Key`.
pub const KEY: &str = "test-key";

#[must_use]
pub fn config_for(server: &MockServer) -> ServiceConfig {
    ServiceConfig::new(server.base_url(), KEY).unwrap_or_else(|e| panic!("mock config: {e}"))
}

#[must_use]
pub fn fast_options() -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(1),
        max_polls: 3,
    }
}

#[must_use]
pub fn single_document(text: &str) -> serde_json::Value {
    serde_json::json!({ "documents": [{ "id": "1", "text": text }] })
}
