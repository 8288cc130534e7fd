//! Mock latest-release endpoint for testing

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const RELEASE_PATH: &str = "/repos/OxideMod/Oxide.Rust/releases/latest";

pub struct MockReleaseFeed {
    pub server: MockServer,
}

impl MockReleaseFeed {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), RELEASE_PATH)
    }

    /// Mock the latest release as published at `published_at` (RFC 3339)
    pub async fn mock_published_at(&self, published_at: &str) {
        Mock::given(method("GET"))
            .and(path(RELEASE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": "2.0.6000",
                "published_at": published_at
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock an error response for every check
    pub async fn mock_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(RELEASE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("rate limited"))
            .mount(&self.server)
            .await;
    }

    pub async fn check_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
