//! Mock control panel for testing
//!
//! This provides a fake panel that answers the client API endpoints the wipe
//! workflow calls, and lets tests inspect what was sent.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

use super::test_data::API_KEY;

/// Mock panel server that simulates panel HTTP responses
pub struct MockPanelServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockPanelServer {
    /// Create a new mock panel server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock the server metadata lookup
    pub async fn mock_metadata(&self, server_id: &str, name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/servers/{}", server_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "server",
                "attributes": {
                    "name": name,
                    "identifier": server_id,
                    "node": "test-node"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock every call that only needs a 204
    pub async fn mock_accepting_writes(&self, server_id: &str) {
        for (verb, suffix) in [
            ("POST", "/power"),
            ("POST", "/command"),
            ("POST", "/files/delete"),
            ("PUT", "/startup/variable"),
        ] {
            Mock::given(method(verb))
                .and(path(format!("/servers/{}{}", server_id, suffix)))
                .respond_with(ResponseTemplate::new(204))
                .mount(&self.server)
                .await;
        }
    }

    /// Mock the power signal endpoint with a failure
    pub async fn mock_power_failure(&self, server_id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/servers/{}/power", server_id)))
            .respond_with(ResponseTemplate::new(status).set_body_string("power failure"))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Mock the resource endpoint to always report `state`
    pub async fn mock_state(&self, server_id: &str, state: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/servers/{}/resources", server_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(resources(state)))
            .mount(&self.server)
            .await;
    }

    /// Mock the resource endpoint to report `state` for the next `times` polls only
    pub async fn mock_state_times(&self, server_id: &str, state: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/servers/{}/resources", server_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(resources(state)))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Mock the resource endpoint with an error status
    pub async fn mock_state_failure(&self, server_id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/servers/{}/resources", server_id)))
            .respond_with(ResponseTemplate::new(status).set_body_string("panel error"))
            .mount(&self.server)
            .await;
    }

    /// Mock a directory listing
    pub async fn mock_listing(&self, server_id: &str, directory: &str, names: &[&str]) {
        let data: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "object": "file_object",
                    "attributes": { "name": name, "is_file": true }
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/servers/{}/files/list", server_id)))
            .and(wiremock::matchers::query_param("directory", directory))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": data
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a directory listing failure
    pub async fn mock_listing_failure(&self, server_id: &str, directory: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/servers/{}/files/list", server_id)))
            .and(wiremock::matchers::query_param("directory", directory))
            .respond_with(ResponseTemplate::new(500).set_body_string("listing failed"))
            .mount(&self.server)
            .await;
    }

    /// All requests received so far
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received for one method and path
    pub async fn requests_to(&self, verb: &str, request_path: &str) -> Vec<Request> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == request_path)
            .collect()
    }

    /// JSON bodies received for one method and path
    pub async fn bodies_to(&self, verb: &str, request_path: &str) -> Vec<Value> {
        self.requests_to(verb, request_path)
            .await
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    pub fn api_key(&self) -> &'static str {
        API_KEY
    }
}

fn resources(state: &str) -> Value {
    json!({
        "object": "stats",
        "attributes": {
            "current_state": state,
            "is_suspended": false
        }
    })
}
