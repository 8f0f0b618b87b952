//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use oms_client::{ClientConfig, OrderService};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    /// Instance base URL, `http://127.0.0.1:<port>/api/`.
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = format!("{}/api/", server.url());
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
    }

    /// Create a service pointed at the mock server
    pub fn service(&self) -> OrderService {
        self.service_with(self.config())
    }

    pub fn service_with(&self, config: ClientConfig) -> OrderService {
        OrderService::from_config(&config).expect("mock server config is valid")
    }

    /// Create a mock for a JSON response to `POST /api/{path}`
    pub async fn mock_post_json(&self, path: &str, status: usize, body: &Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", format!("/api/{}", path).as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Like [`Self::mock_post_json`], but only for request bodies containing
    /// `partial`.
    pub async fn mock_post_matching(
        &self,
        path: &str,
        partial: Value,
        status: usize,
        body: &Value,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", format!("/api/{}", path).as_str())
            .match_body(Matcher::PartialJson(partial))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create a mock for a JSON response to `GET /api/{path}`, expected
    /// exactly `hits` times
    pub async fn mock_get_json(&self, path: &str, body: &Value, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", format!("/api/{}", path).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }
}
