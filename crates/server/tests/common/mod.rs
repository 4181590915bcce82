//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock classifier injected, enabling comprehensive E2E testing
//! without calling the real Gemini API.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use triage_core::{
    testing::MockClassifier, Classifier, Config, GeminiConfig, OrchestratorConfig,
    SqliteTicketStore, TicketStore, TriageOrchestrator,
};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use triage_core::testing::fixtures;

/// Test fixture for E2E testing with a mock classifier.
///
/// Provides an in-process server whose orchestrator classifies tickets
/// through a fully controllable MockClassifier.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock classifier - configure classification results and errors
    pub classifier: Arc<MockClassifier>,
    /// The orchestrator driving background classification
    pub orchestrator: Arc<TriageOrchestrator>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture; the orchestrator is created but not started.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Create a test fixture with the orchestrator already running.
    pub async fn started() -> Self {
        Self::build(true).await
    }

    async fn build(start_orchestrator: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            gemini: GeminiConfig {
                api_key: "test-key".to_string(),
                model: "gemini-1.5-flash".to_string(),
                temperature: 0.3,
                max_tokens: 1000,
                api_base: "http://127.0.0.1:1".to_string(),
                timeout_secs: 5,
            },
            server: triage_core::config::ServerConfig::default(),
            database: triage_core::config::DatabaseConfig {
                path: db_path.clone(),
            },
            orchestrator: OrchestratorConfig {
                workers: 2,
                queue_capacity: 64,
            },
        };

        let ticket_store: Arc<dyn TicketStore> = Arc::new(
            SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"),
        );

        let classifier = Arc::new(MockClassifier::new());

        let orchestrator = Arc::new(TriageOrchestrator::new(
            config.orchestrator.clone(),
            Arc::clone(&ticket_store),
            Arc::clone(&classifier) as Arc<dyn Classifier>,
        ));
        if start_orchestrator {
            orchestrator.start().await;
        }

        let state = Arc::new(triage_server::state::AppState::new(
            config,
            ticket_store,
            Arc::clone(&orchestrator),
        ));

        let router = triage_server::api::create_router(state);

        Self {
            router,
            classifier,
            orchestrator,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Poll a ticket until it reaches the expected status or the timeout expires.
    pub async fn wait_for_status(&self, ticket_id: &str, expected: &str) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let response = self.get(&format!("/api/v1/tickets/{}", ticket_id)).await;
            if response.body["status"] == expected {
                return response.body;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "ticket {} did not reach {} in time, last seen: {}",
                    ticket_id, expected, response.body["status"]
                );
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
