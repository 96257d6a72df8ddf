//! Common test utilities for in-process API testing.
//!
//! The fixture builds the real router over a SQLite store in a temp dir,
//! with a [`MockKvStore`] option for failure injection.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use animelog_core::{
    create_coordinator, testing::MockKvStore, Config, CoordinatorHandle, DatabaseConfig,
    KvStore, PlanningStore, RetryPolicy, SqliteKvStore, TrackerState,
};

/// Re-export fixtures for test convenience
pub use animelog_core::testing::fixtures;

/// Test fixture for API testing.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Direct access to the tracker, bypassing HTTP
    pub coordinator: CoordinatorHandle,
    /// Set when the fixture runs on the mock store
    pub mock_store: Option<Arc<MockKvStore>>,
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
    /// Fixture backed by an on-disk SQLite store.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let store: Arc<dyn KvStore> =
            Arc::new(SqliteKvStore::new(&db_path).expect("Failed to create store"));
        Self::build(store, None, temp_dir)
    }

    /// Fixture backed by a [`MockKvStore`] for failure injection.
    pub async fn with_mock_store() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mock = Arc::new(MockKvStore::new());
        Self::build(mock.clone(), Some(mock), temp_dir)
    }

    fn build(
        store: Arc<dyn KvStore>,
        mock_store: Option<Arc<MockKvStore>>,
        temp_dir: TempDir,
    ) -> Self {
        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            ..Default::default()
        };

        let retry = RetryPolicy {
            max_attempts: 2,
            initial_backoff: std::time::Duration::from_millis(1),
        };
        let (coordinator, writer) =
            create_coordinator(TrackerState::default(), Arc::clone(&store), retry, 64);
        tokio::spawn(writer.run());

        let planning = Arc::new(PlanningStore::new(store, retry));
        let state = Arc::new(animelog_server::state::AppState::new(
            config,
            coordinator.clone(),
            planning,
        ));
        let router = animelog_server::api::create_router(state);

        Self {
            router,
            coordinator,
            mock_store,
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

    /// Post one contract message.
    pub async fn message(&self, body: Value) -> TestResponse {
        self.post("/api/v1/messages", body).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain-text endpoint.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
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

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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
