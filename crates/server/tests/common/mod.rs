//! Common test utilities for in-process HTTP testing.
//!
//! This module provides a test fixture that builds the full router over a
//! temporary workspace with the fake tool runner injected, so conversions
//! can be exercised without the external tools installed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use formatshift_core::{testing::FakeToolRunner, Config, LimitsConfig};
use formatshift_server::state::AppState;

/// Re-export fixtures for test convenience
pub use formatshift_core::testing::fixtures;

const BOUNDARY: &str = "formatshift-test-boundary";

/// Test fixture for in-process HTTP testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new();
///     let form = MultipartForm::new().file("a.png", b"png").text("targetFormat", "jpg");
///     let response = fixture.post_multipart("/api/v1/convert", form).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Fake tool runner - inject failures, pages, unavailability
    pub runner: Arc<FakeToolRunner>,
    /// Workspace directory for uploads and outputs
    pub workspace: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON, or `Null` if it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

impl TestFixture {
    /// Create a new test fixture with default limits.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test fixture with custom limits.
    pub fn with_limits(limits: LimitsConfig) -> Self {
        Self::with_config(move |config| config.limits = limits)
    }

    /// Create a test fixture, adjusting the configuration first.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let workspace = TempDir::new().expect("Failed to create workspace");
        let runner = Arc::new(FakeToolRunner::new());

        let mut config = Config::default();
        config.workspace.dir = workspace.path().to_path_buf();
        adjust(&mut config);

        let state = Arc::new(AppState::new(config, runner.clone()));
        let router = formatshift_server::api::create_router(state);

        Self {
            router,
            runner,
            workspace,
        }
    }

    /// Files currently in the workspace.
    pub fn leftovers(&self) -> Vec<String> {
        fixtures::dir_listing(self.workspace.path())
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart POST request.
    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a raw body and content type.
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }
}

/// Builder for `multipart/form-data` bodies.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file part under the `files` field.
    pub fn file(mut self, file_name: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            String::from_utf8_lossy(&$response.bytes)
        );
    };
}
