//! Test fixtures: a mock `$batch` HTTP server and a scripted in-process transport.

use async_trait::async_trait;
use batchplex::{BatchTransport, RequestDescriptor, SubResponse};
use mockito::{Mock, Server, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<AsyncMutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(AsyncMutex::new(server)),
            base_url,
        }
    }

    /// Create a mock for a `$batch` envelope with the given status and body
    pub async fn mock_batch(&self, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/$batch")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a rate-limited envelope carrying a `Retry-After` header
    pub async fn mock_rate_limited(&self, retry_after: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/$batch")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_header("retry-after", retry_after)
            .with_body(r#"{"error":{"code":"TooManyRequests","message":"slow down"}}"#)
            .expect(hits)
            .create_async()
            .await
    }
}

type Handler =
    dyn Fn(usize, &[RequestDescriptor]) -> batchplex::Result<Vec<SubResponse>> + Send + Sync;

/// In-process transport whose answers come from a closure.
///
/// The closure receives the 0-based call number and the submitted requests.
pub struct StubTransport {
    handler: Box<Handler>,
    latency: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    submitted: Mutex<Vec<Vec<RequestDescriptor>>>,
}

impl StubTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(usize, &[RequestDescriptor]) -> batchplex::Result<Vec<SubResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Box::new(handler),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every sub-request succeeds with its target echoed back.
    pub fn echo() -> Self {
        Self::new(|_, requests| Ok(echo_responses(requests)))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|g| g.len())
            .collect()
    }
}

#[async_trait]
impl BatchTransport for StubTransport {
    async fn execute(&self, requests: &[RequestDescriptor]) -> batchplex::Result<Vec<SubResponse>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(requests.to_vec());

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        (self.handler)(call, requests)
    }
}

pub fn echo_responses(requests: &[RequestDescriptor]) -> Vec<SubResponse> {
    requests
        .iter()
        .map(|r| {
            SubResponse::ok(serde_json::json!({ "url": r.target })).with_id(r.correlation_id.clone())
        })
        .collect()
}
