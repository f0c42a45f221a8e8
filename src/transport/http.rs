use super::{BatchTransport, TransportError};
use crate::types::{RequestDescriptor, SubResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_BATCH_PATH: &str = "/$batch";

#[derive(Serialize)]
struct BatchRequestEnvelope<'a> {
    requests: &'a [RequestDescriptor],
}

#[derive(Deserialize)]
struct BatchResponseEnvelope {
    responses: Vec<SubResponse>,
}

/// Sends groups to a JSON `$batch` endpoint over HTTP.
///
/// Authentication is left to the caller: pass a preconfigured
/// `reqwest::Client` (default headers, middleware) to [`with_client`](Self::with_client).
pub struct HttpBatchTransport {
    client: reqwest::Client,
    base_url: Url,
    batch_path: String,
}

impl HttpBatchTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("BATCHPLEX_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(
                env::var("BATCHPLEX_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::configuration_with_context(
                "invalid batch endpoint base URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("http_transport"),
            )
        })?;
        Ok(Self {
            client,
            base_url,
            batch_path: DEFAULT_BATCH_PATH.to_string(),
        })
    }

    /// Override the batch path appended to the base URL (default `/$batch`).
    pub fn with_batch_path(mut self, path: impl Into<String>) -> Self {
        self.batch_path = path.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.batch_path
        )
    }

    /// Raw `Retry-After` value; interpretation is left to the retry controller.
    fn retry_after(headers: &HeaderMap) -> Option<String> {
        let s = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    }

    /// Error text of a failed envelope: `error.message` when the body is JSON, the raw body otherwise.
    fn envelope_error_message(status: u16, body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")?
                    .get("message")?
                    .as_str()
                    .map(|s| s.to_string())
            })
            .or_else(|| {
                let b = body.trim();
                (!b.is_empty()).then(|| b.to_string())
            })
            .unwrap_or_else(|| format!("batch request failed with status {}", status))
    }
}

#[async_trait]
impl BatchTransport for HttpBatchTransport {
    async fn execute(&self, requests: &[RequestDescriptor]) -> Result<Vec<SubResponse>> {
        let url = self.endpoint();
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .json(&BatchRequestEnvelope { requests })
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status().as_u16();
        debug!(
            http_status = status,
            requests = requests.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "batch envelope received"
        );

        if !resp.status().is_success() {
            let retry_after = Self::retry_after(resp.headers());
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(http_status = status, error = %e, "failed to read error envelope body");
                    String::new()
                }
            };
            return Err(Error::Remote {
                status: Some(status),
                message: Self::envelope_error_message(status, &body),
                retry_after,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let envelope: BatchResponseEnvelope = serde_json::from_slice(&bytes)?;
        Ok(envelope.responses)
    }
}
