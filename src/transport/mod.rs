//! Batch Executor seam.
//!
//! A [`BatchTransport`] performs exactly one multiplexed round-trip per call.
//! Retries are separate invocations driven by [`crate::batch::retry`].

pub mod http;

pub use http::HttpBatchTransport;

use crate::types::{RequestDescriptor, SubResponse};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Submit `requests` as one batch call.
    ///
    /// On success the returned list answers `requests` one-to-one. Envelope
    /// failures are reported as [`crate::Error::Remote`] (status 429 signals
    /// rate limiting), network failures as [`crate::Error::Transport`] and
    /// undecodable envelopes as [`crate::Error::Serialization`].
    async fn execute(&self, requests: &[RequestDescriptor]) -> Result<Vec<SubResponse>>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
