//! # batchplex
//!
//! Runs large collections of API operations through a multiplexed batch endpoint
//! (one HTTP call carrying many sub-requests, such as a JSON `$batch` API).
//!
//! ## Overview
//!
//! - **Chunking**: items are split into fixed-size groups, one batch call each
//! - **Bounded concurrency**: at most `concurrency` groups in flight, admitted no
//!   faster than once per `dispatch_interval`
//! - **Rate-limit retries**: a 429 envelope replays the whole group after the
//!   server's retry hint or the configured delay
//! - **Reconciliation**: every input item ends up exactly once in either
//!   [`BatchResult::successful`] or [`BatchResult::failed`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batchplex::{BatchProcessor, HttpBatchTransport, RequestFields};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> batchplex::Result<()> {
//!     let transport = Arc::new(HttpBatchTransport::new("https://graph.example.com/v1.0")?);
//!     let processor = BatchProcessor::builder(transport).build()?;
//!
//!     let ids: Vec<u32> = (1..=45).collect();
//!     let result = processor
//!         .process_batch(ids, |id| RequestFields::get(format!("/users/{}", id)))
//!         .await?;
//!
//!     println!("{} ok, {} failed", result.success_count(), result.failure_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Chunker, scheduler, retry controller, reconciler, processor |
//! | [`config`] | Run configuration with defaults and env overrides |
//! | [`transport`] | Batch Executor trait and HTTP implementation |
//! | [`resilience`] | Dispatch throttle |
//! | [`telemetry`] | Injected event sinks |
//! | [`types`] | Requests, sub-responses, groups, outcomes |

pub mod batch;
pub mod config;
pub mod resilience;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use batch::{BatchProcessor, BatchProcessorBuilder};
pub use config::BatchConfig;
pub use telemetry::{BatchEvent, EventSink};
pub use transport::{BatchTransport, HttpBatchTransport};
pub use types::{
    BatchResult, Group, GroupResult, Method, Outcome, RequestDescriptor, RequestFields,
    SubResponse,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
