//! # Batch Engine
//!
//! Turns a list of caller items into multiplexed batch calls and reconciles the
//! answers back to the items.
//!
//! ```text
//! items ─► chunk ─► groups ─► scheduler ─► retry ─► transport ─► reconcile ─► BatchResult
//! ```
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`chunk`] | Fixed-size, order-preserving grouping |
//! | [`scheduler`] | Bounded concurrency with a minimum dispatch interval |
//! | [`retry`] | Whole-group replay on rate limits |
//! | [`reconcile`] | Sub-response to item matching and classification |
//! | [`BatchProcessor`] | Entry point tying the above together |
//!
//! ## Example
//!
//! ```rust,no_run
//! use batchplex::{BatchConfig, BatchProcessor, HttpBatchTransport, RequestFields};
//! use std::sync::Arc;
//!
//! # async fn demo() -> batchplex::Result<()> {
//! let transport = Arc::new(HttpBatchTransport::new("https://graph.example.com/v1.0")?);
//! let processor = BatchProcessor::builder(transport)
//!     .config(BatchConfig::new().with_batch_size(20).with_concurrency(2))
//!     .build()?;
//!
//! let user_ids = vec!["a1", "b2", "c3"];
//! let result = processor
//!     .process_batch(user_ids, |id| RequestFields::get(format!("/users/{}", id)))
//!     .await?;
//!
//! for (id, error) in &result.failed {
//!     eprintln!("{}: {}", id, error);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure handling
//!
//! - **Rate limited (429)**: the whole group is resubmitted after the server's
//!   `Retry-After` (seconds) or the configured retry delay, up to `max_retries` attempts.
//! - **Other envelope errors**: every item of the group fails with the error text.
//! - **Per-item errors**: only that item fails; its siblings are unaffected.

pub mod chunk;
mod processor;
pub mod reconcile;
pub mod retry;
pub mod scheduler;

pub use chunk::chunk;
pub use processor::{BatchProcessor, BatchProcessorBuilder};
pub use retry::{backoff_delay, execute_with_retry, RetryPolicy};
