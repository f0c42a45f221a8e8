//! Process a list of ids through a `$batch` endpoint.
//!
//! Usage:
//!   BATCH_BASE_URL=https://graph.example.com/v1.0 \
//!   BATCH_TOKEN=... \
//!   RUST_LOG=batchplex=debug cargo run --example process_batch
//!
//! `BATCHPLEX_*` variables override the run configuration (see `BatchConfig::from_env`).

use batchplex::{BatchProcessor, HttpBatchTransport, RequestFields};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("batchplex=info")),
        )
        .init();

    let base_url = std::env::var("BATCH_BASE_URL")
        .unwrap_or_else(|_| "https://graph.example.com/v1.0".to_string());

    // Authentication is the caller's concern: bake it into the client.
    let mut headers = HeaderMap::new();
    if let Ok(token) = std::env::var("BATCH_TOKEN") {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }
    let client = reqwest::Client::builder().default_headers(headers).build()?;

    let transport = Arc::new(HttpBatchTransport::with_client(client, &base_url)?);
    let processor = BatchProcessor::builder(transport).build()?;
    println!("config: {:?}", processor.config());

    let ids: Vec<String> = (1..=45).map(|i| format!("user-{:03}", i)).collect();
    let result = processor
        .process_batch(ids, |id| RequestFields::get(format!("/users/{}", id)))
        .await?;

    println!(
        "succeeded: {}, failed: {} ({:.0}% success)",
        result.success_count(),
        result.failure_count(),
        result.success_rate() * 100.0
    );
    for (id, error) in result.failed.iter().take(10) {
        println!("  {} -> {}", id, error);
    }
    Ok(())
}
