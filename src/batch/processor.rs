//! Top-level batch operation.

use super::chunk::chunk;
use super::retry::{execute_with_retry, RetryPolicy};
use super::scheduler;
use crate::config::BatchConfig;
use crate::telemetry::{BatchEvent, EventSink};
use crate::transport::BatchTransport;
use crate::types::{BatchResult, Group, RequestFields};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;

/// Builder for [`BatchProcessor`].
pub struct BatchProcessorBuilder {
    transport: Arc<dyn BatchTransport>,
    config: Option<BatchConfig>,
    sink: Arc<dyn EventSink>,
}

impl BatchProcessorBuilder {
    pub fn new(transport: Arc<dyn BatchTransport>) -> Self {
        Self {
            transport,
            config: None,
            sink: crate::telemetry::tracing_sink(),
        }
    }

    /// Use `config` instead of [`BatchConfig::from_env`].
    pub fn config(mut self, config: BatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject an event sink. Default forwards to `tracing`.
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<BatchProcessor> {
        let config = self.config.unwrap_or_else(BatchConfig::from_env);
        config.validate()?;
        Ok(BatchProcessor {
            transport: self.transport,
            config,
            sink: self.sink,
        })
    }
}

/// Splits work into groups, runs them through the batch endpoint under bounded
/// concurrency, and partitions the per-item outcomes.
///
/// The transport connection is shared read-only by all in-flight groups.
pub struct BatchProcessor {
    transport: Arc<dyn BatchTransport>,
    config: BatchConfig,
    sink: Arc<dyn EventSink>,
}

impl BatchProcessor {
    pub fn builder(transport: Arc<dyn BatchTransport>) -> BatchProcessorBuilder {
        BatchProcessorBuilder::new(transport)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process `items` with the processor's configuration.
    ///
    /// `builder` is called once per item to describe its request. Only a
    /// configuration error is returned as `Err`; remote and per-item failures
    /// end up in [`BatchResult::failed`].
    pub async fn process_batch<T, F>(&self, items: Vec<T>, builder: F) -> Result<BatchResult<T>>
    where
        F: Fn(&T) -> RequestFields,
    {
        self.process_batch_with_config(items, builder, &self.config)
            .await
    }

    /// Same as [`process_batch`](Self::process_batch) with a per-call configuration.
    pub async fn process_batch_with_config<T, F>(
        &self,
        items: Vec<T>,
        builder: F,
        config: &BatchConfig,
    ) -> Result<BatchResult<T>>
    where
        F: Fn(&T) -> RequestFields,
    {
        config.validate()?;
        let start = Instant::now();

        let groups: Vec<Group<T>> = chunk(items, config.batch_size)?
            .into_iter()
            .enumerate()
            .map(|(index, items)| Group::build(index, items, &builder))
            .collect();
        let group_count = groups.len();

        let policy = RetryPolicy::from_config(config);
        let policy = &policy;
        let transport = self.transport.as_ref();
        let sink = self.sink.as_ref();

        let result = scheduler::run(
            groups,
            config.concurrency,
            config.dispatch_interval,
            move |group| async move {
                sink.report(&BatchEvent::GroupDispatched {
                    group: group.index,
                    size: group.len(),
                });
                execute_with_retry(transport, group, policy, sink).await
            },
        )
        .await;

        sink.report(&BatchEvent::RunCompleted {
            groups: group_count,
            successful: result.success_count(),
            failed: result.failure_count(),
            elapsed: start.elapsed(),
        });
        Ok(result)
    }
}
