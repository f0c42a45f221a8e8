//! Observability for batch runs.
//!
//! The engine never logs through process-wide state. It reports typed
//! [`BatchEvent`]s to an [`EventSink`] handed to the
//! [`BatchProcessor`](crate::BatchProcessor) at construction time.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchEvent`] | Typed event enum |
//! | [`EventSink`] | Trait for event destinations |
//! | [`TracingEventSink`] | Default sink, forwards to `tracing` |
//! | [`NoopEventSink`] | Discards everything |
//! | [`InMemoryEventSink`] | Captures events for tests |
//! | [`CompositeEventSink`] | Multi-destination composite sink |
//!
//! Events are advisory; nothing in the engine depends on what a sink does with them.

use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Severity a sink should attach to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A group was admitted by the scheduler.
    GroupDispatched { group: usize, size: usize },
    /// A group hit a rate limit and will be resubmitted after `delay`.
    RateLimited {
        group: usize,
        attempt: u32,
        delay: Duration,
    },
    /// A group failed terminally; all of its items were marked failed.
    GroupFailed {
        group: usize,
        attempt: u32,
        items: usize,
        error: String,
    },
    /// One sub-response inside an otherwise successful envelope failed.
    ItemFailed {
        group: usize,
        correlation_id: String,
        status: u16,
        message: String,
    },
    /// Summary emitted once every group reached a terminal state.
    RunCompleted {
        groups: usize,
        successful: usize,
        failed: usize,
        elapsed: Duration,
    },
}

impl BatchEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            BatchEvent::GroupDispatched { .. } => EventLevel::Debug,
            BatchEvent::RunCompleted { .. } => EventLevel::Info,
            BatchEvent::RateLimited { .. } | BatchEvent::ItemFailed { .. } => EventLevel::Warn,
            BatchEvent::GroupFailed { .. } => EventLevel::Error,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn report(&self, event: &BatchEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl From<EventLevel> for tracing::Level {
    fn from(level: EventLevel) -> Self {
        match level {
            EventLevel::Debug => tracing::Level::DEBUG,
            EventLevel::Info => tracing::Level::INFO,
            EventLevel::Warn => tracing::Level::WARN,
            EventLevel::Error => tracing::Level::ERROR,
        }
    }
}

// `tracing` needs the level at the call site, so fan out on it here.
macro_rules! emit {
    ($level:expr, $($args:tt)+) => {
        match $level {
            EventLevel::Debug => tracing::debug!($($args)+),
            EventLevel::Info => tracing::info!($($args)+),
            EventLevel::Warn => tracing::warn!($($args)+),
            EventLevel::Error => tracing::error!($($args)+),
        }
    };
}

impl EventSink for TracingEventSink {
    fn report(&self, event: &BatchEvent) {
        let level = event.level();
        match event {
            BatchEvent::GroupDispatched { group, size } => {
                emit!(level, group, size, "batch group dispatched");
            }
            BatchEvent::RateLimited {
                group,
                attempt,
                delay,
            } => {
                emit!(
                    level,
                    group,
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    "batch group rate limited, retrying"
                );
            }
            BatchEvent::GroupFailed {
                group,
                attempt,
                items,
                error,
            } => {
                emit!(
                    level,
                    group,
                    attempt,
                    items,
                    error = error.as_str(),
                    "batch group failed"
                );
            }
            BatchEvent::ItemFailed {
                group,
                correlation_id,
                status,
                message,
            } => {
                emit!(
                    level,
                    group,
                    correlation_id = correlation_id.as_str(),
                    status,
                    message = message.as_str(),
                    "batch item failed"
                );
            }
            BatchEvent::RunCompleted {
                groups,
                successful,
                failed,
                elapsed,
            } => {
                emit!(
                    level,
                    groups,
                    successful,
                    failed,
                    duration_ms = elapsed.as_millis() as u64,
                    "batch run completed"
                );
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn report(&self, _event: &BatchEvent) {}
}

pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoopEventSink)
}

pub fn tracing_sink() -> Arc<dyn EventSink> {
    Arc::new(TracingEventSink)
}

/// In-memory sink for testing.
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<BatchEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> Vec<BatchEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(|e| e.into_inner()).len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Rate-limit retries recorded so far.
    pub fn retries(&self) -> Vec<(usize, u32, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::RateLimited {
                    group,
                    attempt,
                    delay,
                } => Some((group, attempt, delay)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn report(&self, event: &BatchEvent) {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Composite sink for multiple destinations.
#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }
    pub fn add_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for CompositeEventSink {
    fn report(&self, event: &BatchEvent) {
        for s in &self.sinks {
            s.report(event);
        }
    }
}
