//! Retry Controller
//!
//! Wraps one group's batch call. Rate-limited envelopes are replayed whole
//! (same requests, same correlation ids) until the attempt ceiling is reached;
//! any other failure is terminal. Terminal failures become data: every item of
//! the group turns into a failed outcome and nothing is raised to the caller.

use super::reconcile::{correlate, failure_message, reconcile};
use crate::config::BatchConfig;
use crate::telemetry::{BatchEvent, EventSink};
use crate::transport::BatchTransport;
use crate::types::{Group, GroupResult, Outcome, RequestDescriptor, SubResponse};
use crate::Error;
use std::time::Duration;

/// Configuration for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempt ceiling, counting the first attempt.
    pub max_retries: u32,
    /// Wait used when the server gives no usable retry hint.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }

    /// Delay before the next attempt, or `None` when `error` is terminal.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn should_retry(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if !error.is_rate_limited() || attempt >= self.max_retries {
            return None;
        }
        Some(backoff_delay(error.retry_hint(), self.base_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

/// Longest wait honoured from a server retry hint.
pub const MAX_RETRY_HINT: Duration = Duration::from_secs(3600);

/// Interpret a retry hint as seconds, falling back to `base` when absent or unparsable.
///
/// Negative hints clamp to zero; hints above [`MAX_RETRY_HINT`] saturate to it.
pub fn backoff_delay(hint: Option<&str>, base: Duration) -> Duration {
    match hint.and_then(|h| h.trim().parse::<f64>().ok()) {
        Some(secs) if secs.is_finite() => Duration::try_from_secs_f64(secs.max(0.0))
            .map_or(MAX_RETRY_HINT, |d| d.min(MAX_RETRY_HINT)),
        _ => base,
    }
}

/// Run one group to a terminal state.
pub async fn execute_with_retry<T>(
    transport: &dyn BatchTransport,
    group: Group<T>,
    policy: &RetryPolicy,
    sink: &dyn EventSink,
) -> GroupResult<T> {
    let mut attempt: u32 = 1;
    loop {
        match transport.execute(&group.requests).await {
            Ok(responses) => {
                let responses = correlate(&group.requests, responses);
                return match reconcile(&responses, group.items) {
                    Ok(outcomes) => {
                        report_item_failures(
                            group.index,
                            &group.requests,
                            &responses,
                            &outcomes,
                            sink,
                        );
                        outcomes
                    }
                    Err(mismatch) => {
                        let (err, items) = mismatch.into_parts();
                        fail_group(group.index, attempt, items, &err, sink)
                    }
                };
            }
            Err(err) => match policy.should_retry(attempt, &err) {
                Some(delay) => {
                    sink.report(&BatchEvent::RateLimited {
                        group: group.index,
                        attempt,
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return fail_group(group.index, attempt, group.items, &err, sink),
            },
        }
    }
}

fn fail_group<T>(
    index: usize,
    attempt: u32,
    items: Vec<T>,
    err: &Error,
    sink: &dyn EventSink,
) -> GroupResult<T> {
    let message = if err.is_rate_limited() {
        format!("rate limited after {} attempt(s): {}", attempt, err)
    } else {
        format!("batch request failed: {}", err)
    };
    sink.report(&BatchEvent::GroupFailed {
        group: index,
        attempt,
        items: items.len(),
        error: err.to_string(),
    });
    items
        .into_iter()
        .map(|item| Outcome::failure(item, message.clone()))
        .collect()
}

fn report_item_failures<T>(
    index: usize,
    requests: &[RequestDescriptor],
    responses: &[SubResponse],
    outcomes: &[Outcome<T>],
    sink: &dyn EventSink,
) {
    for ((req, resp), outcome) in requests.iter().zip(responses).zip(outcomes) {
        if !outcome.is_success() {
            sink.report(&BatchEvent::ItemFailed {
                group: index,
                correlation_id: req.correlation_id.clone(),
                status: resp.status_code,
                message: failure_message(resp),
            });
        }
    }
}
