//! Concurrency Scheduler.

use crate::resilience::DispatchThrottle;
use crate::types::{BatchResult, Group, GroupResult};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;

/// Run every group through `per_group` and collect the outcomes.
///
/// At most `concurrency` groups are in flight at once, and admissions are spaced
/// by at least `min_interval`. Outcomes are merged in completion order by this
/// task alone, so concurrent groups never touch the result directly. Returns only
/// after every group reached a terminal state.
pub async fn run<T, F, Fut>(
    groups: Vec<Group<T>>,
    concurrency: usize,
    min_interval: Duration,
    per_group: F,
) -> BatchResult<T>
where
    F: Fn(Group<T>) -> Fut,
    Fut: Future<Output = GroupResult<T>>,
{
    let throttle = DispatchThrottle::new(min_interval);
    let throttle = &throttle;
    let per_group = &per_group;

    let mut completed = futures::stream::iter(groups)
        .map(|group| async move {
            throttle.admit().await;
            per_group(group).await
        })
        .buffer_unordered(concurrency.max(1));

    let mut result = BatchResult::new();
    while let Some(outcomes) = completed.next().await {
        result.extend(outcomes);
    }
    result
}
