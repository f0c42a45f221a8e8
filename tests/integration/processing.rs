//! Integration tests for the batch processor against scripted transports

use crate::integration::mock_server::{echo_responses, StubTransport};
use batchplex::batch::retry::MAX_RETRY_HINT;
use batchplex::telemetry::InMemoryEventSink;
use batchplex::{BatchConfig, BatchEvent, BatchProcessor, Error, RequestFields, SubResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn fast_config() -> BatchConfig {
    BatchConfig::new().with_dispatch_interval(Duration::ZERO)
}

fn processor(
    transport: Arc<StubTransport>,
    config: BatchConfig,
) -> (BatchProcessor, Arc<InMemoryEventSink>) {
    let sink = Arc::new(InMemoryEventSink::new());
    let processor = BatchProcessor::builder(transport)
        .config(config)
        .event_sink(sink.clone())
        .build()
        .expect("valid config");
    (processor, sink)
}

fn user_request(id: &u32) -> RequestFields {
    RequestFields::get(format!("/users/{}", id))
}

#[tokio::test(start_paused = true)]
async fn test_forty_five_items_in_three_groups() {
    let transport = Arc::new(StubTransport::echo());
    let (processor, sink) = processor(transport.clone(), fast_config().with_batch_size(20));

    let items: Vec<u32> = (0..45).collect();
    let result = processor.process_batch(items, user_request).await.unwrap();

    let mut sizes = transport.group_sizes();
    sizes.sort();
    assert_eq!(sizes, vec![5, 20, 20]);
    assert_eq!(result.success_count(), 45);
    assert!(result.failed.is_empty());

    let mut ids: Vec<u32> = result.successful.iter().map(|(id, _)| *id).collect();
    ids.sort();
    assert_eq!(ids, (0..45).collect::<Vec<_>>());

    // Bodies are matched to the item that produced the request
    for (id, body) in &result.successful {
        assert_eq!(body["url"], json!(format!("/users/{}", id)));
    }

    assert!(matches!(
        sink.events().last(),
        Some(BatchEvent::RunCompleted { groups: 3, successful: 45, failed: 0, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_once_then_success() {
    let transport = Arc::new(StubTransport::new(|call, requests| {
        if call == 0 {
            Err(Error::rate_limited(Some("1".to_string())))
        } else {
            Ok(echo_responses(requests))
        }
    }));
    let (processor, sink) = processor(transport.clone(), fast_config());

    let start = Instant::now();
    let result = processor
        .process_batch(vec![1u32, 2, 3], user_request)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 3);
    assert!(result.all_succeeded());
    assert_eq!(transport.calls(), 2);
    assert_eq!(sink.retries(), vec![(0, 1, Duration::from_secs(1))]);
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_retry_hint_overrides_retry_delay() {
    let transport = Arc::new(StubTransport::new(|call, requests| {
        if call == 0 {
            Err(Error::rate_limited(Some("5".to_string())))
        } else {
            Ok(echo_responses(requests))
        }
    }));
    let (processor, _sink) = processor(
        transport,
        fast_config().with_retry_delay(Duration::from_secs(1)),
    );

    let start = Instant::now();
    processor.process_batch(vec![7u32], user_request).await.unwrap();
    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(5));
    assert!(waited < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_oversized_hint_saturates_and_run_completes() {
    let transport = Arc::new(StubTransport::new(|call, requests| {
        if call == 0 {
            Err(Error::rate_limited(Some("1e30".to_string())))
        } else {
            Ok(echo_responses(requests))
        }
    }));
    let (processor, sink) = processor(transport.clone(), fast_config());

    let result = processor
        .process_batch(vec![1u32, 2], user_request)
        .await
        .unwrap();

    assert!(result.all_succeeded());
    assert_eq!(transport.calls(), 2);
    assert_eq!(sink.retries(), vec![(0, 1, MAX_RETRY_HINT)]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_hint_uses_retry_delay() {
    let transport = Arc::new(StubTransport::new(|call, requests| {
        if call == 0 {
            Err(Error::rate_limited(None))
        } else {
            Ok(echo_responses(requests))
        }
    }));
    let (processor, sink) = processor(
        transport,
        fast_config().with_retry_delay(Duration::from_millis(1000)),
    );

    processor.process_batch(vec![7u32], user_request).await.unwrap();
    assert_eq!(sink.retries(), vec![(0, 1, Duration::from_millis(1000))]);
}

#[tokio::test(start_paused = true)]
async fn test_single_item_not_found() {
    let transport = Arc::new(StubTransport::new(|_, requests| {
        let mut responses = echo_responses(requests);
        responses[2] = SubResponse::new(404)
            .with_id(requests[2].correlation_id.clone())
            .with_body(json!({"error": {"message": "not found"}}));
        Ok(responses)
    }));
    let (processor, sink) = processor(transport, fast_config());

    let result = processor
        .process_batch(vec![10u32, 11, 12, 13], user_request)
        .await
        .unwrap();

    assert_eq!(result.failed, vec![(12, "not found".to_string())]);
    let ok: Vec<u32> = result.successful.iter().map(|(id, _)| *id).collect();
    assert_eq!(ok, vec![10, 11, 13]);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        BatchEvent::ItemFailed { status: 404, message, .. } if message == "not found"
    )));
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_ceiling() {
    let transport = Arc::new(StubTransport::new(|_, _| {
        Err(Error::rate_limited(Some("1".to_string())))
    }));
    let (processor, sink) = processor(transport.clone(), fast_config().with_max_retries(1));

    let result = processor
        .process_batch(vec![1u32, 2, 3], user_request)
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(result.failure_count(), 3);
    assert!(result.successful.is_empty());
    assert!(sink.retries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_fail_whole_group() {
    let transport = Arc::new(StubTransport::new(|_, _| Err(Error::rate_limited(None))));
    let (processor, sink) = processor(
        transport.clone(),
        fast_config()
            .with_max_retries(3)
            .with_retry_delay(Duration::from_millis(10)),
    );

    let result = processor
        .process_batch(vec![1u32, 2], user_request)
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(sink.retries().len(), 2);
    for (_, error) in &result.failed {
        assert!(error.contains("429"), "unexpected error text: {}", error);
    }
}

#[tokio::test(start_paused = true)]
async fn test_group_loss_is_isolated() {
    // Second call (one whole group) fails at the envelope level
    let transport = Arc::new(StubTransport::new(|call, requests| {
        if call == 1 {
            Err(Error::remote(Some(500), "internal error"))
        } else {
            Ok(echo_responses(requests))
        }
    }));
    let (processor, _sink) = processor(
        transport.clone(),
        fast_config().with_batch_size(4).with_concurrency(1),
    );

    let items: Vec<u32> = (0..10).collect();
    let result = processor.process_batch(items, user_request).await.unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(result.total(), 10);
    let failed: Vec<u32> = result.failed.iter().map(|(id, _)| *id).collect();
    assert_eq!(failed, vec![4, 5, 6, 7]);
    assert!(result.failed[0].1.contains("internal error"));
}

#[tokio::test(start_paused = true)]
async fn test_no_item_lost_or_duplicated() {
    // Mixed failure modes across groups
    let transport = Arc::new(StubTransport::new(|call, requests| match call % 3 {
        0 => Ok(echo_responses(requests)),
        1 => Err(Error::remote(Some(403), "forbidden")),
        _ => Ok(requests
            .iter()
            .enumerate()
            .map(|(i, r)| {
                if i % 2 == 0 {
                    SubResponse::ok(json!({})).with_id(r.correlation_id.clone())
                } else {
                    SubResponse::new(400).with_error_message("bad request")
                }
            })
            .collect()),
    }));
    let (processor, _sink) = processor(
        transport,
        fast_config().with_batch_size(3).with_concurrency(3),
    );

    let items: Vec<u32> = (0..100).collect();
    let result = processor.process_batch(items, user_request).await.unwrap();

    assert_eq!(result.success_count() + result.failure_count(), 100);
    let mut all: Vec<u32> = result
        .successful
        .iter()
        .map(|(id, _)| *id)
        .chain(result.failed.iter().map(|(id, _)| *id))
        .collect();
    all.sort();
    assert_eq!(all, (0..100).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_limit_through_processor() {
    let transport =
        Arc::new(StubTransport::echo().with_latency(Duration::from_millis(200)));
    let (processor, _sink) = processor(
        transport.clone(),
        fast_config().with_batch_size(1).with_concurrency(2),
    );

    let result = processor
        .process_batch((0..10u32).collect(), user_request)
        .await
        .unwrap();

    assert_eq!(transport.calls(), 10);
    assert_eq!(transport.peak_active(), 2);
    assert_eq!(result.success_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_interval_spaces_groups() {
    let transport = Arc::new(StubTransport::echo());
    let (processor, _sink) = processor(
        transport,
        BatchConfig::new()
            .with_batch_size(1)
            .with_concurrency(5)
            .with_dispatch_interval(Duration::from_secs(1)),
    );

    let start = Instant::now();
    processor
        .process_batch((0..4u32).collect(), user_request)
        .await
        .unwrap();
    // 4 admissions need at least 3 full intervals
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_invalid_config_rejected_before_any_call() {
    let transport = Arc::new(StubTransport::echo());
    let (processor, _sink) = processor(transport.clone(), fast_config());

    let err = processor
        .process_batch_with_config(
            vec![1u32, 2],
            user_request,
            &fast_config().with_batch_size(0),
        )
        .await
        .unwrap_err();
    assert!(err.is_configuration());

    let err = processor
        .process_batch_with_config(vec![1u32], user_request, &fast_config().with_concurrency(0))
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(transport.calls(), 0);

    let built = BatchProcessor::builder(transport)
        .config(BatchConfig::new().with_concurrency(0))
        .build();
    assert!(built.is_err());
}

#[tokio::test]
async fn test_empty_input() {
    let transport = Arc::new(StubTransport::echo());
    let (processor, sink) = processor(transport.clone(), fast_config());

    let result = processor
        .process_batch(Vec::<u32>::new(), user_request)
        .await
        .unwrap();
    assert_eq!(result.total(), 0);
    assert_eq!(transport.calls(), 0);
    assert!(matches!(
        sink.events().last(),
        Some(BatchEvent::RunCompleted { groups: 0, successful: 0, failed: 0, .. })
    ));
}

#[tokio::test]
async fn test_builder_invoked_once_per_item() {
    let transport = Arc::new(StubTransport::echo());
    let (processor, _sink) = processor(transport, fast_config().with_batch_size(4));
    let calls = std::sync::atomic::AtomicUsize::new(0);

    let result = tokio_test::assert_ok!(
        processor
            .process_batch((0..9u32).collect(), |id| {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                RequestFields::post("/items")
                    .with_payload(json!({ "id": id }))
                    .with_header("Content-Type", "application/json")
            })
            .await
    );

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 9);
    assert!(result.all_succeeded());
}
