//! Integration tests for the single-flight paginating gateway.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::{json, Value};

use bests_speedrun::gateway::{Gateway, GatewayConfig, GatewayError};
use bests_speedrun::memory::MemoryTransport;

const RUNS: &str = "runs?game=g&max=2";

fn gateway(transport: MemoryTransport) -> (Gateway, Arc<MemoryTransport>) {
    gateway_with_ttl(transport, GatewayConfig::default().cache_ttl)
}

fn gateway_with_ttl(transport: MemoryTransport, cache_ttl: Duration) -> (Gateway, Arc<MemoryTransport>) {
    let transport = Arc::new(transport);
    let config = GatewayConfig {
        cache_ttl,
        ..GatewayConfig::default()
    };
    (Gateway::new(transport.clone(), config), transport)
}

fn linked_page(items: Value, has_next: bool) -> Value {
    let links = if has_next {
        json!([{ "rel": "next", "uri": "https://example.test/next" }])
    } else {
        json!([{ "rel": "prev", "uri": "https://example.test/prev" }])
    };
    json!({ "data": items, "pagination": { "max": 2, "links": links } })
}

fn three_pages() -> MemoryTransport {
    MemoryTransport::new()
        .respond(RUNS, linked_page(json!([1, 2]), true))
        .respond(format!("{RUNS}&offset=2"), linked_page(json!([3, 4]), true))
        .respond(format!("{RUNS}&offset=4"), linked_page(json!([5, 6]), false))
}

// ---------------------------------------------------------------------------
// Single flight
// ---------------------------------------------------------------------------

/// Two concurrent calls for one path issue one request and share its records.
#[tokio::test]
async fn test_concurrent_calls_share_one_request() {
    let (gateway, transport) =
        gateway(common::slow(MemoryTransport::new().respond(RUNS, common::page(vec![json!(1)]))));

    let (a, b) = tokio::join!(gateway.fetch(RUNS), gateway.fetch(RUNS));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*a, vec![json!(1)]);
    assert_eq!(transport.request_count(RUNS).await, 1);
}

/// Attached callers observe the very same failure.
#[tokio::test]
async fn test_concurrent_calls_share_one_failure() {
    let (gateway, transport) = gateway(common::slow(
        MemoryTransport::new().respond(RUNS, json!({ "status": 404, "message": "Game not found" })),
    ));

    let (a, b) = tokio::join!(gateway.fetch(RUNS), gateway.fetch(RUNS));

    let a = a.unwrap_err();
    assert_eq!(a, b.unwrap_err());
    assert_eq!(a.to_string(), "404: Game not found");
    assert_eq!(transport.request_count(RUNS).await, 1);
}

/// Completed fetches are served from the cache.
#[tokio::test]
async fn test_success_is_cached() {
    let (gateway, transport) =
        gateway(MemoryTransport::new().respond(RUNS, common::page(vec![json!("x")])));

    gateway.fetch(RUNS).await.unwrap();
    gateway.fetch(RUNS).await.unwrap();

    assert_eq!(transport.request_count(RUNS).await, 1);
    assert_eq!(gateway.cached_paths().await, 1);
}

/// A failed fetch is evicted, so the next call re-attempts it.
#[tokio::test]
async fn test_failure_is_evicted_and_retried() {
    let (gateway, transport) = gateway(
        MemoryTransport::new()
            .fail(RUNS, GatewayError::Request("connection reset".into()))
            .respond(RUNS, common::page(vec![json!("ok")])),
    );

    assert_matches!(gateway.fetch(RUNS).await, Err(GatewayError::Request(_)));
    assert_eq!(gateway.cached_paths().await, 0);

    let records = gateway.fetch(RUNS).await.unwrap();
    assert_eq!(*records, vec![json!("ok")]);
    assert_eq!(transport.request_count(RUNS).await, 2);
}

/// A fetch keeps running after its only caller gives up on it.
#[tokio::test]
async fn test_abandoned_fetch_still_completes() {
    let (gateway, transport) =
        gateway(common::slow(MemoryTransport::new().respond(RUNS, common::page(vec![json!(1)]))));

    let abandoned = tokio::time::timeout(Duration::from_millis(1), gateway.fetch(RUNS)).await;
    assert!(abandoned.is_err());

    let records = gateway.fetch(RUNS).await.unwrap();
    assert_eq!(*records, vec![json!(1)]);
    assert_eq!(transport.request_count(RUNS).await, 1);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Records older than the cache lifetime are fetched again.
#[tokio::test]
async fn test_expired_records_are_refetched() {
    let (gateway, transport) = gateway_with_ttl(
        MemoryTransport::new()
            .respond(RUNS, common::page(vec![json!("old")]))
            .respond(RUNS, common::page(vec![json!("new")])),
        Duration::from_millis(50),
    );

    assert_eq!(*gateway.fetch(RUNS).await.unwrap(), vec![json!("old")]);
    assert_eq!(*gateway.fetch(RUNS).await.unwrap(), vec![json!("old")]);
    assert_eq!(transport.request_count(RUNS).await, 1);

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(*gateway.fetch(RUNS).await.unwrap(), vec![json!("new")]);
    assert_eq!(transport.request_count(RUNS).await, 2);
}

/// With no cache lifetime, only in-flight requests are shared.
#[tokio::test]
async fn test_zero_ttl_still_coalesces_in_flight_requests() {
    let (gateway, transport) = gateway_with_ttl(
        common::slow(MemoryTransport::new().respond(RUNS, common::page(vec![json!(1)]))),
        Duration::ZERO,
    );

    let (a, b) = tokio::join!(gateway.fetch(RUNS), gateway.fetch(RUNS));
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(transport.request_count(RUNS).await, 1);

    gateway.fetch(RUNS).await.unwrap();
    assert_eq!(transport.request_count(RUNS).await, 2);
}

/// Expired entries are swept rather than accumulating.
#[tokio::test]
async fn test_expired_entries_are_swept() {
    let (gateway, _) = gateway_with_ttl(
        MemoryTransport::new()
            .respond("users/a", common::user_body("a", "A"))
            .respond("users/b", common::user_body("b", "B")),
        Duration::ZERO,
    );

    gateway.fetch("users/a").await.unwrap();
    gateway.fetch("users/b").await.unwrap();

    assert_eq!(gateway.cached_paths().await, 1);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Three linked pages of two items come back as six items in page order.
#[tokio::test]
async fn test_pages_are_concatenated_in_order() {
    let (gateway, transport) = gateway(three_pages());

    let records = gateway.fetch(RUNS).await.unwrap();

    assert_eq!(*records, vec![json!(1), json!(2), json!(3), json!(4), json!(5), json!(6)]);
    assert_eq!(
        transport.requests().await,
        vec![
            RUNS.to_string(),
            format!("{RUNS}&offset=2"),
            format!("{RUNS}&offset=4"),
        ]
    );
}

/// Following more pages than allowed is a hard failure.
#[tokio::test]
async fn test_too_many_pages_overflow() {
    let (gateway, transport) = gateway(three_pages());

    let err = gateway.fetch_with_limit(RUNS, 2).await.unwrap_err();

    assert_matches!(
        &err,
        GatewayError::PaginationOverflow { max_pages: 2, offset: 4, .. }
    );
    assert_eq!(
        err.to_string(),
        "got too many results for runs?game=g&max=2 (more than 2 pages/4 items)"
    );
    assert_eq!(transport.requests().await.len(), 2);
}

/// An error document on a later page fails the whole fetch.
#[tokio::test]
async fn test_error_on_later_page_fails_fetch() {
    let (gateway, _) = gateway(
        MemoryTransport::new()
            .respond(RUNS, linked_page(json!([1, 2]), true))
            .respond(
                format!("{RUNS}&offset=2"),
                json!({ "status": 420, "message": "Slow down" }),
            ),
    );

    assert_matches!(
        gateway.fetch(RUNS).await,
        Err(GatewayError::ApiStatus { status, message }) if status == "420" && message == "Slow down"
    );
}

// ---------------------------------------------------------------------------
// Single resources
// ---------------------------------------------------------------------------

/// A non-array `data` is returned as one record.
#[tokio::test]
async fn test_fetch_one_returns_object_data() {
    let (gateway, _) = gateway(MemoryTransport::new().respond("users/zpr", common::user_body("u1", "ZPR")));

    let user = gateway.fetch_one("users/zpr").await.unwrap();

    assert_eq!(user["id"], "u1");
}

/// Empty data cannot satisfy a single-resource fetch.
#[tokio::test]
async fn test_fetch_one_without_data_is_a_decode_error() {
    let (gateway, _) = gateway(MemoryTransport::new().respond("users/none", json!({ "data": null })));

    assert_matches!(
        gateway.fetch_one("users/none").await,
        Err(GatewayError::Decode { path, .. }) if path == "users/none"
    );
}
