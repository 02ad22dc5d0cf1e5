// crates/veriscan-engine/tests/fraud_flow.rs
// ============================================================================
// Module: Fraud Flow Tests
// Description: Duplicate-serial monitoring, alert idempotence, and downgrades.
// Purpose: Ensure detection, deduplication, and invalidation compose end to end.
// ============================================================================

//! Fraud-monitor tests over the engine's scan-observation surface.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::time::Duration;

use veriscan_core::AttemptOutcome;
use veriscan_core::Confidence;
use veriscan_core::DUPLICATE_SERIAL_FLAG;
use veriscan_core::FraudKind;
use veriscan_core::GeoPoint;
use veriscan_core::ProductId;
use veriscan_core::ScanId;
use veriscan_core::ScanRecord;
use veriscan_core::SerialNumber;
use veriscan_core::Severity;
use veriscan_core::Timestamp;
use veriscan_core::VerificationMethod;
use veriscan_core::VerificationRequest;
use veriscan_engine::TrustEngine;
use veriscan_providers::CollectingAlertSink;
use veriscan_providers::InMemoryAlertLedger;
use veriscan_providers::InMemoryFeedbackStore;
use veriscan_providers::InMemoryScanHistory;
use veriscan_providers::ScriptedStrategy;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn engine_with_sink() -> (TrustEngine, Arc<CollectingAlertSink>) {
    let sink = Arc::new(CollectingAlertSink::new());
    let engine = TrustEngine::builder()
        .strategy(Arc::new(ScriptedStrategy::responding(
            VerificationMethod::Registry,
            AttemptOutcome::Pass,
            Confidence::new(0.95).unwrap(),
        )))
        .history(Arc::new(InMemoryScanHistory::new()))
        .feedback(Arc::new(InMemoryFeedbackStore::new()))
        .alert_sink(Arc::clone(&sink) as Arc<dyn veriscan_core::AlertSink>)
        .alert_ledger(Arc::new(InMemoryAlertLedger::new()))
        .build()
        .unwrap();
    (engine, sink)
}

fn scan(id: &str, serial: &str, lat: f64, lon: f64, at_millis: i64) -> ScanRecord {
    ScanRecord {
        scan_id: ScanId::parse(id).unwrap(),
        serial: SerialNumber::parse(serial).unwrap(),
        location: GeoPoint::new(lat, lon).unwrap(),
        recorded_at: Timestamp::from_unix_millis(at_millis),
    }
}

fn request(scan_id: &str, product: &str, serial: &str) -> VerificationRequest {
    VerificationRequest {
        scan_id: ScanId::parse(scan_id).unwrap(),
        product_id: ProductId::parse(product).unwrap(),
        serial: SerialNumber::parse(serial).unwrap(),
        batch: None,
        category: None,
        images: Vec::new(),
        requested_at: Timestamp::from_unix_millis(1_000),
    }
}

/// Waits until the sink holds `expected` alerts or the deadline passes.
async fn wait_for_alerts(sink: &CollectingAlertSink, expected: usize) -> usize {
    for _ in 0 .. 50 {
        let count = sink.alerts().lock().unwrap().len();
        if count >= expected {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    sink.alerts().lock().unwrap().len()
}

// ============================================================================
// SECTION: Duplicate Detection and Idempotence
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn impossible_travel_emits_exactly_one_alert() {
    let (engine, sink) = engine_with_sink();

    // Berlin, then Warsaw ten minutes later: roughly 520 km apart.
    let first = engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    assert!(first.is_none());

    let second = engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();
    let alert = second.unwrap();
    assert_eq!(alert.kind, FraudKind::SerialClone);
    assert_eq!(alert.severity, Severity::High);
    assert!(alert.affected.contains("SN-X"));

    assert_eq!(wait_for_alerts(&sink, 1).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn replaying_the_same_pair_is_idempotent() {
    let (engine, sink) = engine_with_sink();

    engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    let alert = engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();
    assert!(alert.is_some());

    // Replaying the identical pair of scans must not produce a second
    // alert for the same window.
    let replay_one = engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    let replay_two = engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();
    assert!(replay_one.is_none());
    assert!(replay_two.is_none());

    assert_eq!(wait_for_alerts(&sink, 1).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn nearby_scans_never_alert() {
    let (engine, _sink) = engine_with_sink();

    engine.observe_scan(scan("s1", "SN-Y", 52.52, 13.405, 0)).await.unwrap();
    let outcome =
        engine.observe_scan(scan("s2", "SN-Y", 52.53, 13.41, 30 * 60 * 1_000)).await.unwrap();

    assert!(outcome.is_none());
    assert!(!engine.is_serial_flagged(&SerialNumber::parse("SN-Y").unwrap()));
}

#[tokio::test(flavor = "multi_thread")]
async fn a_new_pair_in_the_window_alerts_again() {
    let (engine, sink) = engine_with_sink();

    engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();

    // A third distant scan introduces new offending pairs (s1, s3) and
    // (s2, s3), which are distinct from the already-alerted pair.
    let third = engine
        .observe_scan(scan("s3", "SN-X", 48.1351, 11.582, 20 * 60 * 1_000))
        .await
        .unwrap();
    assert!(third.is_some());

    assert_eq!(wait_for_alerts(&sink, 2).await, 2);
}

// ============================================================================
// SECTION: Verifier Downgrade
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn flagged_serial_downgrades_subsequent_verification() {
    let (engine, _sink) = engine_with_sink();

    // Before any fraud evidence the serial verifies authentic.
    let before = engine.verify_product(&request("scan-a", "p-1", "SN-X")).await;
    assert!(before.is_authentic);

    engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();
    assert!(engine.is_serial_flagged(&SerialNumber::parse("SN-X").unwrap()));

    let after = engine.verify_product(&request("scan-b", "p-1", "SN-X")).await;
    assert!(!after.is_authentic);
    assert!(after.flags.contains(DUPLICATE_SERIAL_FLAG));
}

#[tokio::test(flavor = "multi_thread")]
async fn downgraded_verification_raises_serial_clone_alert() {
    let (engine, sink) = engine_with_sink();

    engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();
    wait_for_alerts(&sink, 1).await;

    // The downgraded verdict keeps the cascade's 0.95 confidence, which is
    // above the alert floor, so verification emits a serial-clone alert.
    let result = engine.verify_product(&request("scan-b", "p-1", "SN-X")).await;
    assert!(!result.is_authentic);

    let count = wait_for_alerts(&sink, 2).await;
    assert_eq!(count, 2);
    let alerts = sink.alerts();
    let alerts = alerts.lock().unwrap();
    assert!(alerts.iter().all(|alert| alert.kind == FraudKind::SerialClone));
}

// ============================================================================
// SECTION: Cache Invalidation on Alerts
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn fraud_alert_invalidates_cached_scores() {
    let (engine, _sink) = engine_with_sink();

    // Prime the cache with an authentic score for the product.
    let before = engine.calculate_trust_score(&request("scan-a", "p-1", "SN-X")).await.unwrap();
    assert!((before.overall - 95.0).abs() < 1e-6);

    engine.observe_scan(scan("s1", "SN-X", 52.52, 13.405, 0)).await.unwrap();
    engine
        .observe_scan(scan("s2", "SN-X", 52.2297, 21.0122, 10 * 60 * 1_000))
        .await
        .unwrap();

    // The alert invalidated the cache entry; the next request recomputes
    // against the downgraded serial and reflects the clone flag.
    let after = engine.calculate_trust_score(&request("scan-a", "p-1", "SN-X")).await.unwrap();
    assert!((after.overall - 0.0).abs() < 1e-6, "got {}", after.overall);
}
