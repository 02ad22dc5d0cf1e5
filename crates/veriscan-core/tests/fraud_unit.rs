// crates/veriscan-core/tests/fraud_unit.rs
// ============================================================================
// Module: Duplicate-Serial Detection Unit Tests
// Description: Geofence thresholds, window anchoring, and severity escalation.
// Purpose: Ensure pairwise detection matches the distance and time rules exactly.
// ============================================================================

//! Duplicate-serial detection tests over synthetic scan histories.

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

use veriscan_core::GeoPoint;
use veriscan_core::ScanId;
use veriscan_core::ScanRecord;
use veriscan_core::SerialNumber;
use veriscan_core::Severity;
use veriscan_core::Timestamp;
use veriscan_core::find_duplicate_serial;
use veriscan_core::great_circle_distance_km;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// One hour in milliseconds.
const HOUR_MS: i64 = 60 * 60 * 1_000;

fn serial() -> SerialNumber {
    SerialNumber::parse("SN-77").unwrap()
}

fn scan(id: &str, lat: f64, lon: f64, at_millis: i64) -> ScanRecord {
    ScanRecord {
        scan_id: ScanId::parse(id).unwrap(),
        serial: serial(),
        location: GeoPoint::new(lat, lon).unwrap(),
        recorded_at: Timestamp::from_unix_millis(at_millis),
    }
}

// ============================================================================
// SECTION: Distance Function
// ============================================================================

#[test]
fn distance_is_symmetric_and_zero_at_identity() {
    let berlin = GeoPoint::new(52.52, 13.405).unwrap();
    let munich = GeoPoint::new(48.1351, 11.582).unwrap();

    let forward = great_circle_distance_km(berlin, munich);
    let backward = great_circle_distance_km(munich, berlin);

    assert!((forward - backward).abs() < 1e-9);
    // Berlin to Munich is roughly 500 km.
    assert!(forward > 450.0 && forward < 560.0, "got {forward}");
    assert!(great_circle_distance_km(berlin, berlin).abs() < 1e-9);
}

// ============================================================================
// SECTION: Detection Thresholds
// ============================================================================

#[test]
fn nearby_scans_are_not_duplicates() {
    // Two scans ~14 km apart within one city.
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 52.40, 13.50, 30 * 60 * 1_000),
    ];

    assert!(find_duplicate_serial(&serial(), &scans).is_none());
}

#[test]
fn distant_scans_inside_window_are_duplicates() {
    // Berlin and Munich, ten minutes apart: impossible travel.
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 48.1351, 11.582, 10 * 60 * 1_000),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    assert_eq!(finding.pairs.len(), 1);
    assert_eq!(finding.pairs[0].earlier.as_str(), "s1");
    assert_eq!(finding.pairs[0].later.as_str(), "s2");
    assert_eq!(finding.severity, Severity::High);
}

#[test]
fn moderate_distance_and_slow_pair_is_medium_severity() {
    // ~100 km apart, five hours apart: plausible clone, not impossible
    // travel.
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 51.70, 14.30, 5 * HOUR_MS),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    assert_eq!(finding.severity, Severity::Medium);
}

#[test]
fn very_large_distance_is_high_severity_even_when_slow() {
    // Berlin and Lisbon, twenty hours apart: distance alone escalates.
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 38.7223, -9.1393, 20 * HOUR_MS),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    assert_eq!(finding.severity, Severity::High);
}

#[test]
fn short_delta_is_high_severity_at_any_duplicate_distance() {
    // ~100 km in twenty minutes.
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 51.70, 14.30, 20 * 60 * 1_000),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    assert_eq!(finding.severity, Severity::High);
}

// ============================================================================
// SECTION: Window Anchoring
// ============================================================================

#[test]
fn scans_outside_window_are_ignored() {
    // The Munich scan is 30 hours before the latest scan and falls outside
    // the 24-hour window anchored at the most recent record.
    let scans = vec![
        scan("old", 48.1351, 11.582, 0),
        scan("new", 52.52, 13.405, 30 * HOUR_MS),
    ];

    assert!(find_duplicate_serial(&serial(), &scans).is_none());
}

#[test]
fn window_anchors_at_most_recent_scan() {
    let scans = vec![
        scan("s1", 52.52, 13.405, 10 * HOUR_MS),
        scan("s2", 48.1351, 11.582, 20 * HOUR_MS),
        scan("s3", 52.52, 13.405, 25 * HOUR_MS),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    assert_eq!(finding.window_end, Timestamp::from_unix_millis(25 * HOUR_MS));
    // All three records are inside the window; both cross-city pairs offend.
    assert_eq!(finding.pairs.len(), 2);
}

#[test]
fn empty_history_yields_no_finding() {
    assert!(find_duplicate_serial(&serial(), &[]).is_none());
}

#[test]
fn multiple_pairs_are_all_reported() {
    let scans = vec![
        scan("s1", 52.52, 13.405, 0),
        scan("s2", 48.1351, 11.582, HOUR_MS / 2),
        scan("s3", 50.11, 8.68, HOUR_MS),
    ];

    let finding = find_duplicate_serial(&serial(), &scans).unwrap();

    // Berlin/Munich, Berlin/Frankfurt, Munich/Frankfurt all exceed 50 km.
    assert_eq!(finding.pairs.len(), 3);
    assert_eq!(finding.severity, Severity::High);
}
