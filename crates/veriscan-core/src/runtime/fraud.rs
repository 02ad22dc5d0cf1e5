// crates/veriscan-core/src/runtime/fraud.rs
// ============================================================================
// Module: Veriscan Duplicate-Serial Detection
// Description: Pairwise geofence analysis over a rolling scan window.
// Purpose: Flag serial numbers reused across improbable distances and times.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Duplicate-serial detection considers all scans of one serial inside a
//! sliding 24-hour window ending at the most recent scan. Every pair of
//! scans whose great-circle distance exceeds the duplicate threshold is an
//! offending pair; pair severity escalates for short time deltas or very
//! large distances. Detection is pure over the supplied records; alert
//! deduplication and persistence belong to the engine's monitor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::fraud::DuplicateSerialFinding;
use crate::core::fraud::OffendingPair;
use crate::core::fraud::Severity;
use crate::core::geo::ScanRecord;
use crate::core::geo::great_circle_distance_km;
use crate::core::identifiers::SerialNumber;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Rolling detection window in milliseconds (24 hours).
pub const DUPLICATE_WINDOW_MS: i64 = 24 * 60 * 60 * 1_000;
/// Distance beyond which a scan pair is classified as a duplicate.
pub const DUPLICATE_DISTANCE_KM: f64 = 50.0;
/// Distance beyond which a duplicate pair is high severity.
pub const HIGH_SEVERITY_DISTANCE_KM: f64 = 500.0;
/// Time delta below which a duplicate pair is high severity (1 hour).
pub const HIGH_SEVERITY_DELTA_MS: i64 = 60 * 60 * 1_000;

// ============================================================================
// SECTION: Detection
// ============================================================================

/// Severity for one offending pair.
const fn pair_severity(distance_km: f64, delta_millis: i64) -> Severity {
    if delta_millis < HIGH_SEVERITY_DELTA_MS || distance_km > HIGH_SEVERITY_DISTANCE_KM {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Runs duplicate-serial detection over the scans of one serial.
///
/// `scans` must contain only scans of `serial`; the window is anchored at
/// the most recent record, and records outside the rolling window are
/// ignored. Returns `None` when no pair violates the geofence constraint.
#[must_use]
pub fn find_duplicate_serial(
    serial: &SerialNumber,
    scans: &[ScanRecord],
) -> Option<DuplicateSerialFinding> {
    let window_end = scans.iter().map(|scan| scan.recorded_at).max()?;
    let window_start = window_end.saturating_sub_millis(DUPLICATE_WINDOW_MS);

    let mut windowed: Vec<&ScanRecord> =
        scans.iter().filter(|scan| scan.recorded_at >= window_start).collect();
    windowed.sort_by_key(|scan| scan.recorded_at);

    let mut pairs = Vec::new();
    let mut severity = Severity::Medium;
    for (index, earlier) in windowed.iter().enumerate() {
        for later in &windowed[index + 1 ..] {
            let distance_km = great_circle_distance_km(earlier.location, later.location);
            if distance_km <= DUPLICATE_DISTANCE_KM {
                continue;
            }
            let delta_millis = later.recorded_at.delta_millis(earlier.recorded_at);
            let pair = OffendingPair {
                earlier: earlier.scan_id.clone(),
                later: later.scan_id.clone(),
                distance_km,
                delta_millis,
            };
            let pair_level = pair_severity(distance_km, delta_millis);
            if pair_level > severity {
                severity = pair_level;
            }
            pairs.push(pair);
        }
    }

    if pairs.is_empty() {
        return None;
    }

    Some(DuplicateSerialFinding {
        serial: serial.clone(),
        pairs,
        severity,
        window_end,
    })
}
