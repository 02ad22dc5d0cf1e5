// crates/veriscan-core/tests/proptest_score.rs
// ============================================================================
// Module: Score Aggregation Property-Based Tests
// Description: Property tests for renormalization and range invariants.
// Purpose: Detect invariant violations across wide input ranges.
// ============================================================================

//! Property-based tests for aggregation and classification invariants.

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

use proptest::prelude::*;
use veriscan_core::Confidence;
use veriscan_core::GeoPoint;
use veriscan_core::SignalResult;
use veriscan_core::SignalSource;
use veriscan_core::SignalWeights;
use veriscan_core::TamperingStatus;
use veriscan_core::Timestamp;
use veriscan_core::TrustSignals;
use veriscan_core::TrustValue;
use veriscan_core::combine_signals;
use veriscan_core::great_circle_distance_km;
use veriscan_core::status_for_confidence;

// ============================================================================
// SECTION: Strategies
// ============================================================================

fn trust_signal(
    value: f64,
    present: bool,
    source: SignalSource,
) -> SignalResult<TrustValue> {
    if present {
        SignalResult::present(TrustValue::clamped(value), Confidence::FULL, source)
    } else {
        SignalResult::absent(source, "absent")
    }
}

/// Status band rank for monotonicity checks.
const fn status_rank(status: TamperingStatus) -> u8 {
    match status {
        TamperingStatus::Intact => 0,
        TamperingStatus::Possible => 1,
        TamperingStatus::Tampered => 2,
    }
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn overall_stays_in_range_for_any_present_subset(
        a in 0.0f64..=100.0,
        t in 0.0f64..=100.0,
        f in 0.0f64..=100.0,
        s in 0.0f64..=100.0,
        mask in 1u8..16,
    ) {
        let signals = TrustSignals {
            authenticity: trust_signal(a, mask & 1 != 0, SignalSource::Registry),
            tampering: trust_signal(t, mask & 2 != 0, SignalSource::TamperClassifier),
            freshness: trust_signal(f, mask & 4 != 0, SignalSource::Freshness),
            social_proof: trust_signal(s, mask & 8 != 0, SignalSource::SocialProof),
        };
        let score = combine_signals(
            signals,
            &SignalWeights::BASE,
            Timestamp::from_unix_millis(0),
        )
        .unwrap();
        prop_assert!(score.overall >= 0.0 - 1e-9);
        prop_assert!(score.overall <= 100.0 + 1e-9);
    }

    #[test]
    fn full_set_matches_direct_weighted_sum(
        a in 0.0f64..=100.0,
        t in 0.0f64..=100.0,
        f in 0.0f64..=100.0,
        s in 0.0f64..=100.0,
    ) {
        let signals = TrustSignals {
            authenticity: trust_signal(a, true, SignalSource::Registry),
            tampering: trust_signal(t, true, SignalSource::TamperClassifier),
            freshness: trust_signal(f, true, SignalSource::Freshness),
            social_proof: trust_signal(s, true, SignalSource::SocialProof),
        };
        let score = combine_signals(
            signals,
            &SignalWeights::BASE,
            Timestamp::from_unix_millis(0),
        )
        .unwrap();
        let expected = 0.30 * a + 0.30 * t + 0.25 * f + 0.15 * s;
        prop_assert!((score.overall - expected).abs() < 1e-6);
    }

    #[test]
    fn missing_signal_count_drives_confidence(
        value in 0.0f64..=100.0,
        mask in 1u8..16,
    ) {
        let signals = TrustSignals {
            authenticity: trust_signal(value, mask & 1 != 0, SignalSource::Registry),
            tampering: trust_signal(value, mask & 2 != 0, SignalSource::TamperClassifier),
            freshness: trust_signal(value, mask & 4 != 0, SignalSource::Freshness),
            social_proof: trust_signal(value, mask & 8 != 0, SignalSource::SocialProof),
        };
        let present = u32::from(mask.count_ones());
        let score = combine_signals(
            signals,
            &SignalWeights::BASE,
            Timestamp::from_unix_millis(0),
        )
        .unwrap();
        let expected = f64::from(present) / 4.0;
        prop_assert!((score.confidence.value() - expected).abs() < 1e-9);
        prop_assert_eq!(score.missing_signals.len(), 4 - present as usize);
    }

    #[test]
    fn status_mapping_is_total_and_monotone(
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let low_status = status_for_confidence(Confidence::new(low).unwrap());
        let high_status = status_for_confidence(Confidence::new(high).unwrap());
        prop_assert!(status_rank(low_status) <= status_rank(high_status));
    }

    #[test]
    fn distance_is_symmetric_and_non_negative(
        lat_a in -90.0f64..=90.0,
        lon_a in -180.0f64..=180.0,
        lat_b in -90.0f64..=90.0,
        lon_b in -180.0f64..=180.0,
    ) {
        let a = GeoPoint::new(lat_a, lon_a).unwrap();
        let b = GeoPoint::new(lat_b, lon_b).unwrap();
        let forward = great_circle_distance_km(a, b);
        let backward = great_circle_distance_km(b, a);
        prop_assert!(forward >= 0.0);
        prop_assert!((forward - backward).abs() < 1e-6);
        // Half the Earth's circumference bounds any great-circle distance.
        prop_assert!(forward <= 20_100.0);
    }
}
