// crates/veriscan-core/src/runtime/classifier.rs
// ============================================================================
// Module: Veriscan Tampering Classifier
// Description: Indicator combination and confidence-threshold status mapping.
// Purpose: Convert independent indicator detections into one three-state status.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The classifier combines up to four independent indicator detections into
//! one confidence-backed status. The status mapping is a pure, table-driven
//! function of the combined confidence, testable in isolation from any
//! image-processing concern.
//! Invariants:
//! - Detections below the reporting floor are dropped entirely; they
//!   contribute neither to the indicator set nor to the combined confidence.
//! - `Tampered` requires at least one evidence region; an unbacked
//!   high-confidence combination downgrades to `Possible`.
//! - Zero supplied images yield no result at all; absence of evidence is
//!   not evidence of absence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::confidence::Confidence;
use crate::core::tampering::EvidenceRegion;
use crate::core::tampering::IndicatorSignal;
use crate::core::tampering::TamperingResult;
use crate::core::tampering::TamperingStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum detection confidence for an indicator to be reported at all.
pub const INDICATOR_REPORT_FLOOR: f64 = 0.40;
/// Exclusive lower bound of the `Tampered` status band.
pub const TAMPERED_THRESHOLD: f64 = 0.80;
/// Inclusive lower bound of the `Possible` status band.
pub const POSSIBLE_THRESHOLD: f64 = 0.50;

// ============================================================================
// SECTION: Status Mapping
// ============================================================================

/// Maps a combined confidence to the three-state display status.
///
/// Bands are non-overlapping: `confidence > 0.80` is `Tampered`,
/// `0.50 <= confidence <= 0.80` is `Possible`, and anything lower is
/// `Intact`.
#[must_use]
pub fn status_for_confidence(confidence: Confidence) -> TamperingStatus {
    let value = confidence.value();
    if value > TAMPERED_THRESHOLD {
        TamperingStatus::Tampered
    } else if value >= POSSIBLE_THRESHOLD {
        TamperingStatus::Possible
    } else {
        TamperingStatus::Intact
    }
}

// ============================================================================
// SECTION: Indicator Combination
// ============================================================================

/// Combines indicator detections into one classification result.
///
/// Returns `None` when `image_count` is zero: the parent signal is then
/// reported absent instead of defaulting to `Intact`.
#[must_use]
pub fn classify_indicators(
    image_count: usize,
    detections: &[IndicatorSignal],
) -> Option<TamperingResult> {
    if image_count == 0 {
        return None;
    }

    let mut indicators = BTreeSet::new();
    let mut evidence_regions = Vec::new();
    let mut combined = Confidence::ZERO;

    for detection in detections {
        if !detection.present || detection.confidence.value() < INDICATOR_REPORT_FLOOR {
            continue;
        }
        indicators.insert(detection.indicator);
        combined = combined.max(detection.confidence);
        if let Some(bounding_box) = detection.bounding_box {
            evidence_regions.push(EvidenceRegion {
                indicator: detection.indicator,
                bounding_box,
            });
        }
    }

    let mut status = status_for_confidence(combined);
    if status == TamperingStatus::Tampered && evidence_regions.is_empty() {
        status = TamperingStatus::Possible;
    }

    Some(TamperingResult {
        status,
        confidence: combined,
        indicators,
        evidence_regions,
    })
}
