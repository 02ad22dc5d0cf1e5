// crates/veriscan-core/src/core/tampering.rs
// ============================================================================
// Module: Veriscan Tampering Records
// Description: Tamper indicators, evidence regions, and classification results.
// Purpose: Capture packaging-tamper evidence with confidence-backed status.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Tampering classification combines four independent indicator detections
//! into one confidence-backed status. Evidence regions locate the detections
//! in the submitted images. User corrections are append-only feedback
//! records; an emitted [`TamperingResult`] is never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::confidence::Confidence;
use crate::core::identifiers::ProductId;
use crate::core::identifiers::ScanId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Images
// ============================================================================

/// Opaque reference to a captured image.
///
/// # Invariants
/// - `image_id` is assigned by the capture layer and treated as opaque.
/// - `sha256_hex`, when present, is the lowercase hex digest of the image
///   bytes and participates in request fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageRef {
    /// Capture-layer image identifier.
    pub image_id: String,
    /// Optional content digest of the image bytes.
    pub sha256_hex: Option<String>,
}

// ============================================================================
// SECTION: Indicators
// ============================================================================

/// The four independent tamper indicators.
///
/// # Invariants
/// - Variants are stable for serialization and detector registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TamperIndicator {
    /// Security seal is broken.
    BrokenSeal,
    /// Label is misaligned relative to its expected position.
    MisalignedLabel,
    /// Adhesive residue from re-sealing.
    AdhesiveResidue,
    /// Box deformation consistent with opening.
    BoxDeformation,
}

impl TamperIndicator {
    /// All indicators in canonical order.
    pub const ALL: [Self; 4] = [
        Self::BrokenSeal,
        Self::MisalignedLabel,
        Self::AdhesiveResidue,
        Self::BoxDeformation,
    ];

    /// Returns the stable wire name for the indicator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrokenSeal => "broken_seal",
            Self::MisalignedLabel => "misaligned_label",
            Self::AdhesiveResidue => "adhesive_residue",
            Self::BoxDeformation => "box_deformation",
        }
    }
}

impl fmt::Display for TamperIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned bounding box in image pixel coordinates.
///
/// # Invariants
/// - `width` and `height` are non-negative; no further validation is applied
///   because detector output is advisory evidence, not control input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
}

/// One indicator detection reported by an external detector.
///
/// # Invariants
/// - `present == false` means the detector saw no evidence; its confidence
///   is then ignored by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSignal {
    /// The indicator this detection refers to.
    pub indicator: TamperIndicator,
    /// Whether the detector saw evidence of the indicator.
    pub present: bool,
    /// Detector confidence in the detection.
    pub confidence: Confidence,
    /// Region of the image backing the detection, when localized.
    pub bounding_box: Option<BoundingBox>,
}

/// An evidence region retained on a classification result.
///
/// # Invariants
/// - Regions reference indicators that are members of the result's
///   indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRegion {
    /// Indicator the region belongs to.
    pub indicator: TamperIndicator,
    /// Bounding box of the evidence in the source image.
    pub bounding_box: BoundingBox,
}

// ============================================================================
// SECTION: Classification Result
// ============================================================================

/// Three-state tampering display status.
///
/// # Invariants
/// - Status is a pure function of the combined confidence; see
///   [`crate::runtime::classifier::status_for_confidence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TamperingStatus {
    /// No tampering evidence above the reporting threshold.
    Intact,
    /// Evidence warrants manual inspection.
    Possible,
    /// Evidence-backed tampering.
    Tampered,
}

impl TamperingStatus {
    /// Returns the stable wire name for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intact => "intact",
            Self::Possible => "possible",
            Self::Tampered => "tampered",
        }
    }
}

impl fmt::Display for TamperingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one packaging analysis call.
///
/// # Invariants
/// - `indicators` holds only detections at or above the reporting threshold.
/// - `status == Tampered` implies `evidence_regions` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamperingResult {
    /// Three-state display status.
    pub status: TamperingStatus,
    /// Combined confidence across retained indicators.
    pub confidence: Confidence,
    /// Indicators retained at or above the reporting threshold.
    pub indicators: BTreeSet<TamperIndicator>,
    /// Evidence regions backing the retained indicators.
    pub evidence_regions: Vec<EvidenceRegion>,
}

// ============================================================================
// SECTION: Feedback
// ============================================================================

/// Append-only user correction for a past classification.
///
/// # Invariants
/// - Corrections never mutate an emitted [`TamperingResult`]; they
///   accumulate as training signal for the external classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamperFeedback {
    /// Scan the correction refers to.
    pub scan_id: ScanId,
    /// Product the correction refers to.
    pub product_id: ProductId,
    /// Status the user reports as correct.
    pub reported_status: TamperingStatus,
    /// Optional free-form note.
    pub note: Option<String>,
    /// Time the correction was submitted.
    pub submitted_at: Timestamp,
}
