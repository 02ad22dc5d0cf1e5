// crates/veriscan-core/src/core/score.rs
// ============================================================================
// Module: Veriscan Trust Score Model
// Description: Signal weights, per-signal envelopes, and the composite score.
// Purpose: Capture one weighted trust judgment with explicit missing-signal accounting.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A trust score combines four weighted signals into one `[0, 100]` value.
//! Scores are created per scan request, cached by input fingerprint, and
//! superseded rather than mutated on recomputation. Missing signals are
//! reported explicitly; the aggregator never substitutes a silent default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::confidence::Confidence;
use crate::core::confidence::TrustValue;
use crate::core::signal::SignalKind;
use crate::core::signal::SignalResult;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Signal Weights
// ============================================================================

/// Tolerance applied to the sum-to-one weight invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-signal weight table for trust-score aggregation.
///
/// # Invariants
/// - Weights are non-negative and sum to 1.0 within
///   [`WEIGHT_SUM_TOLERANCE`]; configuration loading enforces this before a
///   table reaches the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    /// Weight of the authenticity signal.
    pub authenticity: f64,
    /// Weight of the tampering signal.
    pub tampering: f64,
    /// Weight of the freshness signal.
    pub freshness: f64,
    /// Weight of the social-proof signal.
    pub social_proof: f64,
}

impl SignalWeights {
    /// Base weights used when no category override applies.
    pub const BASE: Self = Self {
        authenticity: 0.30,
        tampering: 0.30,
        freshness: 0.25,
        social_proof: 0.15,
    };

    /// Returns the weight assigned to a signal kind.
    #[must_use]
    pub const fn weight(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::Authenticity => self.authenticity,
            SignalKind::Tampering => self.tampering,
            SignalKind::Freshness => self.freshness,
            SignalKind::SocialProof => self.social_proof,
        }
    }

    /// Returns the sum of all four weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.authenticity + self.tampering + self.freshness + self.social_proof
    }

    /// Returns true when all weights are non-negative and sum to 1.0 within
    /// tolerance.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let non_negative = SignalKind::ALL.iter().all(|kind| self.weight(*kind) >= 0.0);
        non_negative && (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self::BASE
    }
}

// ============================================================================
// SECTION: Trust Signals
// ============================================================================

/// The four per-signal envelopes feeding one trust score.
///
/// # Invariants
/// - Each field is the complete producer envelope, including absence
///   reasons, so a score is explainable without replaying the fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSignals {
    /// Authenticity signal mapped onto the trust scale.
    pub authenticity: SignalResult<TrustValue>,
    /// Tampering signal mapped onto the trust scale.
    pub tampering: SignalResult<TrustValue>,
    /// Freshness signal.
    pub freshness: SignalResult<TrustValue>,
    /// Social-proof signal.
    pub social_proof: SignalResult<TrustValue>,
}

impl TrustSignals {
    /// Returns the envelope for a signal kind.
    #[must_use]
    pub const fn get(&self, kind: SignalKind) -> &SignalResult<TrustValue> {
        match kind {
            SignalKind::Authenticity => &self.authenticity,
            SignalKind::Tampering => &self.tampering,
            SignalKind::Freshness => &self.freshness,
            SignalKind::SocialProof => &self.social_proof,
        }
    }

    /// Returns the kinds whose signals are present.
    #[must_use]
    pub fn present_kinds(&self) -> Vec<SignalKind> {
        SignalKind::ALL.iter().copied().filter(|kind| self.get(*kind).is_present()).collect()
    }

    /// Returns the kinds whose signals are absent.
    #[must_use]
    pub fn missing_kinds(&self) -> BTreeSet<SignalKind> {
        SignalKind::ALL.iter().copied().filter(|kind| !self.get(*kind).is_present()).collect()
    }
}

// ============================================================================
// SECTION: Trust Score
// ============================================================================

/// One composite trust judgment for a product scan.
///
/// # Invariants
/// - `overall` is within `[0, 100]` and uses only present signals.
/// - `confidence` equals present-signal count divided by four.
/// - Scores are superseded, never mutated, on recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Weighted overall trust value.
    pub overall: f64,
    /// The per-signal envelopes that produced the score.
    pub signals: TrustSignals,
    /// Fraction of signals that were present.
    pub confidence: Confidence,
    /// Kinds whose signals were absent.
    pub missing_signals: BTreeSet<SignalKind>,
    /// Time the score was computed.
    pub computed_at: Timestamp,
}
