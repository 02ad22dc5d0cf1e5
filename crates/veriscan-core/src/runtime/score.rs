// crates/veriscan-core/src/runtime/score.rs
// ============================================================================
// Module: Veriscan Score Aggregation
// Description: Weighted multi-signal combination with missing-data renormalization.
// Purpose: Produce one composite trust value that degrades gracefully.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Aggregation renormalizes the configured weights over the present signal
//! subset and combines values with a weighted sum. Zero present signals are
//! an error, never a score of zero: zero is a valid score, not an absence
//! marker. Mapping helpers translate verifier and classifier results onto
//! the `[0, 100]` trust scale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::authenticity::AuthenticityResult;
use crate::core::authenticity::VerificationMethod;
use crate::core::confidence::Confidence;
use crate::core::confidence::TrustValue;
use crate::core::score::SignalWeights;
use crate::core::score::TrustScore;
use crate::core::score::TrustSignals;
use crate::core::signal::SignalKind;
use crate::core::signal::SignalResult;
use crate::core::signal::SignalSource;
use crate::core::tampering::TamperingResult;
use crate::core::tampering::TamperingStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when every signal is absent.
///
/// # Invariants
/// - Raised instead of returning `overall = 0`; surfaced to the caller and
///   not retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no trust signals present; cannot aggregate a score")]
pub struct InsufficientSignalsError;

// ============================================================================
// SECTION: Signal Mapping
// ============================================================================

/// Maps a verification result onto the trust scale.
///
/// An authentic verdict contributes `100` scaled by its confidence; an
/// inauthentic verdict contributes `0`. The signal source reflects the
/// method that concluded the cascade.
#[must_use]
pub fn map_authenticity_signal(result: &AuthenticityResult) -> SignalResult<TrustValue> {
    let base = if result.is_authentic { 100.0 } else { 0.0 };
    let value = TrustValue::clamped(base * result.confidence.value());
    let source = result.trail.last().map_or(SignalSource::Registry, |attempt| {
        match attempt.method {
            VerificationMethod::Registry => SignalSource::Registry,
            VerificationMethod::Ledger => SignalSource::Ledger,
            VerificationMethod::Visual => SignalSource::Visual,
        }
    });
    SignalResult::present(value, result.confidence, source)
}

/// Maps a tampering result onto the trust scale.
///
/// `Intact` contributes `100`, `Possible` `60`, `Tampered` `0`, each scaled
/// by the classifier confidence.
#[must_use]
pub fn map_tampering_signal(result: &TamperingResult) -> SignalResult<TrustValue> {
    let base = match result.status {
        TamperingStatus::Intact => 100.0,
        TamperingStatus::Possible => 60.0,
        TamperingStatus::Tampered => 0.0,
    };
    let value = TrustValue::clamped(base * result.confidence.value());
    SignalResult::present(value, result.confidence, SignalSource::TamperClassifier)
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Combines the four signal envelopes into one trust score.
///
/// Weights are renormalized over the present subset so they always sum to
/// one; `confidence` is the present-signal fraction.
///
/// # Errors
///
/// Returns [`InsufficientSignalsError`] when zero signals are present.
pub fn combine_signals(
    signals: TrustSignals,
    weights: &SignalWeights,
    computed_at: Timestamp,
) -> Result<TrustScore, InsufficientSignalsError> {
    let present = signals.present_kinds();
    if present.is_empty() {
        return Err(InsufficientSignalsError);
    }

    let weight_sum: f64 = present.iter().map(|kind| weights.weight(*kind)).sum();
    let overall: f64 = present
        .iter()
        .map(|kind| {
            let value = signals
                .get(*kind)
                .value
                .as_ref()
                .map_or(0.0, |trust_value| trust_value.value());
            (weights.weight(*kind) / weight_sum) * value
        })
        .sum();

    #[allow(
        clippy::cast_precision_loss,
        reason = "Present-signal count is at most four; the division is exact."
    )]
    let confidence = Confidence::clamped(present.len() as f64 / SignalKind::ALL.len() as f64);

    Ok(TrustScore {
        overall,
        missing_signals: signals.missing_kinds(),
        signals,
        confidence,
        computed_at,
    })
}
