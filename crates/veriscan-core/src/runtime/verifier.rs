// crates/veriscan-core/src/runtime/verifier.rs
// ============================================================================
// Module: Veriscan Authenticity Verifier
// Description: Cascading multi-method verification with confidence-based early exit.
// Purpose: Bound verification cost by stopping at the first confident pass.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The verifier iterates an ordered list of verification strategies
//! (`registry`, `ledger`, `visual`) and stops at the first pass whose
//! confidence reaches the early-exit floor. The cascade is inherently
//! sequential: each early-exit decision depends on the prior attempt, and
//! expensive methods only run when cheaper ones are inconclusive.
//! Invariants:
//! - One strategy's unavailability never aborts the cascade.
//! - A serial flagged by the duplicate-serial monitor is force-downgraded
//!   regardless of cascade outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::authenticity::AttemptOutcome;
use crate::core::authenticity::AuthenticityResult;
use crate::core::authenticity::DUPLICATE_SERIAL_FLAG;
use crate::core::authenticity::VerificationAttempt;
use crate::core::authenticity::VerificationMethod;
use crate::core::confidence::Confidence;
use crate::interfaces::SerialCloneIndex;
use crate::interfaces::SourceError;
use crate::interfaces::VerificationRequest;
use crate::interfaces::VerificationStrategy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum confidence for a passing attempt to stop the cascade.
pub const PASS_CONFIDENCE_FLOOR: f64 = 0.70;
/// Minimum confidence of a negative verdict that warrants a fraud alert.
pub const COUNTERFEIT_ALERT_FLOOR: f64 = 0.60;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Cascading authenticity verifier over an ordered strategy list.
///
/// # Invariants
/// - Strategies are attempted strictly in list order.
/// - The trail records every attempt made, including the one that stopped
///   the cascade.
pub struct AuthenticityVerifier {
    /// Ordered verification strategies.
    strategies: Vec<Box<dyn VerificationStrategy>>,
}

impl AuthenticityVerifier {
    /// Creates a verifier over the given ordered strategies.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn VerificationStrategy>>) -> Self {
        Self {
            strategies,
        }
    }

    /// Runs the cascade for one request.
    ///
    /// `clone_index` supplies the duplicate-serial downgrade decision; the
    /// caller owns alert emission for negative verdicts.
    #[must_use]
    pub fn verify(
        &self,
        request: &VerificationRequest,
        clone_index: &dyn SerialCloneIndex,
    ) -> AuthenticityResult {
        let mut trail: Vec<VerificationAttempt> = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let attempt = match strategy.attempt(request) {
                Ok(attempt) => attempt,
                Err(error) => unavailable_attempt(strategy.method(), &error),
            };
            let stop = attempt.outcome == AttemptOutcome::Pass
                && attempt.confidence.value() >= PASS_CONFIDENCE_FLOOR;
            trail.push(attempt);
            if stop {
                break;
            }
        }

        let mut result = conclude(trail);
        if clone_index.is_flagged(&request.serial) {
            result.is_authentic = false;
            result.flags.insert(DUPLICATE_SERIAL_FLAG.to_string());
        }
        result
    }
}

// ============================================================================
// SECTION: Cascade Conclusion
// ============================================================================

/// Records an unavailable source as an inconclusive attempt.
fn unavailable_attempt(method: VerificationMethod, error: &SourceError) -> VerificationAttempt {
    let detail = match error {
        SourceError::Unavailable(_) => "source unavailable".to_string(),
        SourceError::Timeout {
            ..
        } => "timeout".to_string(),
    };
    VerificationAttempt {
        method,
        outcome: AttemptOutcome::Inconclusive,
        confidence: Confidence::ZERO,
        detail: Some(detail),
    }
}

/// Derives the verdict from a completed trail.
fn conclude(trail: Vec<VerificationAttempt>) -> AuthenticityResult {
    let last_pass = trail
        .iter()
        .rev()
        .find(|attempt| attempt.outcome == AttemptOutcome::Pass)
        .map(|attempt| attempt.confidence);

    let (is_authentic, confidence) = match last_pass {
        Some(confidence) => (true, confidence),
        None => {
            let max_inconclusive = trail
                .iter()
                .filter(|attempt| attempt.outcome == AttemptOutcome::Inconclusive)
                .map(|attempt| attempt.confidence)
                .fold(Confidence::ZERO, Confidence::max);
            (false, max_inconclusive)
        }
    };

    AuthenticityResult {
        is_authentic,
        confidence,
        trail,
        flags: BTreeSet::new(),
    }
}

/// Returns true when a terminal negative verdict should raise a fraud alert.
#[must_use]
pub fn warrants_counterfeit_alert(result: &AuthenticityResult) -> bool {
    !result.is_authentic && result.confidence.value() >= COUNTERFEIT_ALERT_FLOOR
}
