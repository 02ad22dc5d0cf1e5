// crates/veriscan-core/src/core/authenticity.rs
// ============================================================================
// Module: Veriscan Authenticity Records
// Description: Verification attempts, cascade trails, and authenticity results.
// Purpose: Capture the full evidence trail produced by the verification cascade.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! One verification call produces an ordered trail of attempts, one per
//! method tried, and a single authenticity verdict. The trail is owned by
//! its result for the duration of the call and is append-only.
//! Invariants:
//! - The trail is non-empty whenever verification was attempted at all.
//! - The last passing attempt (if any) determines `is_authentic`.
//! - Without any pass, `is_authentic` is false and confidence is the
//!   maximum observed across inconclusive attempts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::confidence::Confidence;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Flag recorded when a serial number was independently flagged as cloned.
pub const DUPLICATE_SERIAL_FLAG: &str = "duplicate-serial";

// ============================================================================
// SECTION: Verification Methods
// ============================================================================

/// Verification methods in cascade priority order.
///
/// # Invariants
/// - Variants are stable for serialization and trail inspection.
/// - Cascade order is `Registry`, `Ledger`, `Visual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Manufacturer registry lookup.
    Registry,
    /// Distributed ledger lookup.
    Ledger,
    /// Visual feature comparison.
    Visual,
}

impl VerificationMethod {
    /// All methods in cascade priority order.
    pub const CASCADE_ORDER: [Self; 3] = [Self::Registry, Self::Ledger, Self::Visual];

    /// Returns the stable wire name for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Ledger => "ledger",
            Self::Visual => "visual",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Attempts
// ============================================================================

/// Outcome of one verification attempt.
///
/// # Invariants
/// - Variants are stable for serialization and cascade decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The method affirmed authenticity.
    Pass,
    /// The method affirmed inauthenticity.
    Fail,
    /// The method could not reach a verdict.
    Inconclusive,
}

/// One try of one verification method.
///
/// # Invariants
/// - Attempts are immutable once appended to a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// The method that was tried.
    pub method: VerificationMethod,
    /// The attempt outcome.
    pub outcome: AttemptOutcome,
    /// Confidence in the outcome.
    pub confidence: Confidence,
    /// Optional human-readable detail (for example `source unavailable`).
    pub detail: Option<String>,
}

// ============================================================================
// SECTION: Authenticity Result
// ============================================================================

/// Result of one cascading verification call.
///
/// # Invariants
/// - `trail` is ordered by attempt time and non-empty whenever verification
///   was attempted.
/// - `flags` accumulates downgrade markers such as
///   [`DUPLICATE_SERIAL_FLAG`]; it never removes entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityResult {
    /// The authenticity verdict.
    pub is_authentic: bool,
    /// Confidence in the verdict.
    pub confidence: Confidence,
    /// Ordered trail of attempts made by the cascade.
    pub trail: Vec<VerificationAttempt>,
    /// Downgrade and audit flags.
    pub flags: BTreeSet<String>,
}

impl AuthenticityResult {
    /// Returns the last passing attempt in the trail, if any.
    #[must_use]
    pub fn last_pass(&self) -> Option<&VerificationAttempt> {
        self.trail.iter().rev().find(|attempt| attempt.outcome == AttemptOutcome::Pass)
    }
}
