// crates/veriscan-core/src/core/time.rs
// ============================================================================
// Module: Veriscan Time Model
// Description: Canonical timestamp representation for scans, scores, and alerts.
// Purpose: Provide deterministic, replayable time values across Veriscan records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Veriscan uses explicit time values embedded in scan records and results to
//! keep detection replayable. The core engine never reads wall-clock time
//! directly; hosts must supply timestamps at the engine boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Veriscan records, in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the absolute difference to another timestamp in milliseconds.
    #[must_use]
    pub const fn delta_millis(self, other: Self) -> i64 {
        (self.0 - other.0).abs()
    }

    /// Returns this timestamp shifted back by `millis`, saturating at the
    /// representable minimum.
    #[must_use]
    pub const fn saturating_sub_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}
