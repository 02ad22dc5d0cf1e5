// crates/veriscan-core/src/core/signal.rs
// ============================================================================
// Module: Veriscan Signal Envelope
// Description: Uniform confidence-scored, possibly-absent signal results.
// Purpose: Give every signal producer one result shape the aggregator can combine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every signal producer returns a [`SignalResult`]: a possibly-absent value
//! with a confidence scalar, the producing source, and an optional absence
//! reason. Absence is encoded structurally (`value == None`), so the
//! `present == false implies value absent` invariant holds by construction.
//! Confidence on an absent result is ignored by the aggregator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::confidence::Confidence;

// ============================================================================
// SECTION: Signal Kinds
// ============================================================================

/// The four aggregated trust signals.
///
/// # Invariants
/// - Variants are stable for serialization and weight-table lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Cascading authenticity verification.
    Authenticity,
    /// Packaging tampering classification.
    Tampering,
    /// Product freshness (date/OCR extraction).
    Freshness,
    /// Social proof (reviews, ratings).
    SocialProof,
}

impl SignalKind {
    /// All signal kinds in canonical order.
    pub const ALL: [Self; 4] = [
        Self::Authenticity,
        Self::Tampering,
        Self::Freshness,
        Self::SocialProof,
    ];

    /// Returns the stable wire name for the signal kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticity => "authenticity",
            Self::Tampering => "tampering",
            Self::Freshness => "freshness",
            Self::SocialProof => "social_proof",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Signal Sources
// ============================================================================

/// The producer that generated a signal result.
///
/// # Invariants
/// - Variants are stable for serialization and audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Manufacturer registry lookup.
    Registry,
    /// Distributed ledger lookup.
    Ledger,
    /// Visual feature comparison.
    Visual,
    /// Packaging tamper classifier.
    TamperClassifier,
    /// Date/OCR freshness extraction.
    Freshness,
    /// Review and rating aggregation.
    SocialProof,
    /// Scan history store.
    ScanHistory,
}

// ============================================================================
// SECTION: Signal Result
// ============================================================================

/// Generic envelope every signal producer returns.
///
/// # Invariants
/// - Absence is structural: `value == None` means the signal is absent and
///   its confidence is meaningless to consumers.
/// - `reason` is populated only for absent results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult<T> {
    /// The signal value when present.
    pub value: Option<T>,
    /// Confidence in the value; ignored when the value is absent.
    pub confidence: Confidence,
    /// The producer that generated this result.
    pub source: SignalSource,
    /// Reason the value is absent, when applicable.
    pub reason: Option<String>,
}

impl<T> SignalResult<T> {
    /// Creates a present signal result.
    #[must_use]
    pub const fn present(value: T, confidence: Confidence, source: SignalSource) -> Self {
        Self {
            value: Some(value),
            confidence,
            source,
            reason: None,
        }
    }

    /// Creates an absent signal result with a reason.
    #[must_use]
    pub fn absent(source: SignalSource, reason: impl Into<String>) -> Self {
        Self {
            value: None,
            confidence: Confidence::ZERO,
            source,
            reason: Some(reason.into()),
        }
    }

    /// Returns true when the signal carries a value.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.value.is_some()
    }
}
