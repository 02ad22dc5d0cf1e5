// crates/veriscan-core/src/core/confidence.rs
// ============================================================================
// Module: Veriscan Confidence Scalars
// Description: Validated numeric newtypes for confidence and trust values.
// Purpose: Keep range invariants enforced at construction boundaries.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Confidence is a `[0, 1]` scalar expressing how much weight to give a
//! signal or verification outcome; trust values live on the user-facing
//! `[0, 100]` scale. Both are validated once at construction; arithmetic
//! helpers clamp rather than escape the range invariants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Confidence
// ============================================================================

/// Confidence scalar in `[0, 1]`.
///
/// # Invariants
/// - Always finite and within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Zero confidence.
    pub const ZERO: Self = Self(0.0);
    /// Full confidence.
    pub const FULL: Self = Self(1.0);

    /// Creates a confidence value, returning `None` outside `[0, 1]` or for
    /// non-finite input.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    /// Creates a confidence value, clamping finite input into `[0, 1]`.
    /// Non-finite input clamps to zero.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self::ZERO
        }
    }

    /// Returns the raw scalar value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns the larger of two confidence values.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

// ============================================================================
// SECTION: Trust Value
// ============================================================================

/// Trust value on the user-facing `[0, 100]` scale.
///
/// # Invariants
/// - Always finite and within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustValue(f64);

impl TrustValue {
    /// Minimum trust value.
    pub const MIN: Self = Self(0.0);
    /// Maximum trust value.
    pub const MAX: Self = Self(100.0);

    /// Creates a trust value, returning `None` outside `[0, 100]` or for
    /// non-finite input.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(Self(value))
    }

    /// Creates a trust value, clamping finite input into `[0, 100]`.
    /// Non-finite input clamps to zero.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 100.0))
        } else {
            Self::MIN
        }
    }

    /// Returns the raw scalar value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for TrustValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
