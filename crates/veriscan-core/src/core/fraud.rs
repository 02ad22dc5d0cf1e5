// crates/veriscan-core/src/core/fraud.rs
// ============================================================================
// Module: Veriscan Fraud Alerts
// Description: Fraud alert records and duplicate-serial findings.
// Purpose: Capture population-level fraud evidence as immutable alert records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Fraud alerts are immutable once emitted and are consumed by the external
//! notification collaborator. Duplicate-serial findings carry the offending
//! scan pairs so each alert is reproducible from scan history.
//! Invariants:
//! - Alerts are deduplicated per offending pair per rolling window via
//!   [`AlertKey`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ScanId;
use crate::core::identifiers::SerialNumber;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Alert Model
// ============================================================================

/// Fraud pattern categories.
///
/// # Invariants
/// - Variants are stable for serialization and sink routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudKind {
    /// Serial number reused across improbable distance or time.
    SerialClone,
    /// Verification cascade rejected the product with confidence.
    Counterfeit,
    /// Review-text or review-metadata manipulation.
    ReviewFraud,
    /// Custody-transfer sequence anomaly.
    SupplyChainAnomaly,
}

impl FraudKind {
    /// Returns the stable wire name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SerialClone => "serial_clone",
            Self::Counterfeit => "counterfeit",
            Self::ReviewFraud => "review_fraud",
            Self::SupplyChainAnomaly => "supply_chain_anomaly",
        }
    }
}

impl fmt::Display for FraudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity levels.
///
/// # Invariants
/// - Ordering is ascending severity; `Critical` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth monitoring.
    Medium,
    /// Requires attention.
    High,
    /// Requires immediate action.
    Critical,
}

/// Opaque reference to a piece of alert evidence.
///
/// # Invariants
/// - The reference format is owned by the producing detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    /// Creates an evidence reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable fraud alert emitted on detection.
///
/// # Invariants
/// - Alerts are never mutated after emission.
/// - `affected` holds the entity identifiers the alert refers to
///   (serials, product identifiers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Fraud pattern category.
    pub kind: FraudKind,
    /// Alert severity.
    pub severity: Severity,
    /// Opaque evidence references backing the alert.
    pub evidence: Vec<EvidenceRef>,
    /// Entity identifiers affected by the alert.
    pub affected: BTreeSet<String>,
    /// Time the alert was detected.
    pub detected_at: Timestamp,
}

// ============================================================================
// SECTION: Duplicate-Serial Findings
// ============================================================================

/// One pair of scans that violates the geofence constraint.
///
/// # Invariants
/// - `earlier` precedes `later` in recorded time.
/// - `distance_km` exceeds the duplicate-distance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffendingPair {
    /// Scan identifier of the earlier scan.
    pub earlier: ScanId,
    /// Scan identifier of the later scan.
    pub later: ScanId,
    /// Great-circle distance between the two scan locations.
    pub distance_km: f64,
    /// Time delta between the two scans in milliseconds.
    pub delta_millis: i64,
}

/// Result of duplicate-serial detection over one rolling window.
///
/// # Invariants
/// - `pairs` is non-empty and ordered by detection (earlier scan first).
/// - `severity` is the maximum severity across the offending pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateSerialFinding {
    /// Serial number that was reused.
    pub serial: SerialNumber,
    /// All offending scan pairs inside the window.
    pub pairs: Vec<OffendingPair>,
    /// Maximum severity across the offending pairs.
    pub severity: Severity,
    /// End of the rolling window (most recent scan time).
    pub window_end: Timestamp,
}

// ============================================================================
// SECTION: Alert Deduplication Keys
// ============================================================================

/// Deduplication key for one offending pair of one serial.
///
/// # Invariants
/// - Keys are stable: replaying the identical pair yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertKey {
    /// Serial number the alert refers to.
    pub serial: SerialNumber,
    /// Earlier scan of the offending pair.
    pub earlier: ScanId,
    /// Later scan of the offending pair.
    pub later: ScanId,
}

impl AlertKey {
    /// Creates the deduplication key for an offending pair.
    #[must_use]
    pub fn for_pair(serial: &SerialNumber, pair: &OffendingPair) -> Self {
        Self {
            serial: serial.clone(),
            earlier: pair.earlier.clone(),
            later: pair.later.clone(),
        }
    }
}
