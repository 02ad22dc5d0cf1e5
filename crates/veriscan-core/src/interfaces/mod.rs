// crates/veriscan-core/src/interfaces/mod.rs
// ============================================================================
// Module: Veriscan Interfaces
// Description: Backend-agnostic interfaces for signal sources, stores, and sinks.
// Purpose: Define the contract surfaces used by the Veriscan runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Veriscan integrates with external signal producers
//! without embedding backend-specific details. Implementations must be
//! deterministic for a given input snapshot and fail closed on missing or
//! invalid data: a source failure is absorbed as an absent signal, never as
//! a request failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::authenticity::VerificationAttempt;
use crate::core::authenticity::VerificationMethod;
use crate::core::confidence::TrustValue;
use crate::core::fraud::AlertKey;
use crate::core::fraud::FraudAlert;
use crate::core::geo::ScanRecord;
use crate::core::identifiers::BatchCode;
use crate::core::identifiers::CategoryId;
use crate::core::identifiers::ProductId;
use crate::core::identifiers::ScanId;
use crate::core::identifiers::SerialNumber;
use crate::core::signal::SignalResult;
use crate::core::tampering::ImageRef;
use crate::core::tampering::IndicatorSignal;
use crate::core::tampering::TamperFeedback;
use crate::core::tampering::TamperIndicator;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Verification Request
// ============================================================================

/// Input snapshot for one verification or scoring call.
///
/// # Invariants
/// - Identifiers are validated at construction; strategies may trust them.
/// - Values are snapshots; collaborators must not mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Scan event identifier.
    pub scan_id: ScanId,
    /// Product instance identifier.
    pub product_id: ProductId,
    /// Serial number under verification.
    pub serial: SerialNumber,
    /// Optional production batch code.
    pub batch: Option<BatchCode>,
    /// Optional product category for weight overrides.
    pub category: Option<CategoryId>,
    /// Captured images for visual methods.
    pub images: Vec<ImageRef>,
    /// Time the request entered the engine.
    pub requested_at: Timestamp,
}

// ============================================================================
// SECTION: Source Errors
// ============================================================================

/// Signal source errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is absorbed into an absent signal by the runtime; none
///   propagates as a request failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The backing source is unreachable or down.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// The source exceeded its time budget.
    #[error("source timed out after {budget_ms} ms")]
    Timeout {
        /// Budget that was exceeded, in milliseconds.
        budget_ms: u64,
    },
}

/// Store errors for scan history and feedback persistence.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
}

/// Alert publication errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Publication is fire-and-forget; failures never fail the producing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The notification sink rejected or lost the alert.
    #[error("alert sink failure: {0}")]
    Sink(String),
}

// ============================================================================
// SECTION: Verification Strategy
// ============================================================================

/// One verification method behind the common attempt seam.
///
/// Strategies are iterated in cascade order with early exit; each strategy
/// is independently testable and reorderable.
pub trait VerificationStrategy: Send + Sync {
    /// Returns the method this strategy implements.
    fn method(&self) -> VerificationMethod;

    /// Attempts verification against the backing source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backing source is unavailable or
    /// over budget; the cascade absorbs the error as an inconclusive
    /// attempt and continues.
    fn attempt(&self, request: &VerificationRequest) -> Result<VerificationAttempt, SourceError>;
}

// ============================================================================
// SECTION: Tamper Indicator Detector
// ============================================================================

/// One independent tamper-indicator detector.
pub trait TamperIndicatorDetector: Send + Sync {
    /// Returns the indicator this detector reports on.
    fn indicator(&self) -> TamperIndicator;

    /// Runs detection against one captured image.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the detector backend is unavailable or
    /// over budget; the classifier treats the detection as absent.
    fn detect(&self, image: &ImageRef) -> Result<IndicatorSignal, SourceError>;
}

// ============================================================================
// SECTION: Scan History Store
// ============================================================================

/// Read/append access to the population scan history.
pub trait ScanHistoryStore: Send + Sync {
    /// Appends one scan record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be persisted.
    fn record(&self, scan: &ScanRecord) -> Result<(), StoreError>;

    /// Returns all scans of a serial inside the window ending at
    /// `window_end`, ordered by recorded time ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the history cannot be read.
    fn scans_within(
        &self,
        serial: &SerialNumber,
        window_end: Timestamp,
        window_millis: i64,
    ) -> Result<Vec<ScanRecord>, StoreError>;
}

// ============================================================================
// SECTION: Feedback Store
// ============================================================================

/// Append-only store for tampering-classification corrections.
pub trait FeedbackStore: Send + Sync {
    /// Appends one correction record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be persisted.
    fn append(&self, feedback: &TamperFeedback) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

/// Notification sink for fraud alerts.
///
/// Delivery is at-least-once from the sink's perspective and
/// fire-and-forget from the engine's: the engine never blocks a scoring or
/// verification call on publication.
pub trait AlertSink: Send + Sync {
    /// Publishes one fraud alert.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when delivery fails; the engine records and
    /// drops the failure.
    fn publish(&self, alert: &FraudAlert) -> Result<(), PublishError>;
}

// ============================================================================
// SECTION: Score Signal Sources
// ============================================================================

/// Freshness signal producer (date/OCR extraction).
pub trait FreshnessSource: Send + Sync {
    /// Returns the freshness signal for a product.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source is unavailable or over
    /// budget; the aggregator records the signal as absent.
    fn freshness(&self, product_id: &ProductId) -> Result<SignalResult<TrustValue>, SourceError>;
}

/// Social-proof signal producer (reviews, ratings).
pub trait SocialProofSource: Send + Sync {
    /// Returns the social-proof signal for a product.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source is unavailable or over
    /// budget; the aggregator records the signal as absent.
    fn social_proof(
        &self,
        product_id: &ProductId,
    ) -> Result<SignalResult<TrustValue>, SourceError>;
}

// ============================================================================
// SECTION: Alert Ledger
// ============================================================================

/// Ledger of emitted alert keys for rolling-window deduplication.
///
/// The duplicate-serial monitor marks every offending pair it alerts on;
/// replaying the identical pair inside the window is then idempotent, also
/// across process restarts when the ledger is durable.
pub trait AlertLedger: Send + Sync {
    /// Marks a key as emitted. Returns true when the key was new.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the ledger cannot be updated.
    fn mark_if_new(&self, key: &AlertKey, window_end: Timestamp) -> Result<bool, StoreError>;

    /// Removes keys whose window end is older than `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the ledger cannot be pruned.
    fn prune_before(&self, cutoff: Timestamp) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Serial Clone Index
// ============================================================================

/// Lookup of serials flagged by the duplicate-serial monitor.
///
/// The verifier consults this index to force-downgrade flagged serials
/// regardless of cascade outcome.
pub trait SerialCloneIndex: Send + Sync {
    /// Returns true when the serial is currently flagged as cloned.
    fn is_flagged(&self, serial: &SerialNumber) -> bool;
}
