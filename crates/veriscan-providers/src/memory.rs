// crates/veriscan-providers/src/memory.rs
// ============================================================================
// Module: In-Memory Providers
// Description: Deterministic in-memory implementations of the collaborator traits.
// Purpose: Provide predictable signal sources for host wiring and tests.
// Dependencies: veriscan-core
// ============================================================================

//! ## Overview
//! In-memory providers return scripted responses and record their
//! invocations, so cascade order, fan-out counts, and absorption behavior
//! are observable in tests without network backends. All providers are
//! thread-safe behind interior mutability.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use veriscan_core::AlertKey;
use veriscan_core::AlertLedger;
use veriscan_core::AlertSink;
use veriscan_core::AttemptOutcome;
use veriscan_core::Confidence;
use veriscan_core::FeedbackStore;
use veriscan_core::FraudAlert;
use veriscan_core::FreshnessSource;
use veriscan_core::ImageRef;
use veriscan_core::IndicatorSignal;
use veriscan_core::ProductId;
use veriscan_core::PublishError;
use veriscan_core::ScanHistoryStore;
use veriscan_core::ScanRecord;
use veriscan_core::SerialCloneIndex;
use veriscan_core::SerialNumber;
use veriscan_core::SignalResult;
use veriscan_core::SignalSource;
use veriscan_core::SocialProofSource;
use veriscan_core::SourceError;
use veriscan_core::StoreError;
use veriscan_core::TamperFeedback;
use veriscan_core::TamperIndicator;
use veriscan_core::TamperIndicatorDetector;
use veriscan_core::Timestamp;
use veriscan_core::TrustValue;
use veriscan_core::VerificationAttempt;
use veriscan_core::VerificationMethod;
use veriscan_core::VerificationRequest;
use veriscan_core::VerificationStrategy;

// ============================================================================
// SECTION: Scripted Verification Strategy
// ============================================================================

/// Verification strategy returning one scripted response.
///
/// # Invariants
/// - Every invocation is counted, including error responses.
pub struct ScriptedStrategy {
    /// Method the strategy reports.
    method: VerificationMethod,
    /// Scripted response returned on every attempt.
    response: Result<(AttemptOutcome, Confidence), SourceError>,
    /// Number of attempts made.
    calls: AtomicUsize,
}

impl ScriptedStrategy {
    /// Creates a strategy that returns the given outcome and confidence.
    #[must_use]
    pub const fn responding(
        method: VerificationMethod,
        outcome: AttemptOutcome,
        confidence: Confidence,
    ) -> Self {
        Self {
            method,
            response: Ok((outcome, confidence)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a strategy whose backing source is unavailable.
    #[must_use]
    pub const fn unavailable(method: VerificationMethod) -> Self {
        Self {
            method,
            response: Err(SourceError::Unavailable(String::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of attempts made against this strategy.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VerificationStrategy for ScriptedStrategy {
    fn method(&self) -> VerificationMethod {
        self.method
    }

    fn attempt(
        &self,
        _request: &VerificationRequest,
    ) -> Result<VerificationAttempt, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok((outcome, confidence)) => Ok(VerificationAttempt {
                method: self.method,
                outcome: *outcome,
                confidence: *confidence,
                detail: None,
            }),
            Err(error) => Err(error.clone()),
        }
    }
}

// ============================================================================
// SECTION: Scripted Tamper Detector
// ============================================================================

/// Tamper-indicator detector returning one scripted detection.
pub struct ScriptedDetector {
    /// Indicator the detector reports on.
    indicator: TamperIndicator,
    /// Scripted detection returned for every image.
    response: Result<IndicatorSignal, SourceError>,
}

impl ScriptedDetector {
    /// Creates a detector that returns the given detection.
    #[must_use]
    pub const fn responding(indicator: TamperIndicator, signal: IndicatorSignal) -> Self {
        Self {
            indicator,
            response: Ok(signal),
        }
    }

    /// Creates a detector whose backend is unavailable.
    #[must_use]
    pub const fn unavailable(indicator: TamperIndicator) -> Self {
        Self {
            indicator,
            response: Err(SourceError::Unavailable(String::new())),
        }
    }
}

impl TamperIndicatorDetector for ScriptedDetector {
    fn indicator(&self) -> TamperIndicator {
        self.indicator
    }

    fn detect(&self, _image: &ImageRef) -> Result<IndicatorSignal, SourceError> {
        self.response.clone()
    }
}

// ============================================================================
// SECTION: Scan History
// ============================================================================

/// In-memory scan history backed by a vector.
///
/// # Invariants
/// - Records are append-only and never reordered on read beyond the
///   recorded-time sort required by the interface.
#[derive(Default)]
pub struct InMemoryScanHistory {
    /// Recorded scans.
    records: Mutex<Vec<ScanRecord>>,
}

impl InMemoryScanHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of recorded scans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when no scans are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl ScanHistoryStore for InMemoryScanHistory {
    fn record(&self, scan: &ScanRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(scan.clone());
        Ok(())
    }

    fn scans_within(
        &self,
        serial: &SerialNumber,
        window_end: Timestamp,
        window_millis: i64,
    ) -> Result<Vec<ScanRecord>, StoreError> {
        let window_start = window_end.saturating_sub_millis(window_millis);
        let mut scans: Vec<ScanRecord> = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| {
                record.serial == *serial
                    && record.recorded_at >= window_start
                    && record.recorded_at <= window_end
            })
            .cloned()
            .collect();
        scans.sort_by_key(|record| record.recorded_at);
        Ok(scans)
    }
}

// ============================================================================
// SECTION: Feedback Store
// ============================================================================

/// In-memory append-only feedback store.
#[derive(Default)]
pub struct InMemoryFeedbackStore {
    /// Appended corrections in submission order.
    entries: Mutex<Vec<TamperFeedback>>,
}

impl InMemoryFeedbackStore {
    /// Creates an empty feedback store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all appended corrections.
    #[must_use]
    pub fn entries(&self) -> Vec<TamperFeedback> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn append(&self, feedback: &TamperFeedback) -> Result<(), StoreError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(feedback.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

/// Alert sink that collects published alerts for inspection.
#[derive(Default)]
pub struct CollectingAlertSink {
    /// Published alerts in delivery order.
    alerts: Arc<Mutex<Vec<FraudAlert>>>,
}

impl CollectingAlertSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the collected alerts.
    #[must_use]
    pub fn alerts(&self) -> Arc<Mutex<Vec<FraudAlert>>> {
        Arc::clone(&self.alerts)
    }
}

impl AlertSink for CollectingAlertSink {
    fn publish(&self, alert: &FraudAlert) -> Result<(), PublishError> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).push(alert.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Score Signal Sources
// ============================================================================

/// Freshness source returning one fixed signal.
pub struct FixedFreshnessSource {
    /// Scripted signal returned for every product.
    response: Result<SignalResult<TrustValue>, SourceError>,
}

impl FixedFreshnessSource {
    /// Creates a source returning a present signal with full confidence.
    #[must_use]
    pub fn present(value: TrustValue) -> Self {
        Self {
            response: Ok(SignalResult::present(
                value,
                Confidence::FULL,
                SignalSource::Freshness,
            )),
        }
    }

    /// Creates a source whose backend is unavailable.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            response: Err(SourceError::Unavailable(String::new())),
        }
    }
}

impl FreshnessSource for FixedFreshnessSource {
    fn freshness(
        &self,
        _product_id: &ProductId,
    ) -> Result<SignalResult<TrustValue>, SourceError> {
        self.response.clone()
    }
}

/// Social-proof source returning one fixed signal.
pub struct FixedSocialProofSource {
    /// Scripted signal returned for every product.
    response: Result<SignalResult<TrustValue>, SourceError>,
}

impl FixedSocialProofSource {
    /// Creates a source returning a present signal with full confidence.
    #[must_use]
    pub fn present(value: TrustValue) -> Self {
        Self {
            response: Ok(SignalResult::present(
                value,
                Confidence::FULL,
                SignalSource::SocialProof,
            )),
        }
    }

    /// Creates a source whose backend is unavailable.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            response: Err(SourceError::Unavailable(String::new())),
        }
    }
}

impl SocialProofSource for FixedSocialProofSource {
    fn social_proof(
        &self,
        _product_id: &ProductId,
    ) -> Result<SignalResult<TrustValue>, SourceError> {
        self.response.clone()
    }
}

// ============================================================================
// SECTION: Alert Ledger
// ============================================================================

/// In-memory alert ledger with window-based pruning.
#[derive(Default)]
pub struct InMemoryAlertLedger {
    /// Emitted keys and the window end they were emitted for.
    emitted: Mutex<BTreeMap<AlertKey, Timestamp>>,
}

impl InMemoryAlertLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of marked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emitted.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when no keys are marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emitted.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl AlertLedger for InMemoryAlertLedger {
    fn mark_if_new(&self, key: &AlertKey, window_end: Timestamp) -> Result<bool, StoreError> {
        let mut emitted = self.emitted.lock().unwrap_or_else(PoisonError::into_inner);
        let is_new = !emitted.contains_key(key);
        emitted.insert(key.clone(), window_end);
        Ok(is_new)
    }

    fn prune_before(&self, cutoff: Timestamp) -> Result<(), StoreError> {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, window_end| *window_end >= cutoff);
        Ok(())
    }
}

// ============================================================================
// SECTION: Clone Index
// ============================================================================

/// Clone index over a fixed flagged-serial set.
#[derive(Default)]
pub struct StaticCloneIndex {
    /// Serial numbers currently flagged as cloned.
    flagged: Mutex<BTreeSet<SerialNumber>>,
}

impl StaticCloneIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags a serial number.
    pub fn flag(&self, serial: SerialNumber) {
        self.flagged.lock().unwrap_or_else(PoisonError::into_inner).insert(serial);
    }
}

impl SerialCloneIndex for StaticCloneIndex {
    fn is_flagged(&self, serial: &SerialNumber) -> bool {
        self.flagged.lock().unwrap_or_else(PoisonError::into_inner).contains(serial)
    }
}
