// crates/veriscan-engine/src/engine.rs
// ============================================================================
// Module: Trust Engine
// Description: Parallel signal fan-out, cascade driving, and fraud monitoring.
// Purpose: Produce composite trust scores under per-source timeout budgets.
// Dependencies: veriscan-core, veriscan-config, tokio, tracing
// ============================================================================

//! ## Overview
//! The trust engine wires the pure core runtime to real collaborators. A
//! scan request fans out to the authenticity cascade, the tampering
//! classifier, and the freshness and social-proof sources in parallel;
//! each arm races its configured budget and degrades to an absent signal
//! on breach. Results are cached by input fingerprint with single-flight
//! miss handling. The duplicate-serial monitor observes the scan stream,
//! flags cloned serials for verifier downgrade, invalidates affected cache
//! entries, and emits deduplicated alerts through the bounded outbox.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use thiserror::Error;
use tokio::time::timeout;
use veriscan_config::EngineConfig;
use veriscan_core::AlertKey;
use veriscan_core::AlertLedger;
use veriscan_core::AlertSink;
use veriscan_core::AuthenticityResult;
use veriscan_core::AuthenticityVerifier;
use veriscan_core::Confidence;
use veriscan_core::DUPLICATE_SERIAL_FLAG;
use veriscan_core::DUPLICATE_WINDOW_MS;
use veriscan_core::EvidenceRef;
use veriscan_core::FeedbackStore;
use veriscan_core::FraudAlert;
use veriscan_core::FraudKind;
use veriscan_core::FreshnessSource;
use veriscan_core::ImageRef;
use veriscan_core::IndicatorSignal;
use veriscan_core::InsufficientSignalsError;
use veriscan_core::InvalidInputError;
use veriscan_core::ProductId;
use veriscan_core::ScanHistoryStore;
use veriscan_core::ScanRecord;
use veriscan_core::SerialCloneIndex;
use veriscan_core::SerialNumber;
use veriscan_core::Severity;
use veriscan_core::SignalResult;
use veriscan_core::SignalSource;
use veriscan_core::SocialProofSource;
use veriscan_core::SourceError;
use veriscan_core::StoreError;
use veriscan_core::TamperFeedback;
use veriscan_core::TamperIndicatorDetector;
use veriscan_core::TamperingResult;
use veriscan_core::Timestamp;
use veriscan_core::TrustScore;
use veriscan_core::TrustSignals;
use veriscan_core::TrustValue;
use veriscan_core::VerificationAttempt;
use veriscan_core::VerificationMethod;
use veriscan_core::VerificationRequest;
use veriscan_core::VerificationStrategy;
use veriscan_core::classify_indicators;
use veriscan_core::combine_signals;
use veriscan_core::find_duplicate_serial;
use veriscan_core::map_authenticity_signal;
use veriscan_core::map_tampering_signal;
use veriscan_core::warrants_counterfeit_alert;

use crate::cache::CacheKey;
use crate::cache::ScoreCache;
use crate::fingerprint::FingerprintError;
use crate::fingerprint::fingerprint_request;
use crate::outbox::AlertOutbox;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by engine operations.
///
/// # Invariants
/// - Individual signal-source failures never appear here; they are
///   absorbed into absent signals.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Every signal was absent; no score can be aggregated.
    #[error(transparent)]
    InsufficientSignals(#[from] InsufficientSignalsError),
    /// Request input was malformed.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    /// A required store operation failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    /// Request fingerprinting failed.
    #[error("fingerprint failure: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// Errors raised while building an engine.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// No verification strategies were registered.
    #[error("at least one verification strategy is required")]
    MissingStrategies,
    /// No scan-history store was registered.
    #[error("a scan-history store is required")]
    MissingHistory,
    /// No feedback store was registered.
    #[error("a feedback store is required")]
    MissingFeedback,
    /// No alert sink was registered.
    #[error("an alert sink is required")]
    MissingSink,
    /// No alert ledger was registered.
    #[error("an alert ledger is required")]
    MissingLedger,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

// ============================================================================
// SECTION: Budgeted Strategy
// ============================================================================

/// Wraps a strategy with a hard per-attempt time budget.
///
/// The inner attempt runs on a helper thread; a budget breach returns
/// [`SourceError::Timeout`] while the straggler finishes in the background
/// (best-effort cancellation).
struct BudgetedStrategy {
    /// The wrapped strategy.
    inner: Arc<dyn VerificationStrategy>,
    /// Attempt budget.
    budget: Duration,
}

impl VerificationStrategy for BudgetedStrategy {
    fn method(&self) -> VerificationMethod {
        self.inner.method()
    }

    fn attempt(&self, request: &VerificationRequest) -> Result<VerificationAttempt, SourceError> {
        let (sender, receiver) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        thread::spawn(move || {
            let _ = sender.send(inner.attempt(&request));
        });
        receiver.recv_timeout(self.budget).unwrap_or_else(|_| {
            Err(SourceError::Timeout {
                budget_ms: u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX),
            })
        })
    }
}

// ============================================================================
// SECTION: Clone Flags
// ============================================================================

/// Serials flagged by the duplicate-serial monitor.
#[derive(Default)]
struct CloneFlags {
    /// Flagged serial numbers.
    flagged: Mutex<BTreeSet<SerialNumber>>,
}

impl CloneFlags {
    /// Flags a serial number. Returns true when it was newly flagged.
    fn flag(&self, serial: &SerialNumber) -> bool {
        self.flagged.lock().unwrap_or_else(PoisonError::into_inner).insert(serial.clone())
    }
}

impl SerialCloneIndex for CloneFlags {
    fn is_flagged(&self, serial: &SerialNumber) -> bool {
        self.flagged.lock().unwrap_or_else(PoisonError::into_inner).contains(serial)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a [`TrustEngine`].
///
/// # Invariants
/// - `build` succeeds only when strategies, history, feedback, sink, and
///   ledger are all configured and the configuration validates.
#[derive(Default)]
pub struct TrustEngineBuilder {
    /// Engine configuration.
    config: Option<EngineConfig>,
    /// Ordered verification strategies.
    strategies: Vec<Arc<dyn VerificationStrategy>>,
    /// Tamper indicator detectors.
    detectors: Vec<Arc<dyn TamperIndicatorDetector>>,
    /// Optional freshness source.
    freshness: Option<Arc<dyn FreshnessSource>>,
    /// Optional social-proof source.
    social_proof: Option<Arc<dyn SocialProofSource>>,
    /// Scan-history store.
    history: Option<Arc<dyn ScanHistoryStore>>,
    /// Feedback store.
    feedback: Option<Arc<dyn FeedbackStore>>,
    /// Alert sink.
    sink: Option<Arc<dyn AlertSink>>,
    /// Alert deduplication ledger.
    ledger: Option<Arc<dyn AlertLedger>>,
}

impl TrustEngineBuilder {
    /// Sets the engine configuration (defaults otherwise).
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Appends a verification strategy in cascade order.
    #[must_use]
    pub fn strategy(mut self, strategy: Arc<dyn VerificationStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Appends a tamper indicator detector.
    #[must_use]
    pub fn detector(mut self, detector: Arc<dyn TamperIndicatorDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Sets the freshness source.
    #[must_use]
    pub fn freshness(mut self, source: Arc<dyn FreshnessSource>) -> Self {
        self.freshness = Some(source);
        self
    }

    /// Sets the social-proof source.
    #[must_use]
    pub fn social_proof(mut self, source: Arc<dyn SocialProofSource>) -> Self {
        self.social_proof = Some(source);
        self
    }

    /// Sets the scan-history store.
    #[must_use]
    pub fn history(mut self, store: Arc<dyn ScanHistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    /// Sets the feedback store.
    #[must_use]
    pub fn feedback(mut self, store: Arc<dyn FeedbackStore>) -> Self {
        self.feedback = Some(store);
        self
    }

    /// Sets the alert sink.
    #[must_use]
    pub fn alert_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the alert deduplication ledger.
    #[must_use]
    pub fn alert_ledger(mut self, ledger: Arc<dyn AlertLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Builds the engine and spawns its outbox drain task.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EngineBuildError`] when a required collaborator is missing
    /// or the configuration is invalid.
    pub fn build(self) -> Result<TrustEngine, EngineBuildError> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(|err| EngineBuildError::Config(err.to_string()))?;
        if self.strategies.is_empty() {
            return Err(EngineBuildError::MissingStrategies);
        }
        let history = self.history.ok_or(EngineBuildError::MissingHistory)?;
        let feedback = self.feedback.ok_or(EngineBuildError::MissingFeedback)?;
        let sink = self.sink.ok_or(EngineBuildError::MissingSink)?;
        let ledger = self.ledger.ok_or(EngineBuildError::MissingLedger)?;

        let outbox = AlertOutbox::spawn(sink, config.outbox_capacity);
        let cache = ScoreCache::new(Duration::from_millis(config.cache_ttl_ms));

        Ok(TrustEngine {
            inner: Arc::new(EngineInner {
                config,
                strategies: self.strategies,
                detectors: self.detectors,
                freshness: self.freshness,
                social_proof: self.social_proof,
                history,
                feedback,
                ledger,
                cache,
                outbox,
                clone_flags: CloneFlags::default(),
                serial_products: Mutex::new(HashMap::new()),
            }),
        })
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Shared engine state.
struct EngineInner {
    /// Validated engine configuration.
    config: EngineConfig,
    /// Ordered verification strategies.
    strategies: Vec<Arc<dyn VerificationStrategy>>,
    /// Tamper indicator detectors.
    detectors: Vec<Arc<dyn TamperIndicatorDetector>>,
    /// Optional freshness source.
    freshness: Option<Arc<dyn FreshnessSource>>,
    /// Optional social-proof source.
    social_proof: Option<Arc<dyn SocialProofSource>>,
    /// Scan-history store.
    history: Arc<dyn ScanHistoryStore>,
    /// Feedback store.
    feedback: Arc<dyn FeedbackStore>,
    /// Alert deduplication ledger.
    ledger: Arc<dyn AlertLedger>,
    /// Trust-score cache.
    cache: ScoreCache,
    /// Alert outbox.
    outbox: AlertOutbox,
    /// Serials flagged as cloned.
    clone_flags: CloneFlags,
    /// Products observed per serial, for alert-driven invalidation.
    serial_products: Mutex<HashMap<SerialNumber, BTreeSet<ProductId>>>,
}

/// Composite trust and verification engine.
#[derive(Clone)]
pub struct TrustEngine {
    /// Shared engine state.
    inner: Arc<EngineInner>,
}

impl TrustEngine {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> TrustEngineBuilder {
        TrustEngineBuilder::default()
    }

    /// Runs the authenticity cascade for one request.
    ///
    /// A confident negative verdict enqueues a fraud alert; alert delivery
    /// never delays or fails this call.
    pub async fn verify_product(&self, request: &VerificationRequest) -> AuthenticityResult {
        self.remember_product(&request.serial, &request.product_id);
        let inner = Arc::clone(&self.inner);
        let owned_request = request.clone();
        let result = tokio::task::spawn_blocking(move || {
            let strategies: Vec<Box<dyn VerificationStrategy>> = inner
                .strategies
                .iter()
                .map(|strategy| {
                    let budget = match strategy.method() {
                        VerificationMethod::Visual => inner.config.timeouts.visual_ms,
                        VerificationMethod::Registry | VerificationMethod::Ledger => {
                            inner.config.timeouts.lookup_ms
                        }
                    };
                    Box::new(BudgetedStrategy {
                        inner: Arc::clone(strategy),
                        budget: Duration::from_millis(budget),
                    }) as Box<dyn VerificationStrategy>
                })
                .collect();
            let verifier = AuthenticityVerifier::new(strategies);
            verifier.verify(&owned_request, &inner.clone_flags)
        })
        .await
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "verification task failed; reporting unverified");
            AuthenticityResult {
                is_authentic: false,
                confidence: Confidence::ZERO,
                trail: Vec::new(),
                flags: BTreeSet::new(),
            }
        });

        if warrants_counterfeit_alert(&result) {
            let kind = if result.flags.contains(DUPLICATE_SERIAL_FLAG) {
                FraudKind::SerialClone
            } else {
                FraudKind::Counterfeit
            };
            let alert = FraudAlert {
                kind,
                severity: Severity::High,
                evidence: vec![EvidenceRef::new(format!("scan:{}", request.scan_id))],
                affected: BTreeSet::from([
                    request.serial.as_str().to_string(),
                    request.product_id.as_str().to_string(),
                ]),
                detected_at: request.requested_at,
            };
            self.inner.outbox.enqueue(alert);
        }
        result
    }

    /// Runs the tampering classifier for one request.
    ///
    /// The four indicator detectors run concurrently; each races the
    /// visual budget and a breach degrades that indicator to absent.
    /// Zero supplied images yield an absent parent signal.
    pub async fn analyze_packaging(
        &self,
        request: &VerificationRequest,
    ) -> SignalResult<TamperingResult> {
        if request.images.is_empty() {
            return SignalResult::absent(SignalSource::TamperClassifier, "no images supplied");
        }

        let budget = Duration::from_millis(self.inner.config.timeouts.visual_ms);
        let mut arms = Vec::with_capacity(self.inner.detectors.len());
        for detector in &self.inner.detectors {
            let detector = Arc::clone(detector);
            let images = request.images.clone();
            // The detectors are mutually independent; each runs as its own
            // task and races the visual budget.
            arms.push(tokio::spawn(async move {
                let detection = timeout(
                    budget,
                    tokio::task::spawn_blocking(move || best_detection(&*detector, &images)),
                )
                .await;
                match detection {
                    Ok(Ok(Ok(signal))) => Some(signal),
                    Ok(Ok(Err(error))) => {
                        tracing::debug!(%error, "indicator detector unavailable");
                        None
                    }
                    Ok(Err(join_error)) => {
                        tracing::warn!(%join_error, "indicator detector task failed");
                        None
                    }
                    Err(_) => {
                        tracing::debug!("indicator detector timed out");
                        None
                    }
                }
            }));
        }
        let mut detections: Vec<IndicatorSignal> = Vec::with_capacity(arms.len());
        for arm in arms {
            if let Ok(Some(signal)) = arm.await {
                detections.push(signal);
            }
        }

        classify_indicators(request.images.len(), &detections).map_or_else(
            || SignalResult::absent(SignalSource::TamperClassifier, "no images supplied"),
            |result| {
                let confidence = result.confidence;
                SignalResult::present(result, confidence, SignalSource::TamperClassifier)
            },
        )
    }

    /// Computes or returns the cached composite trust score.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientSignals`] when every signal is
    /// absent, or [`EngineError::Fingerprint`] when the request cannot be
    /// fingerprinted. Individual source failures degrade to absent signals.
    pub async fn calculate_trust_score(
        &self,
        request: &VerificationRequest,
    ) -> Result<TrustScore, EngineError> {
        self.remember_product(&request.serial, &request.product_id);
        let key = CacheKey {
            product_id: request.product_id.clone(),
            fingerprint: fingerprint_request(request)?,
        };
        self.inner
            .cache
            .get_or_compute(key, || self.compute_score(request))
            .await
    }

    /// Runs the full signal fan-out and aggregation for one request.
    async fn compute_score(&self, request: &VerificationRequest) -> Result<TrustScore, EngineError> {
        let lookup_budget = Duration::from_millis(self.inner.config.timeouts.lookup_ms);

        let authenticity_arm = async {
            map_authenticity_signal(&self.verify_product(request).await)
        };
        let tampering_arm = async {
            let signal = self.analyze_packaging(request).await;
            let reason = signal.reason.clone();
            signal.value.map_or_else(
                || {
                    SignalResult::absent(
                        SignalSource::TamperClassifier,
                        reason.unwrap_or_else(|| "no images supplied".to_string()),
                    )
                },
                |result| map_tampering_signal(&result),
            )
        };
        let freshness_arm = score_source_arm(
            self.inner.freshness.clone(),
            SignalSource::Freshness,
            lookup_budget,
            request.product_id.clone(),
            |source, product_id| source.freshness(product_id),
        );
        let social_arm = score_source_arm(
            self.inner.social_proof.clone(),
            SignalSource::SocialProof,
            lookup_budget,
            request.product_id.clone(),
            |source, product_id| source.social_proof(product_id),
        );

        let (authenticity, tampering, freshness, social_proof) =
            tokio::join!(authenticity_arm, tampering_arm, freshness_arm, social_arm);

        let signals = TrustSignals {
            authenticity,
            tampering,
            freshness,
            social_proof,
        };
        let score = combine_signals(
            signals,
            self.inner.config.weights_for(request.category.as_ref()),
            now_millis(),
        )?;
        Ok(score)
    }

    /// Records one scan and runs duplicate-serial detection over the
    /// rolling window.
    ///
    /// A newly-detected offending pair flags the serial, invalidates the
    /// cached scores of affected products, and enqueues exactly one alert.
    /// Replaying an already-alerted pair is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the history store or ledger
    /// fails.
    pub async fn observe_scan(&self, scan: ScanRecord) -> Result<Option<FraudAlert>, EngineError> {
        let inner = Arc::clone(&self.inner);
        let alert = tokio::task::spawn_blocking(move || inner.observe_scan_blocking(&scan))
            .await
            .map_err(|join_error| {
                EngineError::Store(StoreError::Io(join_error.to_string()))
            })??;

        if let Some(alert) = &alert {
            for entity in &alert.affected {
                if let Ok(serial) = SerialNumber::parse(entity.clone()) {
                    self.invalidate_serial(&serial);
                }
            }
            self.inner.outbox.enqueue(alert.clone());
        }
        Ok(alert)
    }

    /// Appends one tampering-classification correction.
    ///
    /// Corrections are append-only training signal; they never mutate a
    /// past result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the feedback store fails.
    pub async fn submit_feedback(&self, feedback: TamperFeedback) -> Result<(), EngineError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.feedback.append(&feedback))
            .await
            .map_err(|join_error| EngineError::Store(StoreError::Io(join_error.to_string())))??;
        Ok(())
    }

    /// Returns true when the serial is currently flagged as cloned.
    #[must_use]
    pub fn is_serial_flagged(&self, serial: &SerialNumber) -> bool {
        self.inner.clone_flags.is_flagged(serial)
    }

    /// Returns the number of alerts dropped by the outbox so far.
    #[must_use]
    pub fn dropped_alerts(&self) -> u64 {
        self.inner.outbox.dropped()
    }

    /// Records the serial-to-product association for invalidation.
    fn remember_product(&self, serial: &SerialNumber, product_id: &ProductId) {
        self.inner
            .serial_products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(serial.clone())
            .or_default()
            .insert(product_id.clone());
    }

    /// Invalidates cached scores for every product seen with the serial.
    fn invalidate_serial(&self, serial: &SerialNumber) {
        let products: Vec<ProductId> = self
            .inner
            .serial_products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(serial)
            .map(|products| products.iter().cloned().collect())
            .unwrap_or_default();
        for product_id in products {
            tracing::debug!(serial = %serial, product = %product_id, "invalidating cached scores");
            self.inner.cache.invalidate_product(&product_id);
        }
    }
}

impl EngineInner {
    /// Blocking half of scan observation: record, detect, dedup, flag.
    fn observe_scan_blocking(&self, scan: &ScanRecord) -> Result<Option<FraudAlert>, EngineError> {
        self.history.record(scan)?;
        let scans =
            self.history.scans_within(&scan.serial, scan.recorded_at, DUPLICATE_WINDOW_MS)?;
        let Some(finding) = find_duplicate_serial(&scan.serial, &scans) else {
            return Ok(None);
        };

        self.ledger
            .prune_before(finding.window_end.saturating_sub_millis(DUPLICATE_WINDOW_MS))?;
        let mut new_pairs = Vec::new();
        for pair in &finding.pairs {
            let alert_key = AlertKey::for_pair(&finding.serial, pair);
            if self.ledger.mark_if_new(&alert_key, finding.window_end)? {
                new_pairs.push(pair);
            }
        }
        if new_pairs.is_empty() {
            return Ok(None);
        }

        self.clone_flags.flag(&finding.serial);
        let evidence = new_pairs
            .iter()
            .map(|pair| {
                EvidenceRef::new(format!(
                    "pair:{}:{}:{:.1}km",
                    pair.earlier, pair.later, pair.distance_km
                ))
            })
            .collect();
        tracing::info!(serial = %finding.serial, pairs = new_pairs.len(), "duplicate serial detected");
        Ok(Some(FraudAlert {
            kind: FraudKind::SerialClone,
            severity: finding.severity,
            evidence,
            affected: BTreeSet::from([finding.serial.as_str().to_string()]),
            detected_at: finding.window_end,
        }))
    }
}

// ============================================================================
// SECTION: Arm Helpers
// ============================================================================

/// Runs one optional score-signal source with a budget, degrading to an
/// absent signal on unavailability or breach.
async fn score_source_arm<S, F>(
    source: Option<Arc<S>>,
    kind: SignalSource,
    budget: Duration,
    product_id: ProductId,
    call: F,
) -> SignalResult<TrustValue>
where
    S: ?Sized + Send + Sync + 'static,
    F: FnOnce(&S, &ProductId) -> Result<SignalResult<TrustValue>, SourceError> + Send + 'static,
{
    let Some(source) = source else {
        return SignalResult::absent(kind, "source not configured");
    };
    let outcome = timeout(
        budget,
        tokio::task::spawn_blocking(move || call(&source, &product_id)),
    )
    .await;
    match outcome {
        Ok(Ok(Ok(signal))) => signal,
        Ok(Ok(Err(SourceError::Timeout {
            ..
        })))
        | Err(_) => SignalResult::absent(kind, "timeout"),
        Ok(Ok(Err(SourceError::Unavailable(_)))) => {
            SignalResult::absent(kind, "source unavailable")
        }
        Ok(Err(join_error)) => {
            tracing::warn!(%join_error, "signal source task failed");
            SignalResult::absent(kind, "source unavailable")
        }
    }
}

/// Runs a detector over every image and keeps the strongest detection.
fn best_detection(
    detector: &dyn TamperIndicatorDetector,
    images: &[ImageRef],
) -> Result<IndicatorSignal, SourceError> {
    let mut best: Option<IndicatorSignal> = None;
    for image in images {
        let signal = detector.detect(image)?;
        if !signal.present {
            continue;
        }
        let stronger = best
            .as_ref()
            .is_none_or(|current| signal.confidence.value() > current.confidence.value());
        if stronger {
            best = Some(signal);
        }
    }
    Ok(best.unwrap_or_else(|| IndicatorSignal {
        indicator: detector.indicator(),
        present: false,
        confidence: Confidence::ZERO,
        bounding_box: None,
    }))
}

/// Returns the current wall-clock time in unix milliseconds.
fn now_millis() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
    Timestamp::from_unix_millis(millis)
}
