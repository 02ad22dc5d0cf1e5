// crates/veriscan-core/tests/cascade_unit.rs
// ============================================================================
// Module: Cascade Unit Tests
// Description: Early exit, exhaustion, unavailability, and downgrade behavior.
// Purpose: Ensure the cascade stops, continues, and downgrades deterministically.
// ============================================================================

//! Cascade tests for ordering, early exit, and duplicate-serial downgrade.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use veriscan_core::AttemptOutcome;
use veriscan_core::AuthenticityVerifier;
use veriscan_core::Confidence;
use veriscan_core::DUPLICATE_SERIAL_FLAG;
use veriscan_core::ProductId;
use veriscan_core::ScanId;
use veriscan_core::SerialCloneIndex;
use veriscan_core::SerialNumber;
use veriscan_core::SourceError;
use veriscan_core::Timestamp;
use veriscan_core::VerificationAttempt;
use veriscan_core::VerificationMethod;
use veriscan_core::VerificationRequest;
use veriscan_core::VerificationStrategy;
use veriscan_core::warrants_counterfeit_alert;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Strategy returning a scripted attempt and recording its invocation.
struct ScriptedStrategy {
    method: VerificationMethod,
    outcome: Result<(AttemptOutcome, f64), SourceError>,
    calls: Arc<Mutex<Vec<VerificationMethod>>>,
}

impl VerificationStrategy for ScriptedStrategy {
    fn method(&self) -> VerificationMethod {
        self.method
    }

    fn attempt(
        &self,
        _request: &VerificationRequest,
    ) -> Result<VerificationAttempt, SourceError> {
        self.calls.lock().unwrap().push(self.method);
        match &self.outcome {
            Ok((outcome, confidence)) => Ok(VerificationAttempt {
                method: self.method,
                outcome: *outcome,
                confidence: Confidence::new(*confidence).unwrap(),
                detail: None,
            }),
            Err(error) => Err(error.clone()),
        }
    }
}

/// Clone index with a fixed flagged-serial set.
struct FixedCloneIndex {
    flagged: BTreeSet<String>,
}

impl SerialCloneIndex for FixedCloneIndex {
    fn is_flagged(&self, serial: &SerialNumber) -> bool {
        self.flagged.contains(serial.as_str())
    }
}

fn no_flags() -> FixedCloneIndex {
    FixedCloneIndex {
        flagged: BTreeSet::new(),
    }
}

fn request() -> VerificationRequest {
    VerificationRequest {
        scan_id: ScanId::parse("scan-1").unwrap(),
        product_id: ProductId::parse("product-1").unwrap(),
        serial: SerialNumber::parse("SN-1001").unwrap(),
        batch: None,
        category: None,
        images: Vec::new(),
        requested_at: Timestamp::from_unix_millis(1_000),
    }
}

fn verifier_with(
    outcomes: Vec<(VerificationMethod, Result<(AttemptOutcome, f64), SourceError>)>,
) -> (AuthenticityVerifier, Arc<Mutex<Vec<VerificationMethod>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let strategies = outcomes
        .into_iter()
        .map(|(method, outcome)| {
            Box::new(ScriptedStrategy {
                method,
                outcome,
                calls: Arc::clone(&calls),
            }) as Box<dyn VerificationStrategy>
        })
        .collect();
    (AuthenticityVerifier::new(strategies), calls)
}

fn full_cascade(
    registry: Result<(AttemptOutcome, f64), SourceError>,
    ledger: Result<(AttemptOutcome, f64), SourceError>,
    visual: Result<(AttemptOutcome, f64), SourceError>,
) -> (AuthenticityVerifier, Arc<Mutex<Vec<VerificationMethod>>>) {
    verifier_with(vec![
        (VerificationMethod::Registry, registry),
        (VerificationMethod::Ledger, ledger),
        (VerificationMethod::Visual, visual),
    ])
}

// ============================================================================
// SECTION: Input Validation
// ============================================================================

#[test]
fn malformed_identifiers_are_rejected_before_any_source_call() {
    assert!(SerialNumber::parse("").is_err());
    assert!(SerialNumber::parse("SN 1001").is_err());
    assert!(SerialNumber::parse("SN-\u{7}1001").is_err());
    assert!(SerialNumber::parse("x".repeat(129)).is_err());
    assert!(ProductId::parse("\t").is_err());
    assert!(ScanId::parse("scan-1").is_ok());
}

#[test]
fn identifier_errors_name_the_field() {
    let error = SerialNumber::parse("").unwrap_err();
    assert!(error.to_string().contains("serial_number"));
    let error = ProductId::parse("x".repeat(200)).unwrap_err();
    assert!(error.to_string().contains("128"));
}

// ============================================================================
// SECTION: Early Exit
// ============================================================================

#[test]
fn confident_registry_pass_stops_cascade() {
    let (verifier, calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.95)),
        Ok((AttemptOutcome::Pass, 0.99)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(result.is_authentic);
    assert_eq!(result.trail.len(), 1);
    assert_eq!(result.trail[0].method, VerificationMethod::Registry);
    assert!((result.confidence.value() - 0.95).abs() < 1e-9);
    assert_eq!(*calls.lock().unwrap(), vec![VerificationMethod::Registry]);
}

#[test]
fn weak_pass_continues_to_next_method() {
    let (verifier, calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.50)),
        Ok((AttemptOutcome::Pass, 0.90)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(result.is_authentic);
    assert_eq!(result.trail.len(), 2);
    assert!((result.confidence.value() - 0.90).abs() < 1e-9);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![VerificationMethod::Registry, VerificationMethod::Ledger]
    );
}

#[test]
fn pass_at_exact_floor_stops_cascade() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.70)),
        Ok((AttemptOutcome::Inconclusive, 0.0)),
        Ok((AttemptOutcome::Inconclusive, 0.0)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(result.is_authentic);
    assert_eq!(result.trail.len(), 1);
}

// ============================================================================
// SECTION: Exhaustion
// ============================================================================

#[test]
fn all_inconclusive_exhausts_in_order() {
    let (verifier, calls) = full_cascade(
        Ok((AttemptOutcome::Inconclusive, 0.30)),
        Ok((AttemptOutcome::Inconclusive, 0.55)),
        Ok((AttemptOutcome::Inconclusive, 0.40)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!result.is_authentic);
    assert_eq!(result.trail.len(), 3);
    let methods: Vec<VerificationMethod> =
        result.trail.iter().map(|attempt| attempt.method).collect();
    assert_eq!(
        methods,
        vec![
            VerificationMethod::Registry,
            VerificationMethod::Ledger,
            VerificationMethod::Visual
        ]
    );
    // Confidence is the maximum across inconclusive attempts.
    assert!((result.confidence.value() - 0.55).abs() < 1e-9);
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[test]
fn all_failures_yield_zero_confidence() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Fail, 0.90)),
        Ok((AttemptOutcome::Fail, 0.80)),
        Ok((AttemptOutcome::Fail, 0.70)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!result.is_authentic);
    assert_eq!(result.trail.len(), 3);
    assert!((result.confidence.value() - 0.0).abs() < 1e-9);
}

#[test]
fn weak_pass_survives_exhaustion() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.60)),
        Ok((AttemptOutcome::Fail, 0.50)),
        Ok((AttemptOutcome::Inconclusive, 0.20)),
    );

    let result = verifier.verify(&request(), &no_flags());

    // The last passing attempt determines the verdict even below the
    // early-exit floor.
    assert!(result.is_authentic);
    assert_eq!(result.trail.len(), 3);
    assert!((result.confidence.value() - 0.60).abs() < 1e-9);
    assert_eq!(result.last_pass().unwrap().method, VerificationMethod::Registry);
}

// ============================================================================
// SECTION: Source Unavailability
// ============================================================================

#[test]
fn unavailable_source_records_inconclusive_and_continues() {
    let (verifier, calls) = full_cascade(
        Err(SourceError::Unavailable("registry down".to_string())),
        Ok((AttemptOutcome::Pass, 0.85)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(result.is_authentic);
    assert_eq!(result.trail.len(), 2);
    assert_eq!(result.trail[0].outcome, AttemptOutcome::Inconclusive);
    assert_eq!(result.trail[0].detail.as_deref(), Some("source unavailable"));
    assert!((result.trail[0].confidence.value() - 0.0).abs() < 1e-9);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[test]
fn every_source_unavailable_still_returns_result() {
    let (verifier, _calls) = full_cascade(
        Err(SourceError::Unavailable("down".to_string())),
        Err(SourceError::Timeout {
            budget_ms: 500,
        }),
        Err(SourceError::Unavailable("down".to_string())),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!result.is_authentic);
    assert_eq!(result.trail.len(), 3);
    assert_eq!(result.trail[1].detail.as_deref(), Some("timeout"));
    assert!((result.confidence.value() - 0.0).abs() < 1e-9);
}

// ============================================================================
// SECTION: Duplicate-Serial Downgrade
// ============================================================================

#[test]
fn flagged_serial_downgrades_confident_pass() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.95)),
        Ok((AttemptOutcome::Pass, 0.99)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );
    let clone_index = FixedCloneIndex {
        flagged: BTreeSet::from(["SN-1001".to_string()]),
    };

    let result = verifier.verify(&request(), &clone_index);

    assert!(!result.is_authentic);
    assert!(result.flags.contains(DUPLICATE_SERIAL_FLAG));
    // The trail still shows the cascade outcome for explainability.
    assert_eq!(result.trail.len(), 1);
}

#[test]
fn unflagged_serial_carries_no_downgrade_flag() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.95)),
        Ok((AttemptOutcome::Pass, 0.99)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(result.flags.is_empty());
}

// ============================================================================
// SECTION: Alert Predicate
// ============================================================================

#[test]
fn confident_negative_verdict_warrants_alert() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Inconclusive, 0.65)),
        Ok((AttemptOutcome::Inconclusive, 0.40)),
        Ok((AttemptOutcome::Inconclusive, 0.10)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!result.is_authentic);
    assert!(warrants_counterfeit_alert(&result));
}

#[test]
fn low_confidence_negative_verdict_does_not_warrant_alert() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Inconclusive, 0.20)),
        Ok((AttemptOutcome::Inconclusive, 0.30)),
        Ok((AttemptOutcome::Inconclusive, 0.10)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!warrants_counterfeit_alert(&result));
}

#[test]
fn authentic_verdict_never_warrants_alert() {
    let (verifier, _calls) = full_cascade(
        Ok((AttemptOutcome::Pass, 0.95)),
        Ok((AttemptOutcome::Pass, 0.99)),
        Ok((AttemptOutcome::Pass, 0.99)),
    );

    let result = verifier.verify(&request(), &no_flags());

    assert!(!warrants_counterfeit_alert(&result));
}
