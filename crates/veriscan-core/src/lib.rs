// crates/veriscan-core/src/lib.rs
// ============================================================================
// Module: Veriscan Core
// Description: Data model, collaborator interfaces, and deterministic runtime logic.
// Purpose: Define the trust-engine contract surfaces shared by every Veriscan crate.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Veriscan core defines the signal envelopes, verification records, fraud
//! alerts, and trust-score model, together with the pure runtime logic that
//! combines them: the authenticity cascade, the tampering classifier, the
//! duplicate-serial geofence detection, and the weighted aggregation.
//! Invariants:
//! - Core code performs no I/O and never reads wall-clock time.
//! - All combination logic is deterministic for a given input snapshot.
//! - Missing or invalid signals degrade to absent values; they never abort
//!   an aggregation that still has at least one present signal.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::authenticity::AttemptOutcome;
pub use crate::core::authenticity::AuthenticityResult;
pub use crate::core::authenticity::DUPLICATE_SERIAL_FLAG;
pub use crate::core::authenticity::VerificationAttempt;
pub use crate::core::authenticity::VerificationMethod;
pub use crate::core::confidence::Confidence;
pub use crate::core::confidence::TrustValue;
pub use crate::core::fraud::AlertKey;
pub use crate::core::fraud::DuplicateSerialFinding;
pub use crate::core::fraud::EvidenceRef;
pub use crate::core::fraud::FraudAlert;
pub use crate::core::fraud::FraudKind;
pub use crate::core::fraud::OffendingPair;
pub use crate::core::fraud::Severity;
pub use crate::core::geo::GeoError;
pub use crate::core::geo::GeoPoint;
pub use crate::core::geo::ScanRecord;
pub use crate::core::geo::great_circle_distance_km;
pub use crate::core::identifiers::BatchCode;
pub use crate::core::identifiers::CategoryId;
pub use crate::core::identifiers::InvalidInputError;
pub use crate::core::identifiers::ProductId;
pub use crate::core::identifiers::ScanId;
pub use crate::core::identifiers::SerialNumber;
pub use crate::core::score::SignalWeights;
pub use crate::core::score::TrustScore;
pub use crate::core::score::TrustSignals;
pub use crate::core::signal::SignalKind;
pub use crate::core::signal::SignalResult;
pub use crate::core::signal::SignalSource;
pub use crate::core::tampering::BoundingBox;
pub use crate::core::tampering::EvidenceRegion;
pub use crate::core::tampering::ImageRef;
pub use crate::core::tampering::IndicatorSignal;
pub use crate::core::tampering::TamperFeedback;
pub use crate::core::tampering::TamperIndicator;
pub use crate::core::tampering::TamperingResult;
pub use crate::core::tampering::TamperingStatus;
pub use crate::core::time::Timestamp;
pub use crate::interfaces::AlertLedger;
pub use crate::interfaces::AlertSink;
pub use crate::interfaces::FeedbackStore;
pub use crate::interfaces::FreshnessSource;
pub use crate::interfaces::PublishError;
pub use crate::interfaces::ScanHistoryStore;
pub use crate::interfaces::SerialCloneIndex;
pub use crate::interfaces::SocialProofSource;
pub use crate::interfaces::SourceError;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::TamperIndicatorDetector;
pub use crate::interfaces::VerificationRequest;
pub use crate::interfaces::VerificationStrategy;
pub use crate::runtime::classifier::classify_indicators;
pub use crate::runtime::classifier::status_for_confidence;
pub use crate::runtime::fraud::DUPLICATE_DISTANCE_KM;
pub use crate::runtime::fraud::DUPLICATE_WINDOW_MS;
pub use crate::runtime::fraud::find_duplicate_serial;
pub use crate::runtime::score::InsufficientSignalsError;
pub use crate::runtime::score::combine_signals;
pub use crate::runtime::score::map_authenticity_signal;
pub use crate::runtime::score::map_tampering_signal;
pub use crate::runtime::verifier::AuthenticityVerifier;
pub use crate::runtime::verifier::COUNTERFEIT_ALERT_FLOOR;
pub use crate::runtime::verifier::PASS_CONFIDENCE_FLOOR;
pub use crate::runtime::verifier::warrants_counterfeit_alert;
