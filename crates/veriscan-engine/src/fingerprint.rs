// crates/veriscan-engine/src/fingerprint.rs
// ============================================================================
// Module: Request Fingerprinting
// Description: Deterministic cache keys from canonical JSON input snapshots.
// Purpose: Address the trust-score cache by content, not by request identity.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! A fingerprint is the SHA-256 digest of the canonical JSON serialization
//! (RFC 8785) of the scoring-relevant request inputs: serial, batch,
//! category, and image digests. Two requests with identical inputs share a
//! fingerprint regardless of scan identity or arrival time, so recomputed
//! scores supersede each other under the same cache key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;
use veriscan_core::BatchCode;
use veriscan_core::CategoryId;
use veriscan_core::VerificationRequest;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fingerprinting errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FingerprintError {
    /// Canonical serialization failed.
    #[error("canonical serialization failed: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Deterministic digest of the scoring-relevant request inputs.
///
/// # Invariants
/// - The value is the lowercase hex SHA-256 of the canonical JSON snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the fingerprint as lowercase hex.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Scoring-relevant subset of a request, in canonical field order.
#[derive(Serialize)]
struct FingerprintInputs<'a> {
    /// Serial number under verification.
    serial: &'a str,
    /// Production batch code, when supplied.
    batch: Option<&'a str>,
    /// Product category, when supplied.
    category: Option<&'a str>,
    /// Image identifiers and content digests.
    images: Vec<(&'a str, Option<&'a str>)>,
}

/// Computes the fingerprint for one request.
///
/// # Errors
///
/// Returns [`FingerprintError`] when canonical serialization fails.
pub fn fingerprint_request(
    request: &VerificationRequest,
) -> Result<Fingerprint, FingerprintError> {
    let inputs = FingerprintInputs {
        serial: request.serial.as_str(),
        batch: request.batch.as_ref().map(BatchCode::as_str),
        category: request.category.as_ref().map(CategoryId::as_str),
        images: request
            .images
            .iter()
            .map(|image| (image.image_id.as_str(), image.sha256_hex.as_deref()))
            .collect(),
    };
    let canonical = serde_jcs::to_vec(&inputs)
        .map_err(|err| FingerprintError::Canonicalization(err.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    Ok(Fingerprint(hex))
}
