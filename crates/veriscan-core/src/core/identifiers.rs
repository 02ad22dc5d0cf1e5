// crates/veriscan-core/src/core/identifiers.rs
// ============================================================================
// Module: Veriscan Identifiers
// Description: Canonical validated identifiers for products, scans, and batches.
// Purpose: Provide strongly typed identifiers with parse-time input validation.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Veriscan.
//! Identifiers are opaque strings validated once at construction boundaries:
//! malformed input is rejected with [`InvalidInputError`] before any signal
//! source is invoked. Identifiers serialize as plain strings on the wire.
//! Invariants:
//! - Identifiers are never empty and never exceed their length bound.
//! - Identifiers contain only ASCII graphic characters (no whitespace,
//!   no control characters).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Maximum length accepted for product, serial, and scan identifiers.
const MAX_IDENTIFIER_LENGTH: usize = 128;
/// Maximum length accepted for batch codes and category identifiers.
const MAX_SHORT_IDENTIFIER_LENGTH: usize = 64;

/// Input validation errors surfaced before any signal source is invoked.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    /// Identifier is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name for the rejected input.
        field: &'static str,
    },
    /// Identifier exceeds the maximum accepted length.
    #[error("{field} exceeds {max} characters (got {actual})")]
    TooLong {
        /// Field name for the rejected input.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
        /// Actual input length.
        actual: usize,
    },
    /// Identifier contains a character outside the ASCII graphic range.
    #[error("{field} contains an illegal character")]
    IllegalCharacter {
        /// Field name for the rejected input.
        field: &'static str,
    },
}

/// Validates an identifier string against the shared charset and length rules.
fn validate_identifier(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), InvalidInputError> {
    if value.is_empty() {
        return Err(InvalidInputError::Empty {
            field,
        });
    }
    if value.len() > max {
        return Err(InvalidInputError::TooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    if !value.chars().all(|ch| ch.is_ascii_graphic()) {
        return Err(InvalidInputError::IllegalCharacter {
            field,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Product instance identifier.
///
/// # Invariants
/// - Non-empty ASCII graphic string of at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parses a product identifier, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the input violates identifier rules.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidInputError> {
        let id = id.into();
        validate_identifier("product_id", &id, MAX_IDENTIFIER_LENGTH)?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Manufacturer-assigned serial number for one physical product instance.
///
/// # Invariants
/// - Non-empty ASCII graphic string of at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Parses a serial number, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the input violates identifier rules.
    pub fn parse(serial: impl Into<String>) -> Result<Self, InvalidInputError> {
        let serial = serial.into();
        validate_identifier("serial_number", &serial, MAX_IDENTIFIER_LENGTH)?;
        Ok(Self(serial))
    }

    /// Returns the serial number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Production batch code shared by a group of product instances.
///
/// # Invariants
/// - Non-empty ASCII graphic string of at most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchCode(String);

impl BatchCode {
    /// Parses a batch code, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the input violates identifier rules.
    pub fn parse(code: impl Into<String>) -> Result<Self, InvalidInputError> {
        let code = code.into();
        validate_identifier("batch_code", &code, MAX_SHORT_IDENTIFIER_LENGTH)?;
        Ok(Self(code))
    }

    /// Returns the batch code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Scan event identifier, unique per capture.
///
/// # Invariants
/// - Non-empty ASCII graphic string of at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Parses a scan identifier, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the input violates identifier rules.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidInputError> {
        let id = id.into();
        validate_identifier("scan_id", &id, MAX_IDENTIFIER_LENGTH)?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Product category identifier used to resolve weight overrides.
///
/// # Invariants
/// - Non-empty ASCII graphic string of at most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Parses a category identifier, rejecting malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the input violates identifier rules.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidInputError> {
        let id = id.into();
        validate_identifier("category_id", &id, MAX_SHORT_IDENTIFIER_LENGTH)?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
