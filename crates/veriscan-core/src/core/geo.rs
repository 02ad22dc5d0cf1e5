// crates/veriscan-core/src/core/geo.rs
// ============================================================================
// Module: Veriscan Geospatial Model
// Description: Scan locations and great-circle distance computation.
// Purpose: Support geofence-based duplicate-serial detection.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Scan locations are validated latitude/longitude pairs in degrees.
//! Distance between locations is the haversine great-circle distance in
//! kilometers, which is deterministic and symmetric.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ScanId;
use crate::core::identifiers::SerialNumber;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Mean Earth radius in kilometers used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6_371.0;

// ============================================================================
// SECTION: Geo Point
// ============================================================================

/// Errors for malformed geographic coordinates.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude is outside `[-90, 90]` degrees or non-finite.
    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f64),
    /// Longitude is outside `[-180, 180]` degrees or non-finite.
    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f64),
}

/// Geographic location in decimal degrees.
///
/// # Invariants
/// - `lat_deg` is finite and within `[-90, 90]`.
/// - `lon_deg` is finite and within `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    lat_deg: f64,
    /// Longitude in decimal degrees.
    lon_deg: f64,
}

impl GeoPoint {
    /// Creates a validated geographic point.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] when either coordinate is out of range.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Result<Self, GeoError> {
        if !lat_deg.is_finite() || !(-90.0..=90.0).contains(&lat_deg) {
            return Err(GeoError::LatitudeOutOfRange(lat_deg));
        }
        if !lon_deg.is_finite() || !(-180.0..=180.0).contains(&lon_deg) {
            return Err(GeoError::LongitudeOutOfRange(lon_deg));
        }
        Ok(Self {
            lat_deg,
            lon_deg,
        })
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub const fn lat_deg(self) -> f64 {
        self.lat_deg
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub const fn lon_deg(self) -> f64 {
        self.lon_deg
    }
}

/// Computes the haversine great-circle distance between two points, in
/// kilometers.
#[must_use]
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let d_lat = (b.lat_deg - a.lat_deg).to_radians();
    let d_lon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

// ============================================================================
// SECTION: Scan Records
// ============================================================================

/// One recorded scan of a serial number at a location and time.
///
/// # Invariants
/// - Records are append-only; the history store never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Scan event identifier.
    pub scan_id: ScanId,
    /// Serial number that was scanned.
    pub serial: SerialNumber,
    /// Location where the scan was captured.
    pub location: GeoPoint,
    /// Time the scan was captured.
    pub recorded_at: Timestamp,
}
