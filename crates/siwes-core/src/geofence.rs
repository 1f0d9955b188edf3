//! Geofence evaluation: great-circle distance against an allowed radius.
//!
//! Pure computation with no side effects. Malformed coordinates are a
//! validation error, not a computation error — they are rejected before any
//! arithmetic runs.

use siwes_contracts::error::{TrackError, TrackResult};

/// Mean Earth radius in metres, as used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// The outcome of one geofence evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceCheck {
    /// Unrounded great-circle distance in metres. Callers round to the
    /// nearest whole metre for storage and display.
    pub distance_meters: f64,
    /// `true` when the reported point lies within the allowed radius.
    /// The boundary is inclusive: distance exactly equal to the radius
    /// is within.
    pub within: bool,
}

impl GeofenceCheck {
    /// The stored form of the distance: rounded to the nearest metre.
    pub fn rounded_distance(&self) -> i64 {
        self.distance_meters.round() as i64
    }
}

/// Evaluate whether a reported coordinate lies within `radius_meters` of a
/// reference location.
///
/// Uses the haversine formula over a spherical Earth. The validity
/// comparison uses the unrounded distance; only storage rounds.
///
/// Returns `TrackError::Validation` for non-finite or out-of-range
/// coordinates (|latitude| > 90, |longitude| > 180) or a negative radius.
pub fn evaluate(
    reported_lat: f64,
    reported_lon: f64,
    reference_lat: f64,
    reference_lon: f64,
    radius_meters: f64,
) -> TrackResult<GeofenceCheck> {
    validate_point(reported_lat, reported_lon)?;
    check_coordinate(reference_lat, reference_lon, "reference")?;
    if !radius_meters.is_finite() || radius_meters < 0.0 {
        return Err(TrackError::Validation {
            reason: format!("allowed radius must be a non-negative number, got {radius_meters}"),
        });
    }

    let distance_meters = haversine(reported_lat, reported_lon, reference_lat, reference_lon);

    Ok(GeofenceCheck {
        distance_meters,
        within: distance_meters <= radius_meters,
    })
}

/// Great-circle distance in metres between two (lat, lon) pairs, both in
/// degrees.
fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Reject a reported coordinate that is non-finite or out of range.
///
/// Callers use this to fail fast before any lookups; `evaluate` applies
/// the same check internally.
pub fn validate_point(lat: f64, lon: f64) -> TrackResult<()> {
    check_coordinate(lat, lon, "reported")
}

fn check_coordinate(lat: f64, lon: f64, which: &str) -> TrackResult<()> {
    if !lat.is_finite() || lat.abs() > 90.0 {
        return Err(TrackError::Validation {
            reason: format!("{which} latitude out of range: {lat}"),
        });
    }
    if !lon.is_finite() || lon.abs() > 180.0 {
        return Err(TrackError::Validation {
            reason: format!("{which} longitude out of range: {lon}"),
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
