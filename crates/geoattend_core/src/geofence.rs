//! Geofence evaluator: haversine distance and circular inclusion.
//!
//! # Responsibility
//! - Compute great-circle distance between two coordinates on a sphere.
//! - Decide whether a reported coordinate lies inside a circular geofence.
//!
//! # Invariants
//! - Pure functions: no state, no I/O, safe for unbounded concurrent use.
//! - The haversine term is clamped to `[0, 1]` before `sqrt`/`asin`, so finite
//!   inputs never produce NaN from rounding near antipodes.
//! - Inclusion is inclusive: `distance == radius` counts as within.

use crate::config::{CoreConfig, MEAN_EARTH_RADIUS_METERS};
use crate::model::coordinate::{Coordinate, GeofenceDefinition};

/// Haversine evaluator bound to a sphere radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceEvaluator {
    earth_radius_meters: f64,
}

impl Default for GeofenceEvaluator {
    fn default() -> Self {
        Self::new(MEAN_EARTH_RADIUS_METERS)
    }
}

impl GeofenceEvaluator {
    /// Builds an evaluator for a sphere of the given radius.
    pub const fn new(earth_radius_meters: f64) -> Self {
        Self {
            earth_radius_meters,
        }
    }

    /// Builds an evaluator from the configured Earth radius.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.earth_radius_meters)
    }

    /// Sphere radius used for distances.
    pub fn earth_radius_meters(&self) -> f64 {
        self.earth_radius_meters
    }

    /// Great-circle distance in meters between `a` and `b`.
    pub fn distance_meters(&self, a: Coordinate, b: Coordinate) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lon1 = a.longitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let lon2 = b.longitude.to_radians();

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let half_chord = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let half_chord = half_chord.clamp(0.0, 1.0);
        let central_angle = 2.0 * half_chord.sqrt().asin();

        self.earth_radius_meters * central_angle
    }

    /// Returns `(distance <= radius_meters, distance)`.
    pub fn is_within(
        &self,
        reported: Coordinate,
        center: Coordinate,
        radius_meters: f64,
    ) -> (bool, f64) {
        let distance = self.distance_meters(reported, center);
        (distance <= radius_meters, distance)
    }

    /// Evaluates `reported` against a class geofence.
    pub fn evaluate(&self, reported: Coordinate, geofence: &GeofenceDefinition) -> (bool, f64) {
        self.is_within(reported, geofence.center, geofence.radius_meters)
    }
}

/// Distance on the mean-radius sphere.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    GeofenceEvaluator::default().distance_meters(a, b)
}

/// Inclusion check on the mean-radius sphere.
pub fn is_within(reported: Coordinate, center: Coordinate, radius_meters: f64) -> (bool, f64) {
    GeofenceEvaluator::default().is_within(reported, center, radius_meters)
}
