//! Geographic value types.
//!
//! # Responsibility
//! - Define the immutable `Coordinate` pair in degrees.
//! - Define the circular `GeofenceDefinition` owned by each class.
//!
//! # Invariants
//! - `Coordinate::new` performs no range checks; range checks live in
//!   `validate`, used by write paths before persistence.
//! - A validated geofence has a center inside valid ranges and a finite
//!   radius greater than zero.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate without range checks.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate and checks latitude/longitude ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, GeoValidationError> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Checks `latitude ∈ [-90, 90]` and `longitude ∈ [-180, 180]`.
    ///
    /// NaN fails both range checks.
    pub fn validate(&self) -> Result<(), GeoValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeoValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Circular attendance zone: center plus radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceDefinition {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl GeofenceDefinition {
    /// Builds a geofence without validation.
    pub const fn new(center: Coordinate, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Checks the center coordinate and that the radius is positive and finite.
    pub fn validate(&self) -> Result<(), GeoValidationError> {
        self.center.validate()?;
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeoValidationError::NonPositiveRadius(self.radius_meters));
        }
        Ok(())
    }
}

/// Range violations for geographic inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoValidationError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    NonPositiveRadius(f64),
}

impl Display for GeoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::NonPositiveRadius(value) => {
                write!(f, "geofence radius must be > 0 meters, got {value}")
            }
        }
    }
}

impl Error for GeoValidationError {}
