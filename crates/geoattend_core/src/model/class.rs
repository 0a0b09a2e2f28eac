//! Class model with its attendance geofence.
//!
//! # Invariants
//! - `code` is unique across classes (enforced by storage).
//! - The geofence is set at creation and never updated.

use crate::model::coordinate::{GeoValidationError, GeofenceDefinition};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned class identifier.
pub type ClassId = i64;

/// Persisted class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub geofence: GeofenceDefinition,
    /// Owning lecturer.
    pub lecturer_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Class creation input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub geofence: GeofenceDefinition,
}

impl NewClass {
    /// Trims text fields and drops a blank description.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            geofence: self.geofence,
        }
    }

    /// Checks name, code and geofence of a normalized class.
    pub fn validate(&self) -> Result<(), ClassValidationError> {
        if self.name.trim().is_empty() {
            return Err(ClassValidationError::EmptyName);
        }
        if self.code.trim().is_empty() {
            return Err(ClassValidationError::EmptyCode);
        }
        self.geofence
            .validate()
            .map_err(ClassValidationError::Geofence)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassValidationError {
    EmptyName,
    EmptyCode,
    Geofence(GeoValidationError),
}

impl Display for ClassValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "class name must not be blank"),
            Self::EmptyCode => write!(f, "class code must not be blank"),
            Self::Geofence(err) => write!(f, "invalid geofence: {err}"),
        }
    }
}

impl Error for ClassValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geofence(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassValidationError, NewClass};
    use crate::model::coordinate::{Coordinate, GeoValidationError, GeofenceDefinition};

    #[test]
    fn normalized_drops_blank_description() {
        let input = NewClass {
            name: " Physics ".to_string(),
            code: " PHY101 ".to_string(),
            description: Some("   ".to_string()),
            geofence: GeofenceDefinition::new(Coordinate::new(6.5244, 3.3792), 100.0),
        };
        let normalized = input.normalized();
        assert_eq!(normalized.name, "Physics");
        assert_eq!(normalized.code, "PHY101");
        assert_eq!(normalized.description, None);
        normalized.validate().expect("normalized class is valid");
    }

    #[test]
    fn validate_reports_geofence_errors() {
        let input = NewClass {
            name: "Physics".to_string(),
            code: "PHY101".to_string(),
            description: None,
            geofence: GeofenceDefinition::new(Coordinate::new(91.0, 3.3792), 100.0),
        };
        assert_eq!(
            input.validate().unwrap_err(),
            ClassValidationError::Geofence(GeoValidationError::LatitudeOutOfRange(91.0))
        );
    }
}
