//! Attendance attempt, outcome and record model.
//!
//! # Responsibility
//! - Define the ephemeral attempt input and the computed outcome.
//! - Define the persisted record and its joined list projection.
//!
//! # Invariants
//! - An outcome's status is `Approved` or `Denied`; `Pending` only exists as a
//!   stored default and is never produced by the decision procedure.
//! - `distance_meters` is non-negative.
//! - Timestamps are Unix epoch milliseconds in UTC.

use crate::model::class::ClassId;
use crate::model::coordinate::Coordinate;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a persisted attendance record.
pub type AttendanceId = Uuid;

/// Inclusion decision for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Approved,
    Denied,
    /// Storage default; no code path in this crate produces it.
    Pending,
}

impl AttendanceStatus {
    /// Derives the status from the geofence inclusion result.
    pub fn from_inclusion(within: bool) -> Self {
        if within {
            Self::Approved
        } else {
            Self::Denied
        }
    }

    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Pending => "pending",
        }
    }

    /// Inverse of [`AttendanceStatus::as_str`]; unknown text yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// One student's request to mark presence for one class at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceAttempt {
    pub student_id: UserId,
    pub class_id: ClassId,
    pub reported: Coordinate,
    pub attempt_time_ms: i64,
}

/// Computed decision for one attempt, prior to persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceOutcome {
    pub student_id: UserId,
    pub class_id: ClassId,
    #[serde(flatten)]
    pub reported: Coordinate,
    pub distance_meters: f64,
    pub status: AttendanceStatus,
}

/// Persisted attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    #[serde(flatten)]
    pub outcome: AttendanceOutcome,
    pub marked_at: i64,
}

impl AttendanceRecord {
    /// Wraps an outcome with a fresh identifier and mark timestamp.
    pub fn from_outcome(outcome: AttendanceOutcome, marked_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            outcome,
            marked_at,
        }
    }
}

/// Attendance row joined with student and class display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceDetails {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub student_name: String,
    pub class_name: String,
    pub class_code: String,
}
