//! Core domain logic for geolocation-gated attendance.
//! This crate owns the geofence evaluator, the attendance decision procedure
//! and the storage/service plumbing around them.

pub mod access;
pub mod config;
pub mod db;
pub mod decision;
pub mod geofence;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{require_role, AccessDenied, Actor, RoleSet};
pub use config::{ConfigError, CoreConfig, LoggingConfig};
pub use decision::{
    attempt_mark, AttendanceDecider, AttendanceHistory, ClassLookup, DayWindow, MarkError,
};
pub use geofence::{distance_meters, is_within, GeofenceEvaluator};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status};
pub use model::attendance::{
    AttendanceAttempt, AttendanceDetails, AttendanceId, AttendanceOutcome, AttendanceRecord,
    AttendanceStatus,
};
pub use model::class::{Class, ClassId, ClassValidationError, NewClass};
pub use model::coordinate::{Coordinate, GeoValidationError, GeofenceDefinition};
pub use model::user::{NewUser, User, UserId, UserRole, UserValidationError};
pub use repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
pub use repo::class_repo::{ClassRepository, SqliteClassRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance_service::{AttendanceService, AttendanceServiceError, MarkRequest};
pub use service::class_service::{ClassService, ClassServiceError};
pub use service::user_service::{UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
