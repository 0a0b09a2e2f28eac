//! Attendance marking and listing use-cases.
//!
//! # Responsibility
//! - Gate callers by role, validate the reported coordinate, run the decision
//!   procedure and persist its outcome.
//! - Serve per-student, per-class and "mine" attendance lists.
//!
//! # Invariants
//! - `marked_at` equals the attempt time, so the persisted row always falls in
//!   the window the duplicate check used.
//! - A storage uniqueness conflict on insert is reported as `AlreadyMarked`,
//!   the same rejection the pre-check produces.
//! - A caller whose account no longer exists is rejected with
//!   `StudentNotFound` before the decision runs.
//! - A class removed between the decision and the insert is reported as
//!   `ClassNotFound`.
//! - Rejected attempts leave no rows behind.

use crate::access::{require_role, AccessDenied, Actor, RoleSet};
use crate::config::{ConfigError, CoreConfig};
use crate::decision::{AttendanceDecider, ClassLookup, MarkError};
use crate::model::attendance::{AttendanceAttempt, AttendanceDetails, AttendanceRecord};
use crate::model::class::ClassId;
use crate::model::coordinate::{Coordinate, GeoValidationError};
use crate::model::user::UserId;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::class_repo::ClassRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Student-supplied mark request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkRequest {
    pub class_id: ClassId,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug)]
pub enum AttendanceServiceError {
    Forbidden(AccessDenied),
    InvalidCoordinate(GeoValidationError),
    ClassNotFound(ClassId),
    StudentNotFound(UserId),
    AlreadyMarked { student_id: UserId, class_id: ClassId },
    Repo(RepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(err) => write!(f, "{err}"),
            Self::InvalidCoordinate(err) => write!(f, "{err}"),
            Self::ClassNotFound(id) => write!(f, "class not found: {id}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::AlreadyMarked { class_id, .. } => write!(
                f,
                "attendance already marked for class {class_id} today"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::InvalidCoordinate(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AccessDenied> for AttendanceServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

impl From<MarkError> for AttendanceServiceError {
    fn from(value: MarkError) -> Self {
        match value {
            MarkError::ClassNotFound(id) => Self::ClassNotFound(id),
            MarkError::AlreadyMarked {
                student_id,
                class_id,
                ..
            } => Self::AlreadyMarked {
                student_id,
                class_id,
            },
            MarkError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Attendance use-case service.
pub struct AttendanceService<C, A, U>
where
    C: ClassRepository + ClassLookup,
    A: AttendanceRepository,
    U: UserRepository,
{
    classes: C,
    attendance: A,
    users: U,
    decider: AttendanceDecider,
}

impl<C, A, U> AttendanceService<C, A, U>
where
    C: ClassRepository + ClassLookup,
    A: AttendanceRepository,
    U: UserRepository,
{
    /// # Errors
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(classes: C, attendance: A, users: U, config: &CoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            classes,
            attendance,
            users,
            decider: AttendanceDecider::new(config)?,
        })
    }

    /// Marks attendance for the calling student at the current time.
    pub fn mark(
        &self,
        actor: &Actor,
        request: &MarkRequest,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        self.mark_at(actor, request, now_epoch_ms())
    }

    /// Marks attendance for the calling student at `attempt_time_ms`.
    ///
    /// # Errors
    /// - `Forbidden` unless the caller is a student.
    /// - `InvalidCoordinate` when latitude/longitude are out of range.
    /// - `StudentNotFound` when the caller has no stored account.
    /// - `ClassNotFound` / `AlreadyMarked` from the decision procedure or
    ///   from the storage uniqueness constraint.
    pub fn mark_at(
        &self,
        actor: &Actor,
        request: &MarkRequest,
        attempt_time_ms: i64,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        require_role(actor, &RoleSet::STUDENT_ONLY)?;
        let reported = Coordinate::try_new(request.latitude, request.longitude)
            .map_err(AttendanceServiceError::InvalidCoordinate)?;
        self.require_student(actor.user_id)?;

        let attempt = AttendanceAttempt {
            student_id: actor.user_id,
            class_id: request.class_id,
            reported,
            attempt_time_ms,
        };

        let outcome = match self
            .decider
            .attempt_mark(&attempt, &self.classes, &self.attendance)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(
                    "event=attendance_mark module=service status=rejected student_id={} class_id={} reason={}",
                    attempt.student_id, attempt.class_id, err
                );
                return Err(err.into());
            }
        };

        let record = AttendanceRecord::from_outcome(outcome, attempt_time_ms);
        let window = self.decider.window_for(attempt_time_ms);
        match self.attendance.insert_record(&record, window) {
            Ok(()) => {}
            Err(RepoError::Conflict { .. }) => {
                info!(
                    "event=attendance_mark module=service status=rejected student_id={} class_id={} reason=concurrent_duplicate",
                    attempt.student_id, attempt.class_id
                );
                return Err(AttendanceServiceError::AlreadyMarked {
                    student_id: attempt.student_id,
                    class_id: attempt.class_id,
                });
            }
            Err(RepoError::MissingReference { .. }) => {
                let err = self.classify_missing_reference(&attempt)?;
                info!(
                    "event=attendance_mark module=service status=rejected student_id={} class_id={} reason={}",
                    attempt.student_id, attempt.class_id, err
                );
                return Err(err);
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            "event=attendance_mark module=service status=ok student_id={} class_id={} decision={} distance_m={:.1}",
            outcome.student_id,
            outcome.class_id,
            outcome.status.as_str(),
            outcome.distance_meters
        );
        Ok(record)
    }

    /// Lists one student's attendance, newest first. Staff only.
    pub fn list_for_student(
        &self,
        actor: &Actor,
        student_id: UserId,
    ) -> Result<Vec<AttendanceDetails>, AttendanceServiceError> {
        require_role(actor, &RoleSet::STAFF)?;
        if self.users.get_user(student_id)?.is_none() {
            return Err(AttendanceServiceError::StudentNotFound(student_id));
        }
        Ok(self.attendance.list_for_student(student_id)?)
    }

    /// Lists one class's attendance, newest first. Staff only.
    pub fn list_for_class(
        &self,
        actor: &Actor,
        class_id: ClassId,
    ) -> Result<Vec<AttendanceDetails>, AttendanceServiceError> {
        require_role(actor, &RoleSet::STAFF)?;
        if self.classes.get_class(class_id)?.is_none() {
            return Err(AttendanceServiceError::ClassNotFound(class_id));
        }
        Ok(self.attendance.list_for_class(class_id)?)
    }

    fn require_student(&self, student_id: UserId) -> Result<(), AttendanceServiceError> {
        if self.users.get_user(student_id)?.is_none() {
            info!(
                "event=attendance_mark module=service status=rejected student_id={} reason=unknown_student",
                student_id
            );
            return Err(AttendanceServiceError::StudentNotFound(student_id));
        }
        Ok(())
    }

    /// Names the parent row that vanished under a failed insert.
    fn classify_missing_reference(
        &self,
        attempt: &AttendanceAttempt,
    ) -> Result<AttendanceServiceError, AttendanceServiceError> {
        if self.users.get_user(attempt.student_id)?.is_none() {
            return Ok(AttendanceServiceError::StudentNotFound(attempt.student_id));
        }
        Ok(AttendanceServiceError::ClassNotFound(attempt.class_id))
    }

    /// Lists the caller's own attendance, newest first.
    pub fn list_mine(
        &self,
        actor: &Actor,
    ) -> Result<Vec<AttendanceDetails>, AttendanceServiceError> {
        require_role(actor, &RoleSet::ANY_USER)?;
        Ok(self.attendance.list_for_student(actor.user_id)?)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
