//! Attendance decision procedure.
//!
//! # Responsibility
//! - Turn one `AttendanceAttempt` into an `AttendanceOutcome` using read-only
//!   lookups for the class geofence and prior attendance.
//!
//! # Invariants
//! - The procedure performs no writes; persisting the outcome is the caller's
//!   job.
//! - "Same day" is the epoch-aligned UTC window containing the attempt time,
//!   never the caller's local day.
//! - Status is `Approved` iff distance <= radius, otherwise `Denied`.
//! - Roles are never inspected here.
//!
//! The check-then-insert sequence is only race-free when the persistence
//! layer enforces uniqueness per `(student, class, window)`; the SQLite schema
//! does, via `UNIQUE (student_id, class_id, window_start)`.

use crate::config::{ConfigError, CoreConfig, UTC_DAY_MS};
use crate::geofence::GeofenceEvaluator;
use crate::model::attendance::{AttendanceAttempt, AttendanceOutcome, AttendanceStatus};
use crate::model::class::ClassId;
use crate::model::coordinate::GeofenceDefinition;
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Half-open time window `[start_ms, end_ms)` in Unix epoch milliseconds.
///
/// Both bounds saturate at the `i64` range; a window whose `end_ms` is
/// `i64::MAX` also contains `i64::MAX` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayWindow {
    /// Window of `length_ms` aligned to the epoch that contains `instant_ms`.
    ///
    /// With the default one-day length this is `[UTC midnight, +24h)`.
    /// Pre-epoch instants floor toward negative infinity. Non-positive
    /// lengths are treated as one millisecond.
    pub fn containing(instant_ms: i64, length_ms: i64) -> Self {
        let length_ms = length_ms.max(1);
        let start_ms = instant_ms.saturating_sub(instant_ms.rem_euclid(length_ms));
        Self {
            start_ms,
            end_ms: start_ms.saturating_add(length_ms),
        }
    }

    /// Last instant inside the window.
    pub fn last_ms(&self) -> i64 {
        if self.end_ms == i64::MAX {
            i64::MAX
        } else {
            self.end_ms - 1
        }
    }

    /// Whether `instant_ms` falls inside the window.
    pub fn contains(&self, instant_ms: i64) -> bool {
        (self.start_ms..=self.last_ms()).contains(&instant_ms)
    }
}

/// Resolves a class id to its geofence.
pub trait ClassLookup {
    fn geofence_for(&self, class_id: ClassId) -> RepoResult<Option<GeofenceDefinition>>;
}

/// Answers whether a student already has a record for a class in a window.
pub trait AttendanceHistory {
    fn has_record_in_window(
        &self,
        student_id: UserId,
        class_id: ClassId,
        window: DayWindow,
    ) -> RepoResult<bool>;
}

/// Terminal rejections for one attempt.
#[derive(Debug)]
pub enum MarkError {
    ClassNotFound(ClassId),
    AlreadyMarked {
        student_id: UserId,
        class_id: ClassId,
        window: DayWindow,
    },
    /// Lookup failed in the storage collaborator.
    Repo(RepoError),
}

impl Display for MarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassNotFound(class_id) => write!(f, "class not found: {class_id}"),
            Self::AlreadyMarked { class_id, .. } => write!(
                f,
                "attendance already marked for class {class_id} today"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MarkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MarkError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Stateless decision procedure bound to a configuration.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceDecider {
    evaluator: GeofenceEvaluator,
    window_ms: i64,
}

impl Default for AttendanceDecider {
    fn default() -> Self {
        Self {
            evaluator: GeofenceEvaluator::default(),
            window_ms: UTC_DAY_MS,
        }
    }
}

impl AttendanceDecider {
    /// Builds a decider from a configuration, rejecting unusable values.
    pub fn new(config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            evaluator: GeofenceEvaluator::from_config(config),
            window_ms: config.duplicate_window_ms,
        })
    }

    /// Duplicate-check window for an instant.
    pub fn window_for(&self, instant_ms: i64) -> DayWindow {
        DayWindow::containing(instant_ms, self.window_ms)
    }

    /// Decides one attempt.
    ///
    /// # Errors
    /// - `ClassNotFound` when the class has no geofence.
    /// - `AlreadyMarked` when a record exists in the attempt's window,
    ///   regardless of the coordinates supplied now.
    /// - `Repo` when a lookup fails.
    pub fn attempt_mark(
        &self,
        attempt: &AttendanceAttempt,
        classes: &impl ClassLookup,
        history: &impl AttendanceHistory,
    ) -> Result<AttendanceOutcome, MarkError> {
        let geofence = classes
            .geofence_for(attempt.class_id)?
            .ok_or(MarkError::ClassNotFound(attempt.class_id))?;

        let window = self.window_for(attempt.attempt_time_ms);
        if history.has_record_in_window(attempt.student_id, attempt.class_id, window)? {
            return Err(MarkError::AlreadyMarked {
                student_id: attempt.student_id,
                class_id: attempt.class_id,
                window,
            });
        }

        let (within, distance_meters) = self.evaluator.evaluate(attempt.reported, &geofence);

        Ok(AttendanceOutcome {
            student_id: attempt.student_id,
            class_id: attempt.class_id,
            reported: attempt.reported,
            distance_meters,
            status: AttendanceStatus::from_inclusion(within),
        })
    }
}

/// Decides one attempt with the default configuration.
pub fn attempt_mark(
    attempt: &AttendanceAttempt,
    classes: &impl ClassLookup,
    history: &impl AttendanceHistory,
) -> Result<AttendanceOutcome, MarkError> {
    AttendanceDecider::default().attempt_mark(attempt, classes, history)
}

#[cfg(test)]
mod tests {
    use super::{attempt_mark, AttendanceHistory, ClassLookup, DayWindow, MarkError};
    use crate::config::UTC_DAY_MS;
    use crate::model::attendance::{AttendanceAttempt, AttendanceStatus};
    use crate::model::class::ClassId;
    use crate::model::coordinate::{Coordinate, GeofenceDefinition};
    use crate::model::user::UserId;
    use crate::repo::RepoResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    // 2026-10-17T00:00:00Z
    const DAY_START_MS: i64 = 1_792_195_200_000;

    #[derive(Default)]
    struct FakeClasses(HashMap<ClassId, GeofenceDefinition>);

    impl ClassLookup for FakeClasses {
        fn geofence_for(&self, class_id: ClassId) -> RepoResult<Option<GeofenceDefinition>> {
            Ok(self.0.get(&class_id).copied())
        }
    }

    #[derive(Default)]
    struct FakeHistory(RefCell<Vec<(UserId, ClassId, i64)>>);

    impl FakeHistory {
        fn record(&self, student_id: UserId, class_id: ClassId, marked_at: i64) {
            self.0.borrow_mut().push((student_id, class_id, marked_at));
        }
    }

    impl AttendanceHistory for FakeHistory {
        fn has_record_in_window(
            &self,
            student_id: UserId,
            class_id: ClassId,
            window: DayWindow,
        ) -> RepoResult<bool> {
            Ok(self.0.borrow().iter().any(|(s, c, at)| {
                *s == student_id && *c == class_id && window.contains(*at)
            }))
        }
    }

    fn lagos_classes() -> FakeClasses {
        let mut classes = FakeClasses::default();
        classes.0.insert(
            7,
            GeofenceDefinition::new(Coordinate::new(6.5244, 3.3792), 100.0),
        );
        classes
    }

    fn attempt(student_id: UserId, reported: Coordinate, at: i64) -> AttendanceAttempt {
        AttendanceAttempt {
            student_id,
            class_id: 7,
            reported,
            attempt_time_ms: at,
        }
    }

    #[test]
    fn window_is_utc_calendar_day() {
        let window = DayWindow::containing(DAY_START_MS + 13 * 3_600_000, UTC_DAY_MS);
        assert_eq!(window.start_ms, DAY_START_MS);
        assert_eq!(window.end_ms, DAY_START_MS + UTC_DAY_MS);
        assert!(window.contains(DAY_START_MS));
        assert!(!window.contains(DAY_START_MS + UTC_DAY_MS));
    }

    #[test]
    fn window_floors_pre_epoch_instants() {
        let window = DayWindow::containing(-1, UTC_DAY_MS);
        assert_eq!(window.start_ms, -UTC_DAY_MS);
        assert_eq!(window.end_ms, 0);
    }

    #[test]
    fn inside_fence_is_approved_and_outside_is_denied() {
        let classes = lagos_classes();
        let history = FakeHistory::default();

        let near = attempt_mark(
            &attempt(1, Coordinate::new(6.5245, 3.3793), DAY_START_MS),
            &classes,
            &history,
        )
        .expect("near attempt should decide");
        assert_eq!(near.status, AttendanceStatus::Approved);
        assert!(near.distance_meters < 100.0);

        let far = attempt_mark(
            &attempt(2, Coordinate::new(6.6, 3.3792), DAY_START_MS),
            &classes,
            &history,
        )
        .expect("far attempt should decide");
        assert_eq!(far.status, AttendanceStatus::Denied);
        assert!(far.distance_meters > 8_000.0);
        assert_eq!(far.reported, Coordinate::new(6.6, 3.3792));
        assert_eq!(far.student_id, 2);
        assert_eq!(far.class_id, 7);
    }

    #[test]
    fn unknown_class_is_not_found_even_without_history() {
        let err = attempt_mark(
            &AttendanceAttempt {
                student_id: 1,
                class_id: 404,
                reported: Coordinate::new(0.0, 0.0),
                attempt_time_ms: DAY_START_MS,
            },
            &lagos_classes(),
            &FakeHistory::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MarkError::ClassNotFound(404)));
    }

    #[test]
    fn second_attempt_same_day_is_already_marked_regardless_of_position() {
        let classes = lagos_classes();
        let history = FakeHistory::default();
        let first = attempt(1, Coordinate::new(6.6, 3.3792), DAY_START_MS + 1_000);
        attempt_mark(&first, &classes, &history).expect("first attempt decides");
        history.record(1, 7, first.attempt_time_ms);

        let err = attempt_mark(
            &attempt(1, Coordinate::new(6.5244, 3.3792), DAY_START_MS + UTC_DAY_MS - 1),
            &classes,
            &history,
        )
        .unwrap_err();
        assert!(matches!(err, MarkError::AlreadyMarked { student_id: 1, class_id: 7, .. }));
    }

    #[test]
    fn next_utc_day_is_a_fresh_window() {
        let classes = lagos_classes();
        let history = FakeHistory::default();
        history.record(1, 7, DAY_START_MS + UTC_DAY_MS - 1);

        attempt_mark(
            &attempt(1, Coordinate::new(6.5244, 3.3792), DAY_START_MS + UTC_DAY_MS),
            &classes,
            &history,
        )
        .expect("a new UTC day allows a new mark");
    }

    #[test]
    fn different_students_do_not_interfere() {
        let classes = lagos_classes();
        let history = FakeHistory::default();
        history.record(1, 7, DAY_START_MS);

        let other = attempt_mark(
            &attempt(2, Coordinate::new(6.5244, 3.3792), DAY_START_MS + 5),
            &classes,
            &history,
        )
        .expect("another student is independent");
        assert_eq!(other.status, AttendanceStatus::Approved);
    }

    #[test]
    fn window_saturates_at_the_end_of_time() {
        let window = DayWindow::containing(i64::MAX - 5, UTC_DAY_MS);
        assert!(window.start_ms <= i64::MAX - 5);
        assert_eq!(window.end_ms, i64::MAX);
        assert!(window.contains(i64::MAX - 5));
        assert!(window.contains(i64::MAX));

        let top = DayWindow::containing(i64::MAX, UTC_DAY_MS);
        assert_eq!(top, window);
    }

    #[test]
    fn window_saturates_at_the_start_of_time() {
        let window = DayWindow::containing(i64::MIN, UTC_DAY_MS);
        assert_eq!(window.start_ms, i64::MIN);
        assert!(window.contains(i64::MIN));
        assert!(window.end_ms > i64::MIN);
    }

    #[test]
    fn decider_rejects_zero_window() {
        let config = crate::config::CoreConfig {
            duplicate_window_ms: 0,
            ..crate::config::CoreConfig::default()
        };
        assert!(super::AttendanceDecider::new(&config).is_err());
    }

    #[test]
    fn decision_is_deterministic() {
        let classes = lagos_classes();
        let history = FakeHistory::default();
        let input = attempt(3, Coordinate::new(6.5249, 3.3801), DAY_START_MS);
        let first = attempt_mark(&input, &classes, &history).unwrap();
        let second = attempt_mark(&input, &classes, &history).unwrap();
        assert_eq!(first, second);
    }
}
