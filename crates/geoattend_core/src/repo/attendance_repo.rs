//! Attendance repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist decided attendance outcomes.
//! - Answer same-window existence checks for the decision procedure.
//! - Serve newest-first list views joined with student/class names.
//!
//! # Invariants
//! - At most one row per `(student_id, class_id, window_start)`; a second
//!   insert returns `RepoError::Conflict`.
//! - `window_start` is written by the caller from the same window policy the
//!   decision procedure used.

use crate::decision::{AttendanceHistory, DayWindow};
use crate::model::attendance::{
    AttendanceDetails, AttendanceOutcome, AttendanceRecord, AttendanceStatus,
};
use crate::model::class::ClassId;
use crate::model::coordinate::Coordinate;
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const DETAILS_SELECT_SQL: &str = "SELECT
    a.id,
    a.student_id,
    a.class_id,
    a.latitude,
    a.longitude,
    a.distance_meters,
    a.status,
    a.marked_at,
    u.full_name AS student_name,
    c.name AS class_name,
    c.code AS class_code
FROM attendance a
INNER JOIN users u ON u.id = a.student_id
INNER JOIN classes c ON c.id = a.class_id";

/// Data access for attendance rows.
pub trait AttendanceRepository: AttendanceHistory {
    /// Inserts one record inside its duplicate window.
    fn insert_record(&self, record: &AttendanceRecord, window: DayWindow) -> RepoResult<()>;
    fn list_for_student(&self, student_id: UserId) -> RepoResult<Vec<AttendanceDetails>>;
    fn list_for_class(&self, class_id: ClassId) -> RepoResult<Vec<AttendanceDetails>>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Borrows an already migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn list_where(&self, column: &str, key: i64) -> RepoResult<Vec<AttendanceDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DETAILS_SELECT_SQL}
             WHERE a.{column} = ?1
             ORDER BY a.marked_at DESC, a.id ASC;"
        ))?;
        let mut rows = stmt.query([key])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_details_row(row)?);
        }
        Ok(items)
    }
}

impl AttendanceHistory for SqliteAttendanceRepository<'_> {
    fn has_record_in_window(
        &self,
        student_id: UserId,
        class_id: ClassId,
        window: DayWindow,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM attendance
                WHERE student_id = ?1
                  AND class_id = ?2
                  AND marked_at BETWEEN ?3 AND ?4
            );",
            params![student_id, class_id, window.start_ms, window.last_ms()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn insert_record(&self, record: &AttendanceRecord, window: DayWindow) -> RepoResult<()> {
        if !window.contains(record.marked_at) {
            return Err(RepoError::InvalidData(format!(
                "marked_at {} outside window [{}, {})",
                record.marked_at, window.start_ms, window.end_ms
            )));
        }

        let outcome = &record.outcome;
        self.conn
            .execute(
                "INSERT INTO attendance (
                    id,
                    student_id,
                    class_id,
                    latitude,
                    longitude,
                    distance_meters,
                    status,
                    marked_at,
                    window_start
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    record.id.to_string(),
                    outcome.student_id,
                    outcome.class_id,
                    outcome.reported.latitude,
                    outcome.reported.longitude,
                    outcome.distance_meters,
                    outcome.status.as_str(),
                    record.marked_at,
                    window.start_ms,
                ],
            )
            .map_err(|err| RepoError::from_write("attendance", err))?;
        Ok(())
    }

    fn list_for_student(&self, student_id: UserId) -> RepoResult<Vec<AttendanceDetails>> {
        self.list_where("student_id", student_id)
    }

    fn list_for_class(&self, class_id: ClassId) -> RepoResult<Vec<AttendanceDetails>> {
        self.list_where("class_id", class_id)
    }
}

fn parse_details_row(row: &Row<'_>) -> RepoResult<AttendanceDetails> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in attendance.id"))
    })?;

    let status_text: String = row.get("status")?;
    let status = AttendanceStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in attendance.status"
        ))
    })?;

    Ok(AttendanceDetails {
        record: AttendanceRecord {
            id,
            outcome: AttendanceOutcome {
                student_id: row.get("student_id")?,
                class_id: row.get("class_id")?,
                reported: Coordinate::new(row.get("latitude")?, row.get("longitude")?),
                distance_meters: row.get("distance_meters")?,
                status,
            },
            marked_at: row.get("marked_at")?,
        },
        student_name: row.get("student_name")?,
        class_name: row.get("class_name")?,
        class_code: row.get("class_code")?,
    })
}
