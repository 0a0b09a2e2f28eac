//! Class repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist classes with their immutable geofence.
//! - Serve geofence lookups to the attendance decision procedure.
//!
//! # Invariants
//! - No update path exists for a class geofence.
//! - Deleting a class cascades to its attendance rows (schema-level).

use crate::decision::ClassLookup;
use crate::model::class::{Class, ClassId, NewClass};
use crate::model::coordinate::{Coordinate, GeofenceDefinition};
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CLASS_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    description,
    latitude,
    longitude,
    radius_meters,
    lecturer_id,
    created_at
FROM classes";

/// Data access for classes.
pub trait ClassRepository {
    fn create_class(&self, class: &NewClass, lecturer_id: UserId) -> RepoResult<Class>;
    fn get_class(&self, id: ClassId) -> RepoResult<Option<Class>>;
    fn get_class_by_code(&self, code: &str) -> RepoResult<Option<Class>>;
    /// Lists all classes ordered by id.
    fn list_classes(&self) -> RepoResult<Vec<Class>>;
    fn delete_class(&self, id: ClassId) -> RepoResult<()>;
}

/// SQLite-backed class repository.
pub struct SqliteClassRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassRepository<'conn> {
    /// Borrows an already migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ClassRepository for SqliteClassRepository<'_> {
    fn create_class(&self, class: &NewClass, lecturer_id: UserId) -> RepoResult<Class> {
        let center = class.geofence.center;
        self.conn
            .execute(
                "INSERT INTO classes (
                    name,
                    code,
                    description,
                    latitude,
                    longitude,
                    radius_meters,
                    lecturer_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    class.name.as_str(),
                    class.code.as_str(),
                    class.description.as_deref(),
                    center.latitude,
                    center.longitude,
                    class.geofence.radius_meters,
                    lecturer_id,
                ],
            )
            .map_err(|err| RepoError::from_write("class", err))?;

        let id = self.conn.last_insert_rowid();
        self.get_class(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("class {id} missing after insert read-back"))
        })
    }

    fn get_class(&self, id: ClassId) -> RepoResult<Option<Class>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_SELECT_SQL} WHERE id = ?1;"))?;
        stmt.query_row([id], |row| Ok(parse_class_row(row)))
            .optional()?
            .transpose()
    }

    fn get_class_by_code(&self, code: &str) -> RepoResult<Option<Class>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_SELECT_SQL} WHERE code = ?1;"))?;
        stmt.query_row([code], |row| Ok(parse_class_row(row)))
            .optional()?
            .transpose()
    }

    fn list_classes(&self) -> RepoResult<Vec<Class>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut classes = Vec::new();
        while let Some(row) = rows.next()? {
            classes.push(parse_class_row(row)?);
        }
        Ok(classes)
    }

    fn delete_class(&self, id: ClassId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM classes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("class", id));
        }
        Ok(())
    }
}

impl ClassLookup for SqliteClassRepository<'_> {
    fn geofence_for(&self, class_id: ClassId) -> RepoResult<Option<GeofenceDefinition>> {
        let geofence = self
            .conn
            .query_row(
                "SELECT latitude, longitude, radius_meters FROM classes WHERE id = ?1;",
                [class_id],
                |row| {
                    Ok(GeofenceDefinition::new(
                        Coordinate::new(row.get(0)?, row.get(1)?),
                        row.get(2)?,
                    ))
                },
            )
            .optional()?;
        Ok(geofence)
    }
}

fn parse_class_row(row: &Row<'_>) -> RepoResult<Class> {
    let geofence = GeofenceDefinition::new(
        Coordinate::new(row.get("latitude")?, row.get("longitude")?),
        row.get("radius_meters")?,
    );
    geofence.validate().map_err(|err| {
        RepoError::InvalidData(format!("classes row has invalid geofence: {err}"))
    })?;

    Ok(Class {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        description: row.get("description")?,
        geofence,
        lecturer_id: row.get("lecturer_id")?,
        created_at: row.get("created_at")?,
    })
}
