//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access traits for users, classes and
//!   attendance.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Uniqueness violations surface as `RepoError::Conflict` and dangling
//!   foreign keys as `RepoError::MissingReference`, never as raw SQLite
//!   errors.
//! - Read paths reject malformed persisted values with `InvalidData` instead
//!   of masking them.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attendance_repo;
pub mod class_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure shared by every table.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Row addressed by the given entity/key does not exist.
    NotFound { entity: &'static str, key: String },
    /// Insert collided with a uniqueness constraint.
    Conflict { entity: &'static str, details: String },
    /// Insert referenced a parent row that does not exist.
    MissingReference { entity: &'static str, details: String },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Maps unique and foreign-key failures to `Conflict` and
    /// `MissingReference`, passing others through.
    pub(crate) fn from_write(entity: &'static str, err: rusqlite::Error) -> Self {
        let db_err = DbError::from(err);
        if db_err.is_unique_violation() {
            return Self::Conflict {
                entity,
                details: db_err.to_string(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return Self::MissingReference {
                entity,
                details: db_err.to_string(),
            };
        }
        Self::Db(db_err)
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict { entity, details } => write!(f, "{entity} conflict: {details}"),
            Self::MissingReference { entity, details } => {
                write!(f, "{entity} references a missing row: {details}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
