//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Emails are compared case-insensitively (`COLLATE NOCASE` column).
//! - Duplicate username/email inserts return `RepoError::Conflict`.

use crate::model::user::{NewUser, User, UserId, UserRole};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    username,
    password_hash,
    full_name,
    role,
    created_at
FROM users";

/// Data access for user accounts.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Borrows an already migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, filter: &str, key: &dyn rusqlite::ToSql) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let row = stmt
            .query_row(params![key], |row| Ok(parse_user_row(row)))
            .optional()?;
        row.transpose()
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (email, username, password_hash, full_name, role)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.email.as_str(),
                    user.username.as_str(),
                    user.password_hash.as_str(),
                    user.full_name.as_str(),
                    user.role.as_str(),
                ],
            )
            .map_err(|err| RepoError::from_write("user", err))?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user {id} missing after insert read-back"))
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one("id", &id)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.find_one("username", &username)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email", &email)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        username: row.get("username")?,
        full_name: row.get("full_name")?,
        role,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
