//! User account model.
//!
//! # Responsibility
//! - Define registered users and their role.
//! - Validate registration input shape before persistence.
//!
//! # Invariants
//! - `username` and `email` are unique across users (enforced by storage).
//! - `password_hash` is an opaque credential produced outside the core and is
//!   never serialized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,64}$").expect("valid username regex"));

/// Storage-assigned user identifier.
pub type UserId = i64;

/// Account role used by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Lecturer,
    Admin,
}

impl UserRole {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
            Self::Admin => "admin",
        }
    }

    /// Inverse of [`UserRole::as_str`]; unknown text yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "lecturer" => Some(Self::Lecturer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip)]
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub password_hash: String,
}

impl NewUser {
    /// Returns a copy with surrounding whitespace trimmed and email lowercased.
    pub fn normalized(&self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            username: self.username.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            role: self.role,
            password_hash: self.password_hash.clone(),
        }
    }

    /// Checks email, username, full name and hash of a normalized input.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        if !USERNAME_RE.is_match(&self.username) {
            return Err(UserValidationError::InvalidUsername(self.username.clone()));
        }
        if self.full_name.trim().is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if self.password_hash.is_empty() {
            return Err(UserValidationError::EmptyCredential);
        }
        Ok(())
    }
}

/// Registration shape errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidEmail(String),
    InvalidUsername(String),
    EmptyFullName,
    EmptyCredential,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; expected 3-64 chars of [A-Za-z0-9_.-]"
            ),
            Self::EmptyFullName => write!(f, "full name must not be blank"),
            Self::EmptyCredential => write!(f, "password hash must not be empty"),
        }
    }
}

impl Error for UserValidationError {}
