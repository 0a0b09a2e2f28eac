//! User registration and profile use-cases.
//!
//! # Invariants
//! - Registration input is normalized (trimmed, lowercase email) before any
//!   lookup or write.
//! - Username collisions are reported before email collisions.
//! - The password hash is stored as received; hashing happens upstream.

use crate::access::{require_role, AccessDenied, Actor, RoleSet};
use crate::model::user::{NewUser, User, UserId, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum UserServiceError {
    Forbidden(AccessDenied),
    Invalid(UserValidationError),
    UsernameTaken(String),
    EmailTaken(String),
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::UsernameTaken(value) => write!(f, "username already registered: {value}"),
            Self::EmailTaken(value) => write!(f, "email already registered: {value}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AccessDenied> for UserServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

/// User use-case service over a repository implementation.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service over the given user repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// - `Invalid` for malformed email/username/full name or empty hash.
    /// - `UsernameTaken` / `EmailTaken` on collisions, including collisions
    ///   detected by the storage constraint after the pre-check.
    pub fn register(&self, input: &NewUser) -> Result<User, UserServiceError> {
        let user = input.normalized();
        user.validate().map_err(UserServiceError::Invalid)?;

        if self.repo.find_by_username(&user.username)?.is_some() {
            return Err(UserServiceError::UsernameTaken(user.username));
        }
        if self.repo.find_by_email(&user.email)?.is_some() {
            return Err(UserServiceError::EmailTaken(user.email));
        }

        let created = match self.repo.create_user(&user) {
            Ok(created) => created,
            Err(RepoError::Conflict { .. }) => return Err(self.classify_conflict(user)?),
            Err(other) => return Err(other.into()),
        };

        info!(
            "event=user_register module=service status=ok user_id={} role={}",
            created.id,
            created.role.as_str()
        );
        Ok(created)
    }

    /// Returns the account behind the authenticated actor.
    pub fn current_user(&self, actor: &Actor) -> Result<User, UserServiceError> {
        require_role(actor, &RoleSet::ANY_USER)?;
        self.repo
            .get_user(actor.user_id)?
            .ok_or(UserServiceError::UserNotFound(actor.user_id))
    }

    fn classify_conflict(&self, user: NewUser) -> Result<UserServiceError, UserServiceError> {
        if self.repo.find_by_username(&user.username)?.is_some() {
            return Ok(UserServiceError::UsernameTaken(user.username));
        }
        Ok(UserServiceError::EmailTaken(user.email))
    }
}
