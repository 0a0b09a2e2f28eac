//! Class management use-cases.
//!
//! # Invariants
//! - Only lecturers create classes; the creator becomes the owner.
//! - Only the owning lecturer may delete a class.
//! - Class codes are unique; collisions return `CodeTaken`.
//! - A lecturer actor without a stored account gets `LecturerNotFound`.

use crate::access::{require_role, AccessDenied, Actor, RoleSet};
use crate::model::class::{Class, ClassId, ClassValidationError, NewClass};
use crate::model::user::UserId;
use crate::repo::class_repo::ClassRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ClassServiceError {
    Forbidden(AccessDenied),
    Invalid(ClassValidationError),
    CodeTaken(String),
    ClassNotFound(ClassId),
    CodeNotFound(String),
    /// Caller passed the role gate but has no stored account.
    LecturerNotFound(UserId),
    /// Caller is a lecturer but not the class owner.
    NotOwner {
        class_id: ClassId,
        user_id: UserId,
    },
    Repo(RepoError),
}

impl Display for ClassServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::CodeTaken(code) => write!(f, "class code already exists: {code}"),
            Self::ClassNotFound(id) => write!(f, "class not found: {id}"),
            Self::CodeNotFound(code) => write!(f, "class not found for code: {code}"),
            Self::LecturerNotFound(id) => write!(f, "lecturer not found: {id}"),
            Self::NotOwner { class_id, user_id } => write!(
                f,
                "user {user_id} can only delete their own classes; class {class_id} is not theirs"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClassServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ClassServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AccessDenied> for ClassServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

/// Class use-case service over a repository implementation.
pub struct ClassService<R: ClassRepository> {
    repo: R,
}

impl<R: ClassRepository> ClassService<R> {
    /// Creates a service over the given class repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a class owned by the calling lecturer.
    pub fn create(&self, actor: &Actor, input: &NewClass) -> Result<Class, ClassServiceError> {
        require_role(actor, &RoleSet::LECTURER_ONLY)?;
        let class = input.normalized();
        class.validate().map_err(ClassServiceError::Invalid)?;

        if self.repo.get_class_by_code(&class.code)?.is_some() {
            return Err(ClassServiceError::CodeTaken(class.code));
        }

        let created = match self.repo.create_class(&class, actor.user_id) {
            Ok(created) => created,
            Err(RepoError::Conflict { .. }) => {
                return Err(ClassServiceError::CodeTaken(class.code));
            }
            Err(RepoError::MissingReference { .. }) => {
                return Err(ClassServiceError::LecturerNotFound(actor.user_id));
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            "event=class_create module=service status=ok class_id={} lecturer_id={} radius_m={}",
            created.id, created.lecturer_id, created.geofence.radius_meters
        );
        Ok(created)
    }

    /// Lists every class, ordered by id. Any signed-in role.
    pub fn list(&self, actor: &Actor) -> Result<Vec<Class>, ClassServiceError> {
        require_role(actor, &RoleSet::ANY_USER)?;
        Ok(self.repo.list_classes()?)
    }

    /// Loads one class by id. Any signed-in role.
    pub fn get(&self, actor: &Actor, id: ClassId) -> Result<Class, ClassServiceError> {
        require_role(actor, &RoleSet::ANY_USER)?;
        self.repo
            .get_class(id)?
            .ok_or(ClassServiceError::ClassNotFound(id))
    }

    /// Loads one class by its code, ignoring surrounding whitespace.
    pub fn get_by_code(&self, actor: &Actor, code: &str) -> Result<Class, ClassServiceError> {
        require_role(actor, &RoleSet::ANY_USER)?;
        let code = code.trim();
        self.repo
            .get_class_by_code(code)?
            .ok_or_else(|| ClassServiceError::CodeNotFound(code.to_string()))
    }

    /// Deletes a class and, through the schema cascade, its attendance rows.
    pub fn delete(&self, actor: &Actor, id: ClassId) -> Result<(), ClassServiceError> {
        require_role(actor, &RoleSet::LECTURER_ONLY)?;
        let class = self
            .repo
            .get_class(id)?
            .ok_or(ClassServiceError::ClassNotFound(id))?;
        if class.lecturer_id != actor.user_id {
            return Err(ClassServiceError::NotOwner {
                class_id: id,
                user_id: actor.user_id,
            });
        }

        match self.repo.delete_class(id) {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => return Err(ClassServiceError::ClassNotFound(id)),
            Err(other) => return Err(other.into()),
        }
        info!(
            "event=class_delete module=service status=ok class_id={} lecturer_id={}",
            id, actor.user_id
        );
        Ok(())
    }
}
