//! Role-set authorization gate for service entry points.
//!
//! # Responsibility
//! - Represent the authenticated caller (`Actor`) handed in by the token layer.
//! - Check the caller's role against the role set an operation requires.
//!
//! # Invariants
//! - Each service call evaluates the gate once, before touching storage.
//! - The attendance decision procedure never sees roles.

use crate::model::user::{User, UserId, UserRole};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    /// Wraps an authenticated caller.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Set of roles allowed to run an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    name: &'static str,
    roles: &'static [UserRole],
}

impl RoleSet {
    pub const STUDENT_ONLY: Self = Self::new("student", &[UserRole::Student]);
    pub const LECTURER_ONLY: Self = Self::new("lecturer", &[UserRole::Lecturer]);
    pub const STAFF: Self = Self::new("lecturer or admin", &[UserRole::Lecturer, UserRole::Admin]);
    pub const ANY_USER: Self = Self::new(
        "any user",
        &[UserRole::Student, UserRole::Lecturer, UserRole::Admin],
    );

    /// Names a role set for denial messages and logs.
    pub const fn new(name: &'static str, roles: &'static [UserRole]) -> Self {
        Self { name, roles }
    }

    /// Label used in denial messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `role` belongs to the set.
    pub fn allows(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Returned when the caller's role is outside the required set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub user_id: UserId,
    pub role: UserRole,
    pub required: &'static str,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "this action requires {} privileges; user {} has role `{}`",
            self.required,
            self.user_id,
            self.role.as_str()
        )
    }
}

impl Error for AccessDenied {}

/// Checks `actor` against `required`.
pub fn require_role(actor: &Actor, required: &RoleSet) -> Result<(), AccessDenied> {
    if required.allows(actor.role) {
        return Ok(());
    }
    warn!(
        "event=access_denied module=access status=rejected user_id={} role={} required={}",
        actor.user_id,
        actor.role.as_str(),
        required.name()
    );
    Err(AccessDenied {
        user_id: actor.user_id,
        role: actor.role,
        required: required.name(),
    })
}
