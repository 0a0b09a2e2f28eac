//! Domain model for users, classes and attendance.
//!
//! # Responsibility
//! - Define canonical data structures shared by repositories and services.
//! - Keep input validation next to the types it protects.
//!
//! # Invariants
//! - Model types carry no storage handles and perform no I/O.

pub mod attendance;
pub mod class;
pub mod coordinate;
pub mod user;
