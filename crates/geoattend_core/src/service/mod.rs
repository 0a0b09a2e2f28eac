//! Core use-case services.
//!
//! # Responsibility
//! - Apply the role gate once per call, then orchestrate repositories.
//! - Translate repository failures into use-case errors callers can map to
//!   client-facing rejections.

pub mod attendance_service;
pub mod class_service;
pub mod user_service;
