//! Explicit runtime configuration for core components.
//!
//! # Responsibility
//! - Carry the Earth-radius constant and the duplicate-mark window policy.
//! - Carry logging bootstrap settings for hosts that embed the core.
//!
//! # Invariants
//! - Components receive configuration at construction; nothing reads
//!   process-wide globals or environment variables.
//! - A validated `CoreConfig` has a positive finite Earth radius and a
//!   positive window length.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mean Earth radius in meters used by the haversine evaluator.
pub const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// One UTC calendar day in milliseconds.
pub const UTC_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Core decision configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Sphere radius for great-circle distance, in meters.
    pub earth_radius_meters: f64,
    /// Length of the duplicate-mark window in milliseconds.
    ///
    /// Windows are aligned to the Unix epoch, so the default of one day is
    /// exactly the UTC calendar day.
    pub duplicate_window_ms: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            earth_radius_meters: MEAN_EARTH_RADIUS_METERS,
            duplicate_window_ms: UTC_DAY_MS,
        }
    }
}

impl CoreConfig {
    /// Checks that the configured values can drive the evaluator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.earth_radius_meters.is_finite() || self.earth_radius_meters <= 0.0 {
            return Err(ConfigError::InvalidEarthRadius(self.earth_radius_meters));
        }
        if self.duplicate_window_ms <= 0 {
            return Err(ConfigError::InvalidDuplicateWindow(self.duplicate_window_ms));
        }
        Ok(())
    }
}

/// Logging bootstrap settings passed to [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: String,
}

impl LoggingConfig {
    /// Builds a logging config from a level name and absolute directory.
    pub fn new(level: impl Into<String>, log_dir: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidEarthRadius(f64),
    InvalidDuplicateWindow(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEarthRadius(value) => {
                write!(f, "earth radius must be a positive finite number, got {value}")
            }
            Self::InvalidDuplicateWindow(value) => {
                write!(f, "duplicate window must be positive milliseconds, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}
