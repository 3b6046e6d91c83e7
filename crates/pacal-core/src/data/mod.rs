//! Data models for positions and print profiles
//!
//! This module provides:
//! - Cartesian tool position
//! - Filament profiles (diameter, flow, temperatures, fan)
//! - Printer profiles (bed geometry, retraction, speeds, layer heights)
//! - The built-in profile catalog

pub mod catalog;
pub mod filament;
pub mod printer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProfileError;

/// Profile names become output directory and file names, so they must be a
/// single plain path component.
pub(crate) fn validate_profile_name(name: &str) -> Result<(), ProfileError> {
    if name.trim().is_empty() {
        return Err(ProfileError::invalid("<unnamed>", "name", "must not be empty"));
    }
    if name.contains(['/', '\\']) || name.contains("..") || name == "." {
        return Err(ProfileError::invalid(
            name,
            "name",
            "must not contain path separators or '..'",
        ));
    }
    Ok(())
}

/// Tool position in machine coordinates (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2) + (other.z - self.z).powi(2))
            .sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{:.3} Y{:.3} Z{:.3}", self.x, self.y, self.z)
    }
}
