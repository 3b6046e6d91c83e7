//! Filament profiles
//!
//! A filament profile carries the material properties the generator needs:
//! diameter and flow multiplier for the extrusion math, density for the
//! usage summary, and the temperature/fan settings for first and following
//! layers.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::validate_profile_name;
use crate::error::ProfileError;

/// Filament material properties
///
/// The extrusion multiplier is given as a percentage on construction and
/// stored as a ratio. The serialized form keeps the percentage so
/// configuration files read the way operators think about flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FilamentRecord", into = "FilamentRecord")]
pub struct FilamentProfile {
    name: String,
    diameter: f64,
    extrusion_multiplier: f64,
    density: f64,
    bed_temp: u32,
    bed_layer0_temp: u32,
    hotend_temp: u32,
    hotend_layer0_temp: u32,
    fan_speed: f64,
    fan_layer0_speed: f64,
}

/// On-disk representation of a [`FilamentProfile`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FilamentRecord {
    name: String,
    /// Filament diameter (mm)
    diameter: f64,
    /// Extrusion factor (%)
    extrusion_factor: f64,
    /// Density (g/cm³)
    density: f64,
    bed_temp: u32,
    bed_layer0_temp: u32,
    hotend_temp: u32,
    hotend_layer0_temp: u32,
    /// Fan speed (%)
    fan_speed: f64,
    /// First layer fan speed (%)
    fan_layer0_speed: f64,
}

impl From<FilamentRecord> for FilamentProfile {
    fn from(r: FilamentRecord) -> Self {
        Self::new(
            r.name,
            r.diameter,
            r.extrusion_factor,
            r.density,
            r.bed_temp,
            r.bed_layer0_temp,
            r.hotend_temp,
            r.hotend_layer0_temp,
            r.fan_speed,
            r.fan_layer0_speed,
        )
    }
}

impl From<FilamentProfile> for FilamentRecord {
    fn from(p: FilamentProfile) -> Self {
        Self {
            extrusion_factor: p.extrusion_factor_percent(),
            name: p.name,
            diameter: p.diameter,
            density: p.density,
            bed_temp: p.bed_temp,
            bed_layer0_temp: p.bed_layer0_temp,
            hotend_temp: p.hotend_temp,
            hotend_layer0_temp: p.hotend_layer0_temp,
            fan_speed: p.fan_speed,
            fan_layer0_speed: p.fan_layer0_speed,
        }
    }
}

impl FilamentProfile {
    /// Create a filament profile
    ///
    /// # Arguments
    /// * `extrusion_factor_percent` - Flow multiplier in percent (100 = nominal)
    /// * `density` - Material density (g/cm³)
    /// * `fan_speed`, `fan_layer0_speed` - Part cooling fan (%)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        diameter: f64,
        extrusion_factor_percent: f64,
        density: f64,
        bed_temp: u32,
        bed_layer0_temp: u32,
        hotend_temp: u32,
        hotend_layer0_temp: u32,
        fan_speed: f64,
        fan_layer0_speed: f64,
    ) -> Self {
        Self {
            name: name.into(),
            diameter,
            extrusion_multiplier: extrusion_factor_percent / 100.0,
            density,
            bed_temp,
            bed_layer0_temp,
            hotend_temp,
            hotend_layer0_temp,
            fan_speed,
            fan_layer0_speed,
        }
    }

    /// Generic 1.75 mm PLA
    pub fn pla() -> Self {
        Self::new("PLA", 1.75, 100.0, 1.27, 60, 70, 205, 215, 100.0, 0.0)
    }

    /// Generic 1.75 mm PETG
    pub fn petg() -> Self {
        Self::new("PETG", 1.75, 97.0, 1.27, 90, 70, 260, 245, 50.0, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filament diameter (mm)
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Flow multiplier as a ratio (1.0 = nominal)
    pub fn extrusion_multiplier(&self) -> f64 {
        self.extrusion_multiplier
    }

    /// Flow multiplier as a percentage
    pub fn extrusion_factor_percent(&self) -> f64 {
        self.extrusion_multiplier * 100.0
    }

    /// Density (g/cm³)
    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn bed_temp(&self) -> u32 {
        self.bed_temp
    }

    pub fn bed_layer0_temp(&self) -> u32 {
        self.bed_layer0_temp
    }

    pub fn hotend_temp(&self) -> u32 {
        self.hotend_temp
    }

    pub fn hotend_layer0_temp(&self) -> u32 {
        self.hotend_layer0_temp
    }

    /// Fan speed for following layers (%)
    pub fn fan_speed(&self) -> f64 {
        self.fan_speed
    }

    /// Fan speed for the first layer (%)
    pub fn fan_layer0_speed(&self) -> f64 {
        self.fan_layer0_speed
    }

    /// Filament cross-section area (mm²)
    pub fn cross_section_area(&self) -> f64 {
        PI * (self.diameter / 2.0).powi(2)
    }

    /// Check that the profile can be used for extrusion math
    pub fn validate(&self) -> Result<(), ProfileError> {
        validate_profile_name(&self.name)?;
        if !is_positive(self.diameter) {
            return Err(ProfileError::invalid(&self.name, "diameter", "must be > 0"));
        }
        if !is_positive(self.extrusion_multiplier) {
            return Err(ProfileError::invalid(
                &self.name,
                "extrusion_factor",
                "must be > 0",
            ));
        }
        if self.density.is_nan() || self.density < 0.0 {
            return Err(ProfileError::invalid(&self.name, "density", "must be >= 0"));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
