//! Printer profile definitions.

use serde::{Deserialize, Serialize};

use super::validate_profile_name;
use crate::error::ProfileError;

/// Extrusion width as a multiple of the nozzle diameter
pub const EXTRUSION_WIDTH_FACTOR: f64 = 1.125;

/// Build volume geometry
///
/// Selects the coordinate frame: delta printers put the origin in the
/// middle of the bed, cartesian printers in a corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BedGeometry {
    /// Rectangular bed with the origin at a corner.
    Cartesian {
        /// Build volume X (mm).
        size_x: f64,
        /// Build volume Y (mm).
        size_y: f64,
        /// Build volume Z (mm).
        size_z: f64,
    },
    /// Round bed with the origin at the center.
    Delta {
        /// Print radius (mm).
        radius: f64,
        /// Build volume Z (mm).
        size_z: f64,
    },
}

impl BedGeometry {
    /// Center of the print area in machine coordinates.
    pub fn center(&self) -> (f64, f64) {
        match *self {
            BedGeometry::Cartesian { size_x, size_y, .. } => (size_x / 2.0, size_y / 2.0),
            BedGeometry::Delta { .. } => (0.0, 0.0),
        }
    }

    /// Is this a delta (center origin) printer?
    pub fn is_delta(&self) -> bool {
        matches!(self, BedGeometry::Delta { .. })
    }
}

/// Printer profile with machine-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Profile name.
    pub name: String,
    /// Build volume geometry.
    pub geometry: BedGeometry,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
    /// Retraction distance (mm).
    pub retract_distance: f64,
    /// Retraction speed (mm/s).
    pub retract_speed: f64,
    /// Extra filament pushed on de-retraction (mm).
    pub retract_extra_restart: f64,
    /// Z lift during retraction (mm).
    pub retract_lift: f64,
    /// Travel speed (mm/s).
    pub travel_speed: f64,
    /// First layer print speed (mm/s).
    pub layer0_speed: f64,
    /// Speed on the fast part of the calibration (mm/s).
    pub fast_speed: f64,
    /// Speed on the slow part of the calibration (mm/s).
    pub slow_speed: f64,
    /// Layer height (mm).
    pub layer_height: f64,
    /// First layer height (mm).
    pub layer0_height: f64,
    /// Pressure advance at the bottom of the calibration (s).
    pub pa_min: f64,
    /// Pressure advance at the top of the calibration (s).
    pub pa_max: f64,
}

impl PrinterProfile {
    /// HEvo, 290x290 cartesian with a 0.8 mm nozzle.
    pub fn hevo() -> Self {
        Self {
            name: "HEvo".into(),
            geometry: BedGeometry::Cartesian {
                size_x: 290.0,
                size_y: 290.0,
                size_z: 400.0,
            },
            nozzle_diameter: 0.8,
            retract_distance: 1.0,
            retract_speed: 30.0,
            retract_extra_restart: 0.2,
            retract_lift: 0.2,
            travel_speed: 200.0,
            layer0_speed: 25.0,
            fast_speed: 70.0,
            slow_speed: 15.0,
            layer_height: 0.4,
            layer0_height: 0.25,
            pa_min: 0.0,
            pa_max: 0.1,
        }
    }

    /// P3Steel, 180x180 cartesian with a 0.4 mm nozzle.
    pub fn p3steel() -> Self {
        Self {
            name: "P3Steel".into(),
            geometry: BedGeometry::Cartesian {
                size_x: 180.0,
                size_y: 180.0,
                size_z: 180.0,
            },
            nozzle_diameter: 0.4,
            retract_distance: 0.8,
            retract_speed: 40.0,
            retract_extra_restart: 0.1,
            retract_lift: 0.2,
            travel_speed: 150.0,
            layer0_speed: 25.0,
            fast_speed: 70.0,
            slow_speed: 15.0,
            layer_height: 0.2,
            layer0_height: 0.25,
            pa_min: 0.0,
            pa_max: 0.1,
        }
    }

    /// Center of the print area.
    pub fn center(&self) -> (f64, f64) {
        self.geometry.center()
    }

    /// Effective deposited bead width (mm).
    pub fn extrusion_width(&self) -> f64 {
        self.nozzle_diameter * EXTRUSION_WIDTH_FACTOR
    }

    /// Check that the profile describes a printable machine.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |field: &str, reason: &str| ProfileError::invalid(&self.name, field, reason);

        validate_profile_name(&self.name)?;

        match self.geometry {
            BedGeometry::Cartesian {
                size_x,
                size_y,
                size_z,
            } => {
                for (field, value) in [("size_x", size_x), ("size_y", size_y), ("size_z", size_z)] {
                    if !is_positive(value) {
                        return Err(invalid(field, "must be > 0"));
                    }
                }
            }
            BedGeometry::Delta { radius, size_z } => {
                for (field, value) in [("radius", radius), ("size_z", size_z)] {
                    if !is_positive(value) {
                        return Err(invalid(field, "must be > 0"));
                    }
                }
            }
        }

        let positive = [
            ("nozzle_diameter", self.nozzle_diameter),
            ("retract_speed", self.retract_speed),
            ("travel_speed", self.travel_speed),
            ("layer0_speed", self.layer0_speed),
            ("fast_speed", self.fast_speed),
            ("slow_speed", self.slow_speed),
            ("layer_height", self.layer_height),
            ("layer0_height", self.layer0_height),
        ];
        for (field, value) in positive {
            if !is_positive(value) {
                return Err(invalid(field, "must be > 0"));
            }
        }

        let non_negative = [
            ("retract_distance", self.retract_distance),
            ("retract_extra_restart", self.retract_extra_restart),
            ("retract_lift", self.retract_lift),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be >= 0"));
            }
        }

        if !self.pa_min.is_finite() || !self.pa_max.is_finite() || self.pa_min > self.pa_max {
            return Err(invalid("pa_min", "pressure advance range must satisfy pa_min <= pa_max"));
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_valid() {
        assert!(PrinterProfile::hevo().validate().is_ok());
        assert!(PrinterProfile::p3steel().validate().is_ok());
    }

    #[test]
    fn test_extrusion_width() {
        assert_eq!(PrinterProfile::hevo().extrusion_width(), 0.9);
        assert_eq!(PrinterProfile::p3steel().extrusion_width(), 0.45);
    }

    #[test]
    fn test_inverted_pa_range_rejected() {
        let mut printer = PrinterProfile::p3steel();
        printer.pa_min = 0.2;
        printer.pa_max = 0.1;
        assert!(printer.validate().is_err());
    }
}
