//! Pressure advance calibration cylinder
//!
//! Generates a hollow, single-wall cylinder printed in spiral vase mode.
//! The pressure advance setting ramps linearly with height across the main
//! body. Every layer has two short slow arcs, so a wrong pressure advance
//! shows up as a bulge or a gap where the speed changes. The cylinder is
//! capped by two indicator layers printed at the midpoint pressure advance
//! with a retraction gap at each slow arc.

use chrono::{DateTime, Local};
use pacal_core::{FilamentProfile, PrinterProfile};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI, TAU};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::angles::AngleSteps;
use crate::error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
use crate::gcode_writer::GcodeWriter;

/// Number of indicator layers printed on top of the ramp
const INDICATOR_LAYERS: u32 = 2;

/// Z height of the initial travel move to the brim (mm)
const START_TRAVEL_Z: f64 = 5.0;

/// Z clearance added after the final retraction (mm)
const END_LIFT: f64 = 5.0;

/// Upper bound on circle segments
const MAX_SEGMENTS: u32 = 65_536;

/// Geometry of the calibration cylinder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderParameters {
    /// Cylinder radius (mm)
    pub radius: f64,
    /// Number of straight segments approximating the circle
    pub segments: u32,
    /// Number of layers in the pressure advance ramp
    pub layers: u32,
    /// Number of brim rings on the first layer
    pub brims: u32,
}

impl Default for CylinderParameters {
    fn default() -> Self {
        Self {
            radius: 25.0,
            segments: 128,
            layers: 50,
            brims: 5,
        }
    }
}

impl CylinderParameters {
    /// Check that the cylinder can be generated
    pub fn validate(&self) -> ParameterResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "radius must be > 0, got {}",
                self.radius
            )));
        }
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            return Err(ParameterError::OutOfRange {
                name: "segments".to_string(),
                value: self.segments as f64,
                min: 1.0,
                max: MAX_SEGMENTS as f64,
            });
        }
        if self.layers == 0 {
            return Err(ParameterError::InvalidValue {
                name: "layers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Angles of one ring, starting at 0 and stopping short of a full turn
    pub fn angles(&self) -> AngleSteps {
        AngleSteps::new(self.segments)
    }
}

/// Main layers slow down on two arcs, open at both ends.
fn in_slow_arc(angle: f64) -> bool {
    (0.0 < angle && angle < FRAC_PI_4) || (PI < angle && angle < 5.0 * PI / 4.0)
}

/// Indicator layers skip the same arcs, but the windows include their start angle.
fn in_indicator_gap(angle: f64) -> bool {
    (0.0..FRAC_PI_4).contains(&angle) || (PI..5.0 * PI / 4.0).contains(&angle)
}

/// Fraction of a full turn, used to raise Z continuously within a layer
fn spiral_rise(layer_height: f64, angle: f64) -> f64 {
    layer_height * angle / TAU
}

/// Generator for the pressure advance calibration cylinder
pub struct PressureAdvanceCylinderGenerator {
    params: CylinderParameters,
    printer: PrinterProfile,
    filament: FilamentProfile,
    generated_at: DateTime<Local>,
}

impl PressureAdvanceCylinderGenerator {
    /// Create a generator for one printer/filament combination
    pub fn new(
        params: CylinderParameters,
        printer: PrinterProfile,
        filament: FilamentProfile,
    ) -> Self {
        Self {
            params,
            printer,
            filament,
            generated_at: Local::now(),
        }
    }

    /// Override the timestamp written in the header
    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn params(&self) -> &CylinderParameters {
        &self.params
    }

    pub fn printer(&self) -> &PrinterProfile {
        &self.printer
    }

    pub fn filament(&self) -> &FilamentProfile {
        &self.filament
    }

    /// Pressure advance for a main layer, interpolated from `pa_min` at layer 0
    /// towards `pa_max` at `layers`
    pub fn layer_pressure_advance(&self, layer: u32) -> f64 {
        let p = &self.printer;
        p.pa_min + (p.pa_max - p.pa_min) * (layer as f64 / self.params.layers as f64)
    }

    /// Pressure advance used for the indicator layers
    pub fn indicator_pressure_advance(&self) -> f64 {
        (self.printer.pa_min + self.printer.pa_max) / 2.0
    }

    /// Validate the cylinder and both profiles
    pub fn validate(&self) -> CamToolResult<()> {
        self.params.validate()?;
        self.printer.validate()?;
        self.filament.validate()?;
        Ok(())
    }

    /// Generate the G-Code as a string
    pub fn generate(&self) -> CamToolResult<String> {
        let bytes = self.write_to(Vec::new())?;
        String::from_utf8(bytes).map_err(|e| CamToolError::GenerationFailed(e.to_string()))
    }

    /// Generate the G-Code into a file, replacing any existing file
    pub fn write_to_file(&self, path: &Path) -> CamToolResult<()> {
        self.validate()?;
        let file = File::create(path)?;
        let writer = self.write_to(BufWriter::new(file))?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        info!(path = %path.display(), "Wrote calibration G-code");
        Ok(())
    }

    /// Generate the G-Code into `sink` and hand the sink back
    ///
    /// Parameters are validated before anything is written. On error the
    /// sink is dropped and its contents must be treated as incomplete.
    pub fn write_to<W: Write>(&self, sink: W) -> CamToolResult<W> {
        self.validate()?;

        let mut gcode = GcodeWriter::new(sink, &self.printer, &self.filament);
        let (cx, cy) = self.printer.center();

        self.write_header(&mut gcode)?;
        self.write_preheat(&mut gcode, cx, cy)?;
        self.write_brims(&mut gcode, cx, cy)?;
        self.write_adhesion_layer(&mut gcode, cx, cy)?;
        self.write_spiral_start(&mut gcode, cx, cy)?;
        self.write_main_layers(&mut gcode, cx, cy)?;
        self.write_indicator_layers(&mut gcode, cx, cy)?;
        self.write_shutdown(&mut gcode)?;

        let usage = gcode.filament_usage();
        info!(
            printer = %self.printer.name,
            filament = %self.filament.name(),
            lines = gcode.lines_written(),
            filament_mm = usage.length_mm,
            "Generated pressure advance cylinder"
        );
        Ok(gcode.finish()?)
    }

    fn write_header<W: Write>(&self, gcode: &mut GcodeWriter<W>) -> CamToolResult<()> {
        let p = &self.params;
        let printer = &self.printer;
        let filament = &self.filament;

        gcode.comment("Pressure advance calibration cylinder for RepRapFirmware")?;
        gcode.comment(&format!(
            "generated by pacal {} on {}",
            env!("CARGO_PKG_VERSION"),
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ))?;
        gcode.comment("")?;
        gcode.comment(&format!(
            "For printer: {} ({:.2} mm nozzle)",
            printer.name, printer.nozzle_diameter
        ))?;
        gcode.comment(&format!(
            "With filament: {} ({:.2})",
            filament.name(),
            filament.diameter()
        ))?;
        gcode.comment(&format!(
            "  First layer:      height={:.2} mm, bed temp={} C, print temp={} C, fan speed={:.0}%",
            printer.layer0_height,
            filament.bed_layer0_temp(),
            filament.hotend_layer0_temp(),
            filament.fan_layer0_speed()
        ))?;
        gcode.comment(&format!(
            "  Following layers: height={:.2} mm, bed temp={} C, print temp={} C, fan speed={:.0}%",
            printer.layer_height,
            filament.bed_temp(),
            filament.hotend_temp(),
            filament.fan_speed()
        ))?;
        gcode.comment("")?;
        gcode.comment(&format!(
            "Cylindrical object (r={:.1} mm, {} layers)",
            p.radius, p.layers
        ))?;
        gcode.comment(&format!("  Layer 0 PA: {:.3}", printer.pa_min))?;
        gcode.comment(&format!("  Layer {} PA: {:.3}", p.layers, printer.pa_max))?;
        Ok(())
    }

    fn write_preheat<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let filament = &self.filament;
        let brim_width = self.params.brims as f64 * gcode.extrusion_width();

        gcode.set_bed_temp_wait(filament.bed_layer0_temp())?;
        gcode.set_hotend_temp(filament.hotend_layer0_temp())?;
        gcode.init()?;
        gcode.home(true, true, true)?;
        gcode.move_to(
            cx + self.params.radius + brim_width,
            cy,
            START_TRAVEL_Z,
            printer.travel_speed,
        )?;
        gcode.set_hotend_temp_wait(filament.hotend_layer0_temp())?;
        gcode.set_fan_speed(filament.fan_layer0_speed())?;
        Ok(())
    }

    fn write_brims<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let z = printer.layer0_height;

        for brim in (1..=self.params.brims).rev() {
            let r = self.params.radius + brim as f64 * gcode.extrusion_width();
            debug!(brim, radius = r, "Brim ring");
            gcode.comment(&format!("Brim {}, r={:.3}", brim, r))?;
            gcode.move_to(cx + r, cy, z, printer.travel_speed)?;
            for a in self.params.angles() {
                gcode.extrude(cx + r * a.cos(), cy + r * a.sin(), z, printer.layer0_speed, z)?;
            }
        }
        Ok(())
    }

    fn write_adhesion_layer<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let filament = &self.filament;
        let r = self.params.radius;
        let z = printer.layer0_height;

        debug!("Adhesion layer");
        gcode.comment("Adhesion layer")?;
        for a in self.params.angles() {
            gcode.extrude(cx + r * a.cos(), cy + r * a.sin(), z, printer.layer0_speed, z)?;
        }

        gcode.set_bed_temp(filament.bed_temp())?;
        gcode.set_hotend_temp(filament.hotend_temp())?;
        gcode.set_fan_speed(filament.fan_speed())?;
        Ok(())
    }

    fn write_spiral_start<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let r = self.params.radius;

        debug!("Spiral vase start");
        gcode.comment("Spiral vase start")?;
        for a in self.params.angles() {
            let height = spiral_rise(printer.layer_height, a);
            gcode.extrude(
                cx + r * a.cos(),
                cy + r * a.sin(),
                printer.layer0_height + height,
                printer.fast_speed,
                height,
            )?;
        }
        Ok(())
    }

    fn write_main_layers<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let r = self.params.radius;

        gcode.comment("Main layers")?;
        for layer in 1..self.params.layers {
            let z = printer.layer0_height + layer as f64 * printer.layer_height;
            let pa = self.layer_pressure_advance(layer);
            debug!(layer, z, pa, "Main layer");
            gcode.comment(&format!("Layer {}, Z={:.3} mm, PA={:.3}", layer, z, pa))?;
            gcode.set_pressure_advance(pa)?;

            for a in self.params.angles() {
                let speed = if in_slow_arc(a) {
                    printer.slow_speed
                } else {
                    printer.fast_speed
                };
                gcode.extrude(
                    cx + r * a.cos(),
                    cy + r * a.sin(),
                    z + spiral_rise(printer.layer_height, a),
                    speed,
                    printer.layer_height,
                )?;
            }
        }
        Ok(())
    }

    fn write_indicator_layers<W: Write>(
        &self,
        gcode: &mut GcodeWriter<W>,
        cx: f64,
        cy: f64,
    ) -> CamToolResult<()> {
        let printer = &self.printer;
        let r = self.params.radius;

        gcode.comment("Indicator layers")?;
        gcode.set_pressure_advance(self.indicator_pressure_advance())?;

        for layer in 0..INDICATOR_LAYERS {
            let z = printer.layer0_height
                + (self.params.layers + layer) as f64 * printer.layer_height;
            debug!(layer, z, "Indicator layer");
            let mut printing = true;

            for a in self.params.angles() {
                let x = cx + r * a.cos();
                let y = cy + r * a.sin();
                let target_z = z + spiral_rise(printer.layer_height, a);

                if in_indicator_gap(a) {
                    if printing {
                        gcode.retract()?;
                        printing = false;
                    }
                } else if !printing {
                    gcode.move_to(x, y, target_z + printer.retract_lift, printer.travel_speed)?;
                    gcode.deretract()?;
                    printing = true;
                }

                if printing {
                    gcode.extrude(x, y, target_z, printer.fast_speed, printer.layer_height)?;
                }
            }
        }
        Ok(())
    }

    fn write_shutdown<W: Write>(&self, gcode: &mut GcodeWriter<W>) -> CamToolResult<()> {
        gcode.retract()?;
        gcode.relative_move(0.0, 0.0, END_LIFT, self.printer.travel_speed)?;
        gcode.home(true, false, false)?;
        gcode.set_bed_temp(0)?;
        gcode.set_hotend_temp(0)?;
        gcode.set_fan_speed(0.0)?;
        gcode.disable_motors()?;

        let usage = gcode.filament_usage();
        gcode.comment(&usage.to_string())?;
        Ok(())
    }
}
