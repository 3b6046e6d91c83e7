//! Stateful G-code writer for FDM printers
//!
//! [`GcodeWriter`] tracks the last emitted position, feed rate and absolute
//! extruder position. Motion requests only emit the words whose value
//! changed. Extrusion is computed from the bead cross-section
//! (see [`bead_cross_section`]) and accumulated in absolute extruder mode.
//! Retraction and de-retraction always emit their extruder word.

use pacal_core::units::{format_fan_pwm, format_feed, format_length, mm_per_sec_to_mm_per_min};
use pacal_core::{FilamentProfile, Position, PrinterProfile};
use std::f64::consts::PI;
use std::fmt;
use std::io::{self, Write};

/// Cross-section area of a deposited bead (mm²)
///
/// Models the bead as a rectangle with semicircular ends:
/// `(width - height) * height + π * (height / 2)²`.
pub fn bead_cross_section(extrusion_width: f64, layer_height: f64) -> f64 {
    (extrusion_width - layer_height) * layer_height + (layer_height / 2.0).powi(2) * PI
}

/// Last emitted machine state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MachineState {
    /// Tool position (mm)
    pub position: Position,
    /// Absolute extruder position (mm of filament)
    pub extruder: f64,
    /// Feed rate (mm/min)
    pub feed: f64,
}

/// Filament consumed by a print
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilamentUsage {
    /// Filament length (mm)
    pub length_mm: f64,
    /// Filament volume (cm³)
    pub volume_cm3: f64,
    /// Filament mass (g)
    pub mass_g: f64,
}

impl fmt::Display for FilamentUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "filament used = {:.1} mm ({:.1} cm3, {:.1} g)",
            self.length_mm, self.volume_cm3, self.mass_g
        )
    }
}

/// Words of a single `G1` line, rendered in X Y Z E F order
#[derive(Debug, Default)]
struct LinearMove {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    e: Option<f64>,
    f: Option<f64>,
}

impl LinearMove {
    fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.z.is_none()
            && self.e.is_none()
            && self.f.is_none()
    }

    fn to_gcode(&self) -> String {
        let mut cmd = String::from("G1");
        for (word, value) in [('X', self.x), ('Y', self.y), ('Z', self.z), ('E', self.e)] {
            if let Some(v) = value {
                cmd.push(' ');
                cmd.push(word);
                cmd.push_str(&format_length(v));
            }
        }
        if let Some(v) = self.f {
            cmd.push_str(" F");
            cmd.push_str(&format_feed(v));
        }
        cmd
    }
}

/// Stateful G-code emitter owning its output sink
///
/// The sink is released when the writer is consumed by [`GcodeWriter::finish`]
/// or dropped.
pub struct GcodeWriter<W: Write> {
    sink: W,
    state: MachineState,
    lines_written: usize,
    extrusion_width: f64,
    filament_area: f64,
    extrusion_multiplier: f64,
    filament_density: f64,
    retract_distance: f64,
    retract_feed: f64,
    retract_extra_restart: f64,
    retract_lift: f64,
    retract_lift_speed: f64,
}

impl<W: Write> GcodeWriter<W> {
    /// Create a writer for one printer/filament combination
    pub fn new(sink: W, printer: &PrinterProfile, filament: &FilamentProfile) -> Self {
        Self {
            sink,
            state: MachineState::default(),
            lines_written: 0,
            extrusion_width: printer.extrusion_width(),
            filament_area: filament.cross_section_area(),
            extrusion_multiplier: filament.extrusion_multiplier(),
            filament_density: filament.density(),
            retract_distance: printer.retract_distance,
            retract_feed: mm_per_sec_to_mm_per_min(printer.retract_speed),
            retract_extra_restart: printer.retract_extra_restart,
            retract_lift: printer.retract_lift,
            retract_lift_speed: printer.travel_speed,
        }
    }

    /// Last emitted machine state
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Effective bead width (mm)
    pub fn extrusion_width(&self) -> f64 {
        self.extrusion_width
    }

    /// Number of lines written so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    fn emit(&mut self, line: &str) -> io::Result<()> {
        tracing::trace!(line, "gcode");
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    /// Record the changed axes and feed into `cmd`
    fn diff_into(&mut self, cmd: &mut LinearMove, x: f64, y: f64, z: f64, speed: f64) {
        let pos = &mut self.state.position;
        if x != pos.x {
            cmd.x = Some(x);
            pos.x = x;
        }
        if y != pos.y {
            cmd.y = Some(y);
            pos.y = y;
        }
        if z != pos.z {
            cmd.z = Some(z);
            pos.z = z;
        }

        let feed = mm_per_sec_to_mm_per_min(speed);
        if feed != self.state.feed {
            cmd.f = Some(feed);
            self.state.feed = feed;
        }
    }

    /// Move without extrusion, emitting only the words that changed
    ///
    /// # Arguments
    /// * `speed` - Movement speed (mm/s)
    pub fn move_to(&mut self, x: f64, y: f64, z: f64, speed: f64) -> io::Result<()> {
        let mut cmd = LinearMove::default();
        self.diff_into(&mut cmd, x, y, z, speed);
        if cmd.is_empty() {
            return Ok(());
        }
        self.emit(&cmd.to_gcode())
    }

    /// Move relative to the current position without extrusion
    pub fn relative_move(&mut self, dx: f64, dy: f64, dz: f64, speed: f64) -> io::Result<()> {
        let pos = self.state.position;
        self.move_to(pos.x + dx, pos.y + dy, pos.z + dz, speed)
    }

    /// Extruding move
    ///
    /// The filament fed is the travelled distance times the bead cross-section
    /// for `layer_height`, scaled by the extrusion multiplier and divided by
    /// the filament cross-section. A line is always emitted; the `E` word is
    /// present whenever the volume is positive.
    pub fn extrude(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        speed: f64,
        layer_height: f64,
    ) -> io::Result<()> {
        let area = bead_cross_section(self.extrusion_width, layer_height);
        let length = self.state.position.distance_to(&Position::new(x, y, z));
        let volume = length * area * self.extrusion_multiplier;

        let mut cmd = LinearMove::default();
        self.diff_into(&mut cmd, x, y, z, speed);

        if volume > 0.0 {
            self.state.extruder += volume / self.filament_area;
            cmd.e = Some(self.state.extruder);
        }

        self.emit(&cmd.to_gcode())
    }

    /// Extruder-only move at the retraction feed; always emitted and leaves
    /// the tracked feed rate untouched
    fn emit_extruder_move(&mut self) -> io::Result<()> {
        let cmd = LinearMove {
            e: Some(self.state.extruder),
            f: Some(self.retract_feed),
            ..Default::default()
        };
        self.emit(&cmd.to_gcode())
    }

    /// Retract the filament, then lift Z
    pub fn retract(&mut self) -> io::Result<()> {
        self.state.extruder -= self.retract_distance;
        self.emit_extruder_move()?;
        let pos = self.state.position;
        self.move_to(pos.x, pos.y, pos.z + self.retract_lift, self.retract_lift_speed)
    }

    /// Lower Z, then restore the filament plus the extra restart distance
    pub fn deretract(&mut self) -> io::Result<()> {
        let pos = self.state.position;
        self.move_to(pos.x, pos.y, pos.z - self.retract_lift, self.retract_lift_speed)?;
        self.state.extruder += self.retract_distance + self.retract_extra_restart;
        self.emit_extruder_move()
    }

    /// Set bed temperature (°C)
    pub fn set_bed_temp(&mut self, temp: u32) -> io::Result<()> {
        self.emit(&format!("M140 S{}", temp))
    }

    /// Set bed temperature and wait for it to be reached
    pub fn set_bed_temp_wait(&mut self, temp: u32) -> io::Result<()> {
        self.emit(&format!("M190 S{}", temp))
    }

    /// Set hotend temperature (°C)
    pub fn set_hotend_temp(&mut self, temp: u32) -> io::Result<()> {
        self.emit(&format!("M104 S{}", temp))
    }

    /// Set hotend temperature and wait for it to be reached
    pub fn set_hotend_temp_wait(&mut self, temp: u32) -> io::Result<()> {
        self.emit(&format!("M109 S{}", temp))
    }

    /// Set part cooling fan speed (%), clamped to 0..=100
    pub fn set_fan_speed(&mut self, percent: f64) -> io::Result<()> {
        self.emit(&format!("M106 S{}", format_fan_pwm(percent)))
    }

    /// Set pressure advance for extruder 0 (s)
    pub fn set_pressure_advance(&mut self, pressure_advance: f64) -> io::Result<()> {
        self.emit(&format!("M572 D0 S{}", format_length(pressure_advance)))
    }

    /// Millimeters, absolute extrusion, zero extruder, absolute positioning
    pub fn init(&mut self) -> io::Result<()> {
        self.emit("G21")?;
        self.emit("M82")?;
        self.emit("G92 E0")?;
        self.emit("G90")
    }

    /// Home the selected axes; all three selected emits a bare `G28`
    pub fn home(&mut self, x: bool, y: bool, z: bool) -> io::Result<()> {
        let mut cmd = String::from("G28");
        if !(x && y && z) {
            for (axis, selected) in [(" X", x), (" Y", y), (" Z", z)] {
                if selected {
                    cmd.push_str(axis);
                }
            }
        }
        self.emit(&cmd)
    }

    pub fn absolute_positioning(&mut self) -> io::Result<()> {
        self.emit("G90")
    }

    pub fn relative_positioning(&mut self) -> io::Result<()> {
        self.emit("G91")
    }

    /// Disable motor drivers
    pub fn disable_motors(&mut self) -> io::Result<()> {
        self.emit("M18")
    }

    /// Emit `; <text>`
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        self.emit(&format!("; {}", text))
    }

    /// Filament consumed up to the current extruder position
    pub fn filament_usage(&self) -> FilamentUsage {
        let length_mm = self.state.extruder;
        let volume_cm3 = length_mm * self.filament_area / 1000.0;
        FilamentUsage {
            length_mm,
            volume_cm3,
            mass_g: self.filament_density * length_mm * self.filament_area / 1000.0,
        }
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        tracing::debug!(lines = self.lines_written, "G-code writer finished");
        Ok(self.sink)
    }
}
