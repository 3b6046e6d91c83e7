//! # pacal CAM Tools
//!
//! This crate turns printer and filament profiles into G-Code for a
//! pressure advance calibration print.
//!
//! ## Components
//!
//! - **G-Code Writer**: Stateful motion emitter that only emits changed fields and
//!   computes extrusion from bead cross-section geometry
//! - **Angle Steps**: Lazy angle sequence used to approximate circles with segments
//! - **Pressure Advance Cylinder**: Brim, adhesion layer, spiral vase body with a
//!   pressure advance ramp, and retraction indicator layers

pub mod angles;
pub mod error;
pub mod gcode_writer;
pub mod pa_cylinder;

// Re-export commonly used items
pub use angles::AngleSteps;
pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use gcode_writer::{bead_cross_section, FilamentUsage, GcodeWriter, MachineState};
pub use pa_cylinder::{CylinderParameters, PressureAdvanceCylinderGenerator};
