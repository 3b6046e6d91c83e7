use approx::assert_relative_eq;
use pacal_camtools::gcode_writer::{bead_cross_section, GcodeWriter};
use pacal_camtools::AngleSteps;
use pacal_core::{FilamentProfile, PrinterProfile};
use std::io::{self, Write};

fn lines(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_repeated_moves_emit_nothing() {
    let mut w = GcodeWriter::new(Vec::new(), &PrinterProfile::hevo(), &FilamentProfile::pla());
    w.move_to(0.0, 0.0, 0.0, 0.0).unwrap();
    w.relative_move(0.0, 0.0, 0.0, 0.0).unwrap();
    assert_eq!(w.lines_written(), 0);
    assert!(w.finish().unwrap().is_empty());
}

#[test]
fn test_extruder_never_decreases_while_extruding() {
    let mut w = GcodeWriter::new(Vec::new(), &PrinterProfile::hevo(), &FilamentProfile::petg());
    let mut last = w.state().extruder;
    let r = 20.0;

    for (i, a) in AngleSteps::new(64).enumerate() {
        // Mix in a repeated point and zero/negative heights
        let height = [0.4, 0.0, 0.2, -0.1][i % 4];
        w.extrude(r * a.cos(), r * a.sin(), 0.3, 40.0, height).unwrap();
        w.extrude(r * a.cos(), r * a.sin(), 0.3, 40.0, 0.4).unwrap();
        assert!(w.state().extruder >= last);
        last = w.state().extruder;
    }
    assert!(last > 0.0);
}

#[test]
fn test_retract_then_deretract_adds_extra_restart() {
    let printer = PrinterProfile::hevo();
    let mut w = GcodeWriter::new(Vec::new(), &printer, &FilamentProfile::pla());
    w.move_to(10.0, 10.0, 0.25, 200.0).unwrap();
    w.extrude(20.0, 10.0, 0.25, 25.0, 0.25).unwrap();
    let before = w.state().extruder;
    let position = w.state().position;

    w.retract().unwrap();
    w.deretract().unwrap();

    assert_relative_eq!(
        w.state().extruder,
        before + printer.retract_extra_restart,
        epsilon = 1e-12
    );
    assert_relative_eq!(w.state().position.z, position.z, epsilon = 1e-12);

    let out = lines(w.finish().unwrap());
    let n = out.len();
    assert!(out[n - 4].starts_with("G1 E") && out[n - 4].ends_with(" F1800"));
    assert_eq!(out[n - 3], "G1 Z0.450 F12000");
    assert_eq!(out[n - 2], "G1 Z0.250");
    assert!(out[n - 1].starts_with("G1 E") && out[n - 1].ends_with(" F1800"));
}

#[test]
fn test_extrusion_field_order() {
    let mut w = GcodeWriter::new(Vec::new(), &PrinterProfile::p3steel(), &FilamentProfile::pla());
    w.extrude(1.0, 2.0, 0.2, 25.0, 0.2).unwrap();
    let out = lines(w.finish().unwrap());
    let words: Vec<char> = out[0]
        .split(' ')
        .skip(1)
        .map(|w| w.chars().next().unwrap())
        .collect();
    assert_eq!(words, vec!['X', 'Y', 'Z', 'E', 'F']);
}

#[test]
fn test_filament_usage() {
    let filament = FilamentProfile::pla();
    let mut w = GcodeWriter::new(Vec::new(), &PrinterProfile::p3steel(), &filament);
    w.move_to(0.0, 0.0, 0.2, 25.0).unwrap();
    w.extrude(100.0, 0.0, 0.2, 25.0, 0.2).unwrap();

    let usage = w.filament_usage();
    let volume_mm3 = 100.0 * bead_cross_section(0.45, 0.2);
    assert_relative_eq!(usage.volume_cm3, volume_mm3 / 1000.0, epsilon = 1e-12);
    assert_relative_eq!(usage.mass_g, 1.27 * volume_mm3 / 1000.0, epsilon = 1e-12);
    assert_relative_eq!(
        usage.length_mm,
        volume_mm3 / filament.cross_section_area(),
        epsilon = 1e-12
    );
}

/// Sink that fails after a fixed number of writes
struct FailingSink {
    writes_left: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.writes_left == 0 {
            return Err(io::Error::other("disk full"));
        }
        self.writes_left -= 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_sink_errors_propagate() {
    let mut w = GcodeWriter::new(
        FailingSink { writes_left: 2 },
        &PrinterProfile::hevo(),
        &FilamentProfile::pla(),
    );
    assert!(w.comment("ok").is_ok());
    let err = w.comment("fails").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
    assert_eq!(w.lines_written(), 1);
}

#[test]
fn test_angle_steps_keep_accumulated_tail() {
    // Accumulated addition lands just below a full turn for 128 segments
    assert_eq!(AngleSteps::new(128).count(), 129);
    assert_eq!(AngleSteps::new(4).count(), 4);
}
