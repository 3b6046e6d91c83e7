//! Angle sequence for segmented circles
//!
//! Yields `0, step, 2*step, ...` while the angle is below a full turn, with
//! `step = 2π / segments`. The angle is accumulated by repeated addition,
//! so the exact floating point values (and therefore whether a value just
//! under 2π is produced) are stable for a given segment count. A full turn
//! itself is never yielded.

use std::f64::consts::TAU;
use std::iter::FusedIterator;

/// Lazy iterator over the angles of a segmented circle
#[derive(Debug, Clone)]
pub struct AngleSteps {
    next: f64,
    step: f64,
}

impl AngleSteps {
    /// Angles for a circle split into `segments` straight lines.
    ///
    /// Zero segments yields an empty sequence.
    pub fn new(segments: u32) -> Self {
        if segments == 0 {
            return Self {
                next: TAU,
                step: 0.0,
            };
        }
        Self {
            next: 0.0,
            step: TAU / segments as f64,
        }
    }
}

impl Iterator for AngleSteps {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next < TAU {
            let angle = self.next;
            self.next += self.step;
            Some(angle)
        } else {
            None
        }
    }
}

impl FusedIterator for AngleSteps {}
