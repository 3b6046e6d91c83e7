//! Unit conversion and number formatting utilities
//!
//! Profiles specify speeds in mm/s while G-code feed words are in mm/min.
//! The formatting helpers pin down the exact textual form of every numeric
//! G-code field.

/// Seconds per minute, used for feed conversion
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a speed in mm/s to a feed rate in mm/min
pub fn mm_per_sec_to_mm_per_min(speed: f64) -> f64 {
    speed * SECONDS_PER_MINUTE
}

/// Format a length (position, extruder, pressure advance) with 3 decimals
pub fn format_length(value_mm: f64) -> String {
    format!("{:.3}", value_mm)
}

/// Format a feed rate as an integer, truncating any fractional part
pub fn format_feed(value_mm_per_min: f64) -> String {
    format!("{}", value_mm_per_min.trunc() as i64)
}

/// Convert a fan speed percentage into a PWM fraction clamped to [0, 1]
pub fn fan_percent_to_pwm(percent: f64) -> f64 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Format a fan speed percentage as a 2-decimal PWM fraction
pub fn format_fan_pwm(percent: f64) -> String {
    format!("{:.2}", fan_percent_to_pwm(percent))
}
