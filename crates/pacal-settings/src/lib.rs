//! pacal Settings Crate
//!
//! Loads, validates and saves the batch configuration: output location,
//! cylinder geometry and the printer/filament catalog.

pub mod config;
pub mod error;

pub use config::{Config, ConfigFormat};
pub use error::{SettingsError, SettingsResult};
