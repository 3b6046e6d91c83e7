//! # pacal Core
//!
//! Core types and utilities for pacal.
//! Provides the printer and filament profile data models, the built-in
//! profile catalog, unit helpers, and the shared profile error type.

pub mod data;
pub mod error;
pub mod units;

pub use data::{
    catalog::ProfileCatalog,
    filament::FilamentProfile,
    printer::{BedGeometry, PrinterProfile, EXTRUSION_WIDTH_FACTOR},
    Position,
};

pub use error::ProfileError;
