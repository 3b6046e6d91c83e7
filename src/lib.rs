//! # pacal
//!
//! Generates pressure advance calibration prints for RepRapFirmware printers:
//! a single-wall cylinder printed in spiral vase mode whose pressure advance
//! ramps with height, capped by retraction indicator layers.
//!
//! ## Architecture
//!
//! pacal is organized as a workspace with multiple crates:
//!
//! 1. **pacal-core** - Printer and filament profiles, units, errors
//! 2. **pacal-camtools** - G-code writer and the calibration cylinder generator
//! 3. **pacal-settings** - JSON/TOML batch configuration
//! 4. **pacal** - Batch orchestration and the command line binary

pub mod batch;

pub use batch::{
    catalog_summary, plan_jobs, run_all, run_job, BatchReport, GenerationJob, JobOutcome,
};
pub use pacal_camtools::{CylinderParameters, PressureAdvanceCylinderGenerator};
pub use pacal_core::{FilamentProfile, PrinterProfile, ProfileCatalog};
pub use pacal_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Initialize logging
///
/// Logs go to stderr so listings on stdout stay clean. `RUST_LOG` overrides
/// the default `info` level.
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_level(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
