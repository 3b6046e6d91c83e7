//! Batch configuration for pacal
//!
//! A [`Config`] names where the G-code goes, the cylinder to print and the
//! printers and filaments to generate it for. Files are JSON or TOML, chosen
//! by extension. Missing keys fall back to the built-in defaults, so an
//! empty file is a valid configuration.

use pacal_camtools::CylinderParameters;
use pacal_core::{FilamentProfile, PrinterProfile, ProfileCatalog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Default file name prefix for generated G-code
pub const DEFAULT_FILE_PREFIX: &str = "pa_cal";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format from the file extension (`.json` or `.toml`)
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            _ => Err(SettingsError::UnsupportedFormat(format!(
                "{} (config file must be .json or .toml)",
                path.display()
            ))),
        }
    }
}

/// Complete batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory; one sub-directory per printer is created below it
    pub output_directory: PathBuf,
    /// File name prefix, output files are `<prefix>-<filament>.gcode`
    pub file_prefix: String,
    /// Calibration cylinder geometry
    pub cylinder: CylinderParameters,
    /// Printer profiles
    pub printers: Vec<PrinterProfile>,
    /// Filament profiles
    pub filaments: Vec<FilamentProfile>,
}

impl Default for Config {
    fn default() -> Self {
        let catalog = ProfileCatalog::builtin();
        Self {
            output_directory: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            cylinder: CylinderParameters::default(),
            printers: catalog.printers,
            filaments: catalog.filaments,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!(
            path = %path.display(),
            printers = config.printers.len(),
            filaments = config.filaments.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.file_prefix.is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "file_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(SettingsError::InvalidSetting {
                key: "file_prefix".to_string(),
                reason: format!("'{}' must not contain a path separator", self.file_prefix),
            });
        }

        self.cylinder.validate()?;
        self.catalog().validate()?;
        Ok(())
    }

    /// Printers and filaments as a lookup catalog
    pub fn catalog(&self) -> ProfileCatalog {
        ProfileCatalog {
            printers: self.printers.clone(),
            filaments: self.filaments.clone(),
        }
    }

    /// Output file for one printer/filament combination
    pub fn output_path(&self, printer: &str, filament: &str) -> PathBuf {
        self.output_directory
            .join(printer)
            .join(format!("{}-{}.gcode", self.file_prefix, filament))
    }
}
