//! Profile catalog
//!
//! Holds the printers and filaments a batch run can generate for, with
//! case-insensitive lookup by name.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::filament::FilamentProfile;
use super::printer::PrinterProfile;
use crate::error::ProfileError;

/// Collection of printer and filament profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCatalog {
    /// Printer profiles
    pub printers: Vec<PrinterProfile>,
    /// Filament profiles
    pub filaments: Vec<FilamentProfile>,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    /// Built-in printers and filaments
    pub fn builtin() -> Self {
        Self {
            printers: vec![PrinterProfile::hevo(), PrinterProfile::p3steel()],
            filaments: vec![FilamentProfile::pla(), FilamentProfile::petg()],
        }
    }

    /// Look up a printer by name (case-insensitive)
    pub fn printer(&self, name: &str) -> Result<&PrinterProfile, ProfileError> {
        self.printers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ProfileError::NotFound {
                kind: "printer".to_string(),
                name: name.to_string(),
            })
    }

    /// Look up a filament by name (case-insensitive)
    pub fn filament(&self, name: &str) -> Result<&FilamentProfile, ProfileError> {
        self.filaments
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProfileError::NotFound {
                kind: "filament".to_string(),
                name: name.to_string(),
            })
    }

    /// Validate every profile and check names are unique per kind
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.printers.is_empty() {
            return Err(ProfileError::Empty {
                kind: "printer".to_string(),
            });
        }
        if self.filaments.is_empty() {
            return Err(ProfileError::Empty {
                kind: "filament".to_string(),
            });
        }

        check_unique("printer", self.printers.iter().map(|p| p.name.as_str()))?;
        check_unique("filament", self.filaments.iter().map(|f| f.name()))?;

        for printer in &self.printers {
            printer.validate()?;
        }
        for filament in &self.filaments {
            filament.validate()?;
        }

        tracing::debug!(
            printers = self.printers.len(),
            filaments = self.filaments.len(),
            "Profile catalog validated"
        );
        Ok(())
    }
}

fn check_unique<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ProfileError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ProfileError::Duplicate {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
