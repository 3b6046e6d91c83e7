//! Error handling for pacal
//!
//! Provides the profile error type shared by every crate in the workspace:
//! invalid printer/filament data and failed catalog lookups.

use thiserror::Error;

/// Profile error type
///
/// Represents problems with printer or filament profiles and with
/// lookups in a profile catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A profile field holds a value that cannot be printed with
    #[error("Invalid value for '{field}' in profile '{profile}': {reason}")]
    InvalidValue {
        /// The profile name.
        profile: String,
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// No profile with the requested name exists
    #[error("Unknown {kind} profile: {name}")]
    NotFound {
        /// "printer" or "filament".
        kind: String,
        /// The name that was looked up.
        name: String,
    },

    /// Two profiles of the same kind share a name
    #[error("Duplicate {kind} profile: {name}")]
    Duplicate {
        /// "printer" or "filament".
        kind: String,
        /// The duplicated name.
        name: String,
    },

    /// A catalog contains no profiles of a kind
    #[error("No {kind} profiles defined")]
    Empty {
        /// "printer" or "filament".
        kind: String,
    },
}

impl ProfileError {
    /// Shorthand for an [`ProfileError::InvalidValue`].
    pub fn invalid(
        profile: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            profile: profile.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
