use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Validation Types
// ============================================================================

/// A validation error with path and message.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// JSON path to the error location.
    pub path: String,
    /// Human-readable error description.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result of settings validation.
#[derive(Debug)]
pub enum ValidationResult {
    /// Validation passed with no errors.
    Valid,
    /// Validation failed with one or more errors.
    Invalid(Vec<ValidationError>),
}

// ============================================================================
// Settings Error
// ============================================================================

/// Error type for settings loading operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file I/O error.
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings JSON parse error (not valid JSON at all).
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Settings schema validation error.
    #[error("settings validation failed: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A `name=value` pair without `=`.
    #[error("invalid pair {0:?}, it doesn't contain the `=` to split between name and value")]
    InvalidPair(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
