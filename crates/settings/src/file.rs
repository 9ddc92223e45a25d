use crate::error::{SettingsError, ValidationError, ValidationResult};
use indexmap::IndexMap;
use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_JSON: &str = include_str!("../../../assets/rosterssh.schema.json");

/// Contents of a settings file. All fields are optional; command-line values
/// are layered on top by [`crate::Settings`].
#[derive(Debug, Default, Deserialize)]
pub struct FileSettings {
    pub prefix: Option<String>,
    pub prefix_comment: Option<String>,
    pub user_values: Option<HashMap<String, String>>,
    /// Kept in document order.
    pub extra_opts: Option<IndexMap<String, String>>,
}

// ============================================================================
// Schema Validation
// ============================================================================

/// Returns the embedded JSON schema as a string.
pub fn schema() -> &'static str {
    SCHEMA_JSON
}

/// Validates a JSON value against the settings schema.
///
/// # Panics
///
/// Panics if the embedded schema is invalid JSON or not a valid JSON Schema.
/// This should never happen as the schema is compile-time embedded.
pub fn validate(value: &Value) -> ValidationResult {
    let schema: Value =
        serde_json::from_str(SCHEMA_JSON).expect("embedded schema should be valid JSON");

    let validator = Validator::new(&schema).expect("embedded schema should be a valid JSON Schema");

    let errors: Vec<ValidationError> = validator
        .iter_errors(value)
        .map(|e| ValidationError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

// ============================================================================
// Settings Loading
// ============================================================================

/// Returns the default settings file path (~/.rosterssh.json).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rosterssh.json"))
}

/// Loads settings from a string.
///
/// Validates against the schema first, then deserializes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or fails schema validation.
pub fn load_from_str(s: &str) -> Result<FileSettings, SettingsError> {
    let value: Value = serde_json::from_str(s)?;

    if let ValidationResult::Invalid(errors) = validate(&value) {
        return Err(SettingsError::Validation(errors));
    }

    Ok(serde_json::from_value(value)?)
}

/// Loads settings from a specific path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn load_from_path(path: &Path) -> Result<FileSettings, SettingsError> {
    let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
