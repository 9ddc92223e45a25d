mod error;
mod file;
mod pairs;
mod settings;

pub use error::{SettingsError, ValidationError, ValidationResult};
pub use file::{FileSettings, config_path, load_from_path, load_from_str, schema, validate};
pub use pairs::parse_pair;
pub use settings::{Overrides, Settings};
