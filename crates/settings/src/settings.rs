use crate::error::SettingsError;
use crate::file::{self, FileSettings};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Values given on the command line. They take precedence over the settings
/// file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub prefix_comment: Option<String>,
    pub user_values: Vec<(String, String)>,
    pub extra_opts: Vec<(String, String)>,
}

/// Resolved options for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Prefix for each generated host alias.
    pub prefix: String,
    /// Prefix of the directive comments. Empty when nobody set it; the roster
    /// parser rejects that.
    pub prefix_comment: String,
    /// Placeholder to login name.
    pub user_values: HashMap<String, String>,
    /// SSH options added to every host, in order.
    pub extra_opts: IndexMap<String, String>,
}

impl Settings {
    /// Load settings from the file at `path`, or from `~/.rosterssh.json` if
    /// `path` is `None` and that file exists, then apply `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or is invalid. A
    /// missing default file is not an error.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, SettingsError> {
        let content = match path {
            Some(path) => Some(file::load_from_path(path)?),
            None => match file::config_path() {
                Some(path) if path.exists() => Some(file::load_from_path(&path)?),
                _ => None,
            },
        };

        Ok(Self::resolve(content.unwrap_or_default(), overrides))
    }

    /// Layers `overrides` on top of the settings file contents.
    ///
    /// A pair whose name is already set keeps its position and takes the new
    /// value.
    pub fn resolve(content: FileSettings, overrides: Overrides) -> Self {
        let mut user_values = content.user_values.unwrap_or_default();
        user_values.extend(overrides.user_values);

        let mut extra_opts = content.extra_opts.unwrap_or_default();
        extra_opts.extend(overrides.extra_opts);

        let settings = Self {
            prefix: overrides.prefix.or(content.prefix).unwrap_or_default(),
            prefix_comment: overrides
                .prefix_comment
                .or(content.prefix_comment)
                .unwrap_or_default(),
            user_values,
            extra_opts,
        };

        debug!(
            prefix = %settings.prefix,
            prefix_comment = %settings.prefix_comment,
            user_values = settings.user_values.len(),
            extra_opts = settings.extra_opts.len(),
            "resolved settings"
        );

        settings
    }
}
