use roster::RosterError;
use std::io;
use thiserror::Error;

/// Error type for SSH configuration generation.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A roster SSH option has no `=` between keyword and value.
    #[error(
        "roster target {target:?} contains an invalid SSH option because it doesn't have an '=': {option:?}"
    )]
    InvalidSshOption { target: String, option: String },

    /// The roster could not be parsed.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Writing the configuration failed.
    #[error("failed to write SSH config: {0}")]
    Io(#[from] io::Error),
}

/// Error type for SSH configuration inspection.
#[derive(Error, Debug)]
pub enum SshError {
    /// SSH config file I/O error.
    #[error("failed to read SSH config: {0}")]
    Io(#[from] io::Error),

    /// SSH config parse error.
    #[error("failed to parse SSH config: {0}")]
    Parse(String),
}
