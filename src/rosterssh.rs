use roster::{RosterError, RosterParser};
use settings::{Overrides, Settings, SettingsError};
use ssh::{RenderError, SshConfigOpts, SshError, list_hosts_in_file, write_ssh_config};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// What to convert and where to write it.
#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub verify: bool,
    pub overrides: Overrides,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("impossible to open the Salt roster file {}: {source}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("impossible to create output file {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("generated SSH config is invalid: {0}")]
    Verify(#[from] SshError),

    #[error("generated SSH config declares {found} hosts but {expected} were written")]
    HostCountMismatch { expected: usize, found: usize },
}

/// Converts the roster at `options.input` and returns the number of hosts written.
pub fn run(options: &Options) -> Result<usize, Error> {
    let settings = Settings::load(options.config.as_deref(), options.overrides.clone())?;

    let input = File::open(&options.input).map_err(|source| Error::OpenInput {
        path: options.input.clone(),
        source,
    })?;
    let parser = RosterParser::new(BufReader::new(input), &settings.prefix_comment)?;

    let opts = SshConfigOpts {
        prefix: settings.prefix,
        user_placeholder_values: settings.user_values,
        extra_ssh_options: settings.extra_opts,
    };

    let written = if let Some(path) = &options.output {
        let output = File::create(path).map_err(|source| Error::CreateOutput {
            path: path.clone(),
            source,
        })?;
        let written = write_ssh_config(parser, &opts, BufWriter::new(output))?;

        if options.verify {
            verify(path, written)?;
        }

        written
    } else {
        if options.verify {
            warn!("--verify requires --output, skipping verification");
        }

        write_ssh_config(parser, &opts, io::stdout().lock())?
    };

    info!(hosts = written, "generated SSH config");
    Ok(written)
}

fn verify(path: &Path, expected: usize) -> Result<(), Error> {
    let found = list_hosts_in_file(path)?.len();
    if found != expected {
        return Err(Error::HostCountMismatch { expected, found });
    }

    info!(path = %path.display(), hosts = found, "verified SSH config");
    Ok(())
}
