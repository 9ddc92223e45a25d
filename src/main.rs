mod rosterssh;

use clap::{ArgAction, Parser};
use rosterssh::Options;
use settings::{Overrides, parse_pair};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = concat!(env!("ROSTERSSH_VERSION"), " ", env!("ROSTERSSH_BUILD_HASH"));

/// Generate an SSH client configuration from a Salt roster file.
#[derive(Parser, Debug)]
#[command(name = "rosterssh", version = VERSION)]
struct Arguments {
    /// File path to the Salt roster file
    #[arg(long)]
    input: PathBuf,

    /// File path to write the SSH configuration; when empty, it prints it out to stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Prefix for each host found in the roster file
    #[arg(long)]
    prefix: Option<String>,

    /// Prefix used in the roster comments to indicate user's specific values.
    /// It cannot be empty even if the roster doesn't contain any
    #[arg(long)]
    prefix_comment: Option<String>,

    /// User's values to replace the placeholders set through the special comments
    /// (the ones prefixed with prefix-comment). Values are name=value pairs
    #[arg(long, value_name = "NAME=VALUE", value_delimiter = ',', value_parser = parse_pair)]
    user_values: Vec<(String, String)>,

    /// Extra SSH options to add to every host generated from the roster file,
    /// written before the roster's own options. Values are name=value pairs
    #[arg(long, value_name = "NAME=VALUE", value_delimiter = ',', value_parser = parse_pair)]
    extra_opts: Vec<(String, String)>,

    /// Settings file; defaults to ~/.rosterssh.json when it exists
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check that the written file parses as an SSH configuration (requires --output)
    #[arg(long)]
    verify: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl From<Arguments> for Options {
    fn from(args: Arguments) -> Self {
        Self {
            input: args.input,
            output: args.output,
            config: args.config,
            verify: args.verify,
            overrides: Overrides {
                prefix: args.prefix,
                prefix_comment: args.prefix_comment,
                user_values: args.user_values,
                extra_opts: args.extra_opts,
            },
        }
    }
}

/// Crates whose events are shown without `RUST_LOG`.
const LOG_TARGETS: [&str; 4] = ["rosterssh", "roster", "ssh", "settings"];

/// Filter used when `RUST_LOG` isn't set, e.g. `rosterssh=warn,roster=warn,...`.
fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_logging(verbose: u8) {
    // stdout may carry the generated configuration
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args = Arguments::parse();
    init_logging(args.verbose);

    if let Err(e) = rosterssh::run(&args.into()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_scoped_to_workspace_crates() {
        assert_eq!(
            default_filter(0),
            "rosterssh=warn,roster=warn,ssh=warn,settings=warn"
        );
        assert_eq!(
            default_filter(2),
            "rosterssh=debug,roster=debug,ssh=debug,settings=debug"
        );
        assert!(default_filter(9).starts_with("rosterssh=trace,"));
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter(1)).is_ok());
    }
}
