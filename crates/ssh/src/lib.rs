//! SSH client configuration generation and inspection.

mod error;
mod hosts;
mod render;

pub use error::{RenderError, SshError};
pub use hosts::{list_hosts, list_hosts_in_file};
pub use render::{SshConfigEntry, SshConfigOpts, write_ssh_config, write_ssh_config_entry};
