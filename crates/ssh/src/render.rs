//! Rendering of roster records as `Host` sections.

use crate::error::RenderError;
use indexmap::IndexMap;
use roster::{Record, RosterParser};
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Options applied to every generated `Host` section.
#[derive(Debug, Clone, Default)]
pub struct SshConfigOpts {
    /// Prepended to each target ID to build the host alias.
    pub prefix: String,
    /// Values for the user placeholders set through directive comments.
    pub user_placeholder_values: HashMap<String, String>,
    /// Options added to every host, before the roster's own options.
    pub extra_ssh_options: IndexMap<String, String>,
}

/// A `Host` section of an SSH client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfigEntry {
    pub host: String,
    pub hostname: String,
    pub port: String,
    pub user: String,
    /// Additional keywords in the order they are written.
    pub ssh_options: Vec<(String, String)>,
}

impl SshConfigEntry {
    /// Builds the section for `record` applying `opts`.
    ///
    /// `opts.extra_ssh_options` go first. A roster option whose keyword is
    /// already present replaces it and is moved to the end.
    ///
    /// # Errors
    ///
    /// Returns an error if a roster option doesn't contain `=`.
    pub fn from_record(record: &Record, opts: &SshConfigOpts) -> Result<Self, RenderError> {
        let user = match opts.user_placeholder_values.get(&record.user) {
            Some(value) => value.clone(),
            None => {
                if is_placeholder(&record.user) {
                    warn!(
                        name = %record.target,
                        user = %record.user,
                        "no value provided for user placeholder, writing it verbatim"
                    );
                }
                record.user.clone()
            }
        };

        let mut ssh_options: Vec<(String, String)> =
            Vec::with_capacity(opts.extra_ssh_options.len() + record.ssh_options.len());
        ssh_options.extend(
            opts.extra_ssh_options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        for option in &record.ssh_options {
            let Some((key, value)) = option.split_once('=') else {
                return Err(RenderError::InvalidSshOption {
                    target: record.target.clone(),
                    option: option.clone(),
                });
            };

            if let Some(i) = ssh_options.iter().position(|(k, _)| k == key) {
                ssh_options.remove(i);
            }
            ssh_options.push((key.to_string(), value.to_string()));
        }

        Ok(Self {
            host: format!("{}{}", opts.prefix, record.target),
            hostname: record.host.clone(),
            port: record.port.clone(),
            user,
            ssh_options,
        })
    }
}

impl fmt::Display for SshConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host {}", self.host)?;
        writeln!(f, "  Hostname {}", self.hostname)?;
        if !self.port.is_empty() {
            writeln!(f, "  Port {}", self.port)?;
        }
        if !self.user.is_empty() {
            writeln!(f, "  User {}", self.user)?;
        }
        for (key, value) in &self.ssh_options {
            writeln!(f, "  {key} {value}")?;
        }
        Ok(())
    }
}

fn is_placeholder(user: &str) -> bool {
    user.starts_with('{') && user.ends_with('}')
}

/// Writes the `Host` section for `record` into `w`.
///
/// # Errors
///
/// Returns an error if a roster option is malformed or writing fails.
pub fn write_ssh_config_entry<W: Write>(
    record: &Record,
    opts: &SshConfigOpts,
    w: &mut W,
) -> Result<(), RenderError> {
    let entry = SshConfigEntry::from_record(record, opts)?;
    write!(w, "{entry}")?;
    Ok(())
}

/// Writes one `Host` section per roster target into `w`, each followed by a
/// blank line. Returns the number of sections written.
///
/// Sections are written as targets are parsed, so on error the ones already
/// written are kept.
///
/// # Errors
///
/// Returns an error if the roster is invalid, a roster option is malformed or
/// writing fails.
pub fn write_ssh_config<R: BufRead, W: Write>(
    parser: RosterParser<R>,
    opts: &SshConfigOpts,
    mut w: W,
) -> Result<usize, RenderError> {
    let mut written = 0;
    for record in parser {
        let record = record?;
        write_ssh_config_entry(&record, opts, &mut w)?;
        writeln!(w)?;
        written += 1;
        debug!(name = %record.target, "wrote SSH host");
    }

    w.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record() -> Record {
        Record {
            target: "server".into(),
            host: "127.0.0.1".into(),
            user: "test-1".into(),
            port: "2222".into(),
            ssh_options: vec![
                "ProxyJump=ubuntu@81.201.108.110:2222".into(),
                "ControlPath=~/.ssh/mux/cm-%r@%h:%p".into(),
            ],
        }
    }

    fn opts() -> SshConfigOpts {
        SshConfigOpts {
            prefix: "fleet-test-".into(),
            extra_ssh_options: IndexMap::from([(
                "StrictHostKeyChecking".to_string(),
                "accept-new".to_string(),
            )]),
            ..SshConfigOpts::default()
        }
    }

    fn render(record: &Record, opts: &SshConfigOpts) -> String {
        let mut buf = Vec::new();
        write_ssh_config_entry(record, opts, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_entry_without_placeholders() {
        let expected = "\
Host fleet-test-server
  Hostname 127.0.0.1
  Port 2222
  User test-1
  StrictHostKeyChecking accept-new
  ProxyJump ubuntu@81.201.108.110:2222
  ControlPath ~/.ssh/mux/cm-%r@%h:%p
";
        assert_eq!(render(&record(), &opts()), expected);
    }

    #[test]
    fn test_entry_without_port() {
        let expected = "\
Host fleet-test-server
  Hostname 127.0.0.1
  User test-1
  StrictHostKeyChecking accept-new
  ProxyJump ubuntu@81.201.108.110:2222
  ControlPath ~/.ssh/mux/cm-%r@%h:%p
";
        let record = Record {
            port: String::new(),
            ..record()
        };
        assert_eq!(render(&record, &opts()), expected);
    }

    #[test]
    fn test_entry_with_user_placeholder() {
        let expected = "\
Host fleet-test-server
  Hostname 127.0.0.1
  Port 2222
  User my-test-user
  StrictHostKeyChecking accept-new
";
        let record = Record {
            user: "{YOUR_TEST_USER}".into(),
            ssh_options: vec![],
            ..record()
        };
        let opts = SshConfigOpts {
            user_placeholder_values: HashMap::from([(
                "{YOUR_TEST_USER}".to_string(),
                "my-test-user".to_string(),
            )]),
            ..opts()
        };
        assert_eq!(render(&record, &opts), expected);
    }

    #[test]
    fn test_unresolved_placeholder_kept_verbatim() {
        let record = Record {
            user: "{YOUR_TEST_USER}".into(),
            ..Record::new("server")
        };
        let rendered = render(&record, &SshConfigOpts::default());
        assert!(rendered.contains("  User {YOUR_TEST_USER}\n"));
    }

    #[test]
    fn test_empty_fields_omitted() {
        let rendered = render(&Record::new("bare"), &SshConfigOpts::default());
        assert_eq!(rendered, "Host bare\n  Hostname \n");
    }

    #[test]
    fn test_placeholder_resolving_to_empty_omits_user() {
        let record = Record {
            user: "{NOBODY}".into(),
            ..Record::new("bare")
        };
        let opts = SshConfigOpts {
            user_placeholder_values: HashMap::from([("{NOBODY}".to_string(), String::new())]),
            ..SshConfigOpts::default()
        };
        assert_eq!(render(&record, &opts), "Host bare\n  Hostname \n");
    }

    #[test]
    fn test_roster_option_overrides_extra_option() {
        let record = Record {
            ssh_options: vec!["ProxyCommand=b".into()],
            ..Record::new("server")
        };
        let opts = SshConfigOpts {
            extra_ssh_options: IndexMap::from([("ProxyCommand".to_string(), "a".to_string())]),
            ..SshConfigOpts::default()
        };
        assert_eq!(
            render(&record, &opts),
            "Host server\n  Hostname \n  ProxyCommand b\n"
        );
    }

    #[test]
    fn test_override_moves_option_to_end() {
        let record = Record {
            ssh_options: vec!["ForwardAgent=no".into(), "User=x".into()],
            ..Record::new("server")
        };
        let opts = SshConfigOpts {
            extra_ssh_options: IndexMap::from([
                ("ForwardAgent".to_string(), "yes".to_string()),
                ("Compression".to_string(), "yes".to_string()),
            ]),
            ..SshConfigOpts::default()
        };

        let entry = SshConfigEntry::from_record(&record, &opts).unwrap();
        assert_eq!(
            entry.ssh_options,
            vec![
                ("Compression".to_string(), "yes".to_string()),
                ("ForwardAgent".to_string(), "no".to_string()),
                ("User".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_repeated_roster_option_last_wins() {
        let record = Record {
            ssh_options: vec![
                "ForwardAgent=yes".into(),
                "Compression=yes".into(),
                "ForwardAgent=no".into(),
            ],
            ..Record::new("server")
        };

        let entry = SshConfigEntry::from_record(&record, &SshConfigOpts::default()).unwrap();
        assert_eq!(
            entry.ssh_options,
            vec![
                ("Compression".to_string(), "yes".to_string()),
                ("ForwardAgent".to_string(), "no".to_string()),
            ]
        );
    }

    #[test]
    fn test_option_split_on_first_equals() {
        let record = Record {
            ssh_options: vec!["ProxyCommand=ssh -W %h:%p -o User=jump bastion".into()],
            ..Record::new("server")
        };

        let entry = SshConfigEntry::from_record(&record, &SshConfigOpts::default()).unwrap();
        assert_eq!(entry.ssh_options[0].0, "ProxyCommand");
        assert_eq!(entry.ssh_options[0].1, "ssh -W %h:%p -o User=jump bastion");
    }

    #[test]
    fn test_malformed_option() {
        let record = Record {
            ssh_options: vec!["badopt".into()],
            ..Record::new("server")
        };

        let err = SshConfigEntry::from_record(&record, &SshConfigOpts::default()).unwrap_err();
        match &err {
            RenderError::InvalidSshOption { target, option } => {
                assert_eq!(target, "server");
                assert_eq!(option, "badopt");
            }
            other => panic!("Expected InvalidSshOption, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "roster target \"server\" contains an invalid SSH option because it doesn't have an '=': \"badopt\""
        );
    }

    #[test]
    fn test_write_ssh_config_separates_blocks() {
        let roster = "a:\n  host: 10.0.0.1\nb:\n  host: 10.0.0.2\n  port: 22\n";
        let parser = RosterParser::new(Cursor::new(roster), "ifc").unwrap();

        let mut buf = Vec::new();
        let written = write_ssh_config(parser, &SshConfigOpts::default(), &mut buf).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Host a\n  Hostname 10.0.0.1\n\nHost b\n  Hostname 10.0.0.2\n  Port 22\n\n"
        );
    }

    #[test]
    fn test_write_ssh_config_keeps_blocks_before_error() {
        let roster = "a:\n  host: 1\nb:\n  ssh_options: [badopt]\nc:\n  host: 3\n";
        let parser = RosterParser::new(Cursor::new(roster), "ifc").unwrap();

        let mut buf = Vec::new();
        let result = write_ssh_config(parser, &SshConfigOpts::default(), &mut buf);

        assert!(matches!(result, Err(RenderError::InvalidSshOption { .. })));
        assert_eq!(String::from_utf8(buf).unwrap(), "Host a\n  Hostname 1\n\n");
    }

    #[test]
    fn test_write_ssh_config_rejects_empty_flow_items() {
        let roster = "a:\n  host: 1\n  ssh_options: [ForwardAgent=yes, , Compression=yes]\n";
        let parser = RosterParser::new(Cursor::new(roster), "ifc").unwrap();

        let result = write_ssh_config(parser, &SshConfigOpts::default(), Vec::new());
        match result {
            Err(RenderError::InvalidSshOption { target, option }) => {
                assert_eq!(target, "a");
                assert_eq!(option, "");
            }
            other => panic!("Expected InvalidSshOption, got {other:?}"),
        }
    }

    #[test]
    fn test_write_ssh_config_rejects_empty_flow_sequence() {
        let roster = "a:\n  host: 1\nb:\n  ssh_options: []\n";
        let parser = RosterParser::new(Cursor::new(roster), "ifc").unwrap();

        let mut buf = Vec::new();
        let result = write_ssh_config(parser, &SshConfigOpts::default(), &mut buf);

        assert!(matches!(result, Err(RenderError::InvalidSshOption { ref target, .. }) if target == "b"));
        assert_eq!(String::from_utf8(buf).unwrap(), "Host a\n  Hostname 1\n\n");
    }

    #[test]
    fn test_write_ssh_config_surfaces_roster_error() {
        let parser = RosterParser::new(Cursor::new("  host: 1\n"), "ifc").unwrap();

        let result = write_ssh_config(parser, &SshConfigOpts::default(), Vec::new());
        assert!(matches!(
            result,
            Err(RenderError::Roster(roster::RosterError::UnexpectedIndentation { line: 1 }))
        ));
    }
}
