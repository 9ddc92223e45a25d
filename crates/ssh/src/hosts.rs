use crate::error::SshError;
use ssh2_config::{ParseRule, SshConfig};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parses an SSH client configuration and returns its host aliases in file order.
///
/// Wildcard and negated patterns are skipped.
///
/// # Errors
///
/// Returns `SshError::Parse` if the configuration is malformed.
pub fn list_hosts(reader: &mut impl BufRead) -> Result<Vec<String>, SshError> {
    let config = SshConfig::default()
        .parse(
            reader,
            ParseRule::ALLOW_UNKNOWN_FIELDS | ParseRule::ALLOW_UNSUPPORTED_FIELDS,
        )
        .map_err(|e| SshError::Parse(e.to_string()))?;

    let mut hosts = Vec::new();

    for host in config.get_hosts() {
        for clause in &host.pattern {
            let name = clause.pattern.as_str();

            // Skip wildcards and patterns
            if name.contains('*') || name.contains('?') || name == "!" {
                continue;
            }

            if clause.negated {
                continue;
            }

            hosts.push(name.to_string());
        }
    }

    Ok(hosts)
}

/// Parses the SSH client configuration at `path`. See [`list_hosts`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is malformed.
pub fn list_hosts_in_file(path: &Path) -> Result<Vec<String>, SshError> {
    let mut reader = BufReader::new(File::open(path)?);
    list_hosts(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{SshConfigOpts, write_ssh_config};
    use roster::RosterParser;
    use std::collections::HashMap;
    use std::io::Cursor;

    #[test]
    fn test_list_hosts_skips_patterns() {
        let config = "\
Host *
  ServerAliveInterval 30

Host prod !staging
  Hostname 10.0.0.1

Host db-?
  User postgres
";
        let hosts = list_hosts(&mut Cursor::new(config)).unwrap();
        assert_eq!(hosts, vec!["prod"]);
    }

    #[test]
    fn test_generated_config_is_parseable() {
        let roster = "\
web-0:
  host: 10.0.0.1
  port: 2222
  #ifc user: {YOUR_USER}
  ssh_options:
    - ForwardAgent=yes
db-0:
  host: 10.0.0.2
  user: postgres
";
        let parser = RosterParser::new(Cursor::new(roster), "ifc").unwrap();
        let opts = SshConfigOpts {
            prefix: "fleet-".into(),
            user_placeholder_values: HashMap::from([(
                "{YOUR_USER}".to_string(),
                "alice".to_string(),
            )]),
            ..SshConfigOpts::default()
        };

        let mut buf = Vec::new();
        write_ssh_config(parser, &opts, &mut buf).unwrap();

        let hosts = list_hosts(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(hosts, vec!["fleet-web-0", "fleet-db-0"]);

        let config = SshConfig::default()
            .parse(
                &mut Cursor::new(&buf),
                ParseRule::ALLOW_UNKNOWN_FIELDS | ParseRule::ALLOW_UNSUPPORTED_FIELDS,
            )
            .unwrap();
        let params = config.query("fleet-web-0");
        assert_eq!(params.host_name.as_deref(), Some("10.0.0.1"));
        assert_eq!(params.port, Some(2222));
        assert_eq!(params.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_list_hosts_in_missing_file() {
        let result = list_hosts_in_file(Path::new("/nonexistent/path/ssh-config"));
        assert!(matches!(result, Err(SshError::Io(_))));
    }
}
