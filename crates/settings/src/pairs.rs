use crate::error::SettingsError;

/// Splits a `name=value` pair on the first `=`.
///
/// The value may itself contain `=` and may be empty.
///
/// # Errors
///
/// Returns `SettingsError::InvalidPair` if `s` has no `=`.
pub fn parse_pair(s: &str) -> Result<(String, String), SettingsError> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| SettingsError::InvalidPair(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("{YOUR_USER}=alice").unwrap(),
            ("{YOUR_USER}".to_string(), "alice".to_string())
        );
    }

    #[test]
    fn test_parse_pair_splits_on_first_equals() {
        let (name, value) = parse_pair("ProxyCommand=ssh -o User=jump bastion").unwrap();
        assert_eq!(name, "ProxyCommand");
        assert_eq!(value, "ssh -o User=jump bastion");
    }

    #[test]
    fn test_parse_pair_empty_value() {
        assert_eq!(parse_pair("name=").unwrap(), ("name".to_string(), String::new()));
    }

    #[test]
    fn test_parse_pair_without_equals() {
        let err = parse_pair("alice").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPair(ref p) if p == "alice"));
        assert_eq!(
            err.to_string(),
            "invalid pair \"alice\", it doesn't contain the `=` to split between name and value"
        );
    }
}
