//! Roster target entry.

/// The SSH related data of one target in a roster file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Target ID, the top-level key of the entry.
    pub target: String,
    /// Address to connect to. Empty when the roster omits it.
    pub host: String,
    /// Login name or a placeholder such as `{YOUR_USER}`.
    pub user: String,
    /// Port, kept verbatim.
    pub port: String,
    /// Raw `Key=Value` SSH options in source order.
    pub ssh_options: Vec<String>,
}

impl Record {
    /// Creates an empty record for `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Assigns `value` to the field called `name`, case insensitively.
    ///
    /// `sshoptions` appends instead of replacing. Returns `false` when `name`
    /// isn't a field of the record; the value is then dropped.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match name.to_lowercase().as_str() {
            "target" => self.target = value,
            "host" => self.host = value,
            "user" => self.user = value,
            "port" => self.port = value,
            "sshoptions" => self.ssh_options.push(value),
            _ => return false,
        }

        true
    }
}
