//! Line based roster parser with one line of lookahead.
//!
//! A target ends only when the header of the following one is read, so that
//! header is kept in [`RosterParser`] until the next call.

use crate::error::RosterError;
use crate::record::Record;
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;
use tracing::debug;

/// Key of the SSH options field once underscores are removed.
const SSH_OPTIONS_KEY: &str = "sshoptions";

static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#").expect("Invalid regex pattern for comments"));

static INDENTED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+").expect("Invalid regex pattern for indentation"));

static BLANK_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*$").expect("Invalid regex pattern for blank lines"));

/// Indented `key: value`. The value may be empty (block sequence or empty
/// scalar) or a whole flow sequence.
static TARGET_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(\w+):\s*(.*)").expect("Invalid regex pattern for target fields")
});

/// Indented `- value`.
static BLOCK_SEQ_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+-\s*(.+)").expect("Invalid regex pattern for block sequence items")
});

/// Parses a Salt roster, yielding one [`Record`] per target with only the
/// fields related to SSH client configuration.
///
/// Comments of the form `#{prefix} {key}: {value}` (indented with any number
/// of spaces or tabs) assign `value` to the record field `key`, exactly as if
/// the roster declared it. They are how a roster marks values the user has to
/// supply, e.g. `#ifc user: {MY_GCP_USER}`. The space after the colon is
/// optional.
#[derive(Debug)]
pub struct RosterParser<R> {
    reader: R,
    directive_pattern: Regex,
    line: usize,
    /// Target ID of the following record, read while finishing the current one.
    lookahead: Option<String>,
    finished: bool,
}

impl<R: BufRead> RosterParser<R> {
    /// Creates a parser reading the roster from `reader`.
    ///
    /// `comment_prefix` must not be empty even if the roster doesn't contain
    /// any directive comment. It is matched literally; short lowercase
    /// alphanumeric prefixes such as `ifc` are recommended.
    ///
    /// # Errors
    ///
    /// Returns an error if `comment_prefix` is empty or cannot be compiled into
    /// the directive pattern.
    pub fn new(reader: R, comment_prefix: &str) -> Result<Self, RosterError> {
        if comment_prefix.is_empty() {
            return Err(RosterError::EmptyCommentPrefix);
        }

        let directive_pattern = Regex::new(&format!(
            r"^\s*#{}\s(\w+):\s?(.+)",
            regex::escape(comment_prefix)
        ))
        .map_err(RosterError::InvalidCommentPrefix)?;

        Ok(Self {
            reader,
            directive_pattern,
            line: 0,
            lookahead: None,
            finished: false,
        })
    }

    /// Returns the next record, or `None` once the roster is exhausted.
    ///
    /// After an error the parser is finished and keeps returning `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an indented line appears where a target ID is
    /// expected or if reading fails.
    pub fn next_record(&mut self) -> Result<Option<Record>, RosterError> {
        if self.finished {
            return Ok(None);
        }

        let result = self.advance();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }

        result
    }

    fn advance(&mut self) -> Result<Option<Record>, RosterError> {
        let target = match self.lookahead.take() {
            Some(target) => target,
            None => match self.seek_target()? {
                Some(target) => target,
                None => return Ok(None),
            },
        };

        let mut record = Record::new(target);
        let mut in_ssh_options = false;

        while let Some(l) = self.next_line()? {
            if BLANK_LINE_PATTERN.is_match(&l) {
                continue;
            }

            if let Some((key, value)) = self.parse_directive(&l) {
                if !record.set(key, value) {
                    debug!(line = self.line, key, "ignoring directive for unknown field");
                }
                continue;
            }

            if COMMENT_PATTERN.is_match(&l) {
                continue;
            }

            if !INDENTED_PATTERN.is_match(&l) {
                self.lookahead = Some(header_target(&l));
                break;
            }

            // A block sequence for the SSH options continues while lines are items.
            if in_ssh_options {
                if let Some(item) = extract_block_seq_item(&l) {
                    record.set(SSH_OPTIONS_KEY, trim_seq_item(item));
                    continue;
                }
                in_ssh_options = false;
            }

            let Some((key, value)) = extract_target_field(&l) else {
                debug!(line = self.line, "skipping roster-only line");
                continue;
            };

            if key == SSH_OPTIONS_KEY {
                if value.is_empty() {
                    in_ssh_options = true;
                } else {
                    for option in parse_flow_seq(value) {
                        record.set(SSH_OPTIONS_KEY, option);
                    }
                }
            } else {
                record.set(&key, value);
            }
        }

        debug!(
            name = %record.target,
            host = %record.host,
            options = record.ssh_options.len(),
            "parsed roster target"
        );

        Ok(Some(record))
    }

    /// Skips blank lines and comments up to the first target ID.
    fn seek_target(&mut self) -> Result<Option<String>, RosterError> {
        while let Some(l) = self.next_line()? {
            if BLANK_LINE_PATTERN.is_match(&l) || COMMENT_PATTERN.is_match(&l) {
                continue;
            }

            if INDENTED_PATTERN.is_match(&l) {
                return Err(RosterError::UnexpectedIndentation { line: self.line });
            }

            return Ok(Some(header_target(&l)));
        }

        Ok(None)
    }

    /// Reads one line without its `\n` or `\r\n` ending. Bytes that aren't
    /// valid UTF-8 are replaced rather than failing the whole roster.
    fn next_line(&mut self) -> Result<Option<String>, RosterError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn parse_directive<'a>(&self, l: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.directive_pattern.captures(l)?;
        let key = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str().trim_matches(['\t', ' ']);
        Some((key, value))
    }
}

impl<R: BufRead> Iterator for RosterParser<R> {
    type Item = Result<Record, RosterError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn header_target(l: &str) -> String {
    l.trim_matches([':', ' ']).to_string()
}

/// Extracts an SSH related field from an indented `key: value` line.
///
/// Underscores are removed from the key, so `ssh_options` comes back as
/// `sshoptions`. Fields unrelated to SSH client configuration yield `None`.
fn extract_target_field(l: &str) -> Option<(String, &str)> {
    let caps = TARGET_FIELD_PATTERN.captures(l)?;
    let key = caps.get(1)?.as_str().replace('_', "");
    match key.as_str() {
        "host" | "user" | "port" | SSH_OPTIONS_KEY => {}
        _ => return None,
    }

    let value = caps.get(2)?.as_str().trim_matches(['\t', ' ']);
    Some((key, value))
}

fn extract_block_seq_item(l: &str) -> Option<&str> {
    BLOCK_SEQ_ITEM_PATTERN
        .captures(l)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn trim_seq_item(item: &str) -> &str {
    item.trim_matches(['"', ' '])
}

/// Splits `[a, "b", c]` into its items. Empty items are kept, so `[]`
/// yields one empty item.
fn parse_flow_seq(s: &str) -> impl Iterator<Item = &str> {
    s.trim_matches(['[', ']']).split(',').map(trim_seq_item)
}
