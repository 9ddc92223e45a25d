use std::io;
use thiserror::Error;

/// Error type for roster parsing.
#[derive(Error, Debug)]
pub enum RosterError {
    /// The directive comment prefix was empty.
    #[error("the comment's prefix cannot be empty")]
    EmptyCommentPrefix,

    /// The directive comment prefix could not be turned into a line pattern.
    ///
    /// The prefix is escaped, so in practice only the regex size limit leads here.
    #[error("the comment's prefix cannot be used to build a comment pattern: {0}")]
    InvalidCommentPrefix(#[source] regex::Error),

    /// An indented line was found where a target ID was expected.
    #[error("invalid roster at line {line}, expected a target ID, found an indented line")]
    UnexpectedIndentation {
        /// 1-based line number of the offending line.
        line: usize,
    },

    /// Reading the roster failed.
    #[error("failed to read roster: {0}")]
    Io(#[from] io::Error),
}
