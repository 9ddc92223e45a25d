//! Streaming parser for Salt roster files.
//!
//! Only the fields relevant to an SSH client configuration are extracted.
//! See <https://docs.saltproject.io/en/latest/topics/ssh/roster.html>.

mod error;
mod parser;
mod record;

pub use error::RosterError;
pub use parser::RosterParser;
pub use record::Record;
