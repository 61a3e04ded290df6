//! Error types for vfsh
//!
//! Two tiers of failure exist:
//! - Fatal: the seed archive cannot be decoded ([`Error::Archive`]). Nothing
//!   runs after this.
//! - Recoverable: navigation, creation and quoting errors. Builtins turn these
//!   into diagnostics on stderr and the session keeps going.

use thiserror::Error;

/// Result type alias using vfsh's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// vfsh error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The archive is not a recognized container or is structurally invalid.
    #[error("archive error: {0}")]
    Archive(String),

    /// A command line could not be tokenized (e.g. unterminated quote).
    #[error("parse error: {0}")]
    Parse(String),

    /// A path does not resolve to a node.
    #[error("{0}: No such file or directory")]
    NotFound(String),

    /// A file already occupies the position a directory was requested at.
    #[error("{0}: File exists")]
    AlreadyExists(String),

    /// A path segment that must be a directory names a file.
    #[error("{0}: Not a directory")]
    NotADirectory(String),

    /// I/O error reading input (script, archive, terminal).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an archive error from anything displayable.
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    /// Whether this error aborts the session rather than a single command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Archive(_) | Self::Io(_))
    }
}
