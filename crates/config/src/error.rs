//! Configuration Error Types

use derive_more::{Display, Error};
use squash_compress::error::{Error as CompressionError, ErrorKind as CompressionErrorKind};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration source could not be read, or held invalid values.
    #[display("failed to load configuration")]
    Load,
    /// The configuration file's extension does not name a supported format.
    #[display("unsupported configuration file: {}", _0.display())]
    UnsupportedFile(#[error(not(source))] PathBuf),
    /// A configured codec cannot be constructed.
    #[display("codec error: {_0}")]
    Codec(CompressionErrorKind),
}

impl ErrorKind {
    /// Convert a compression error into a configuration error, keeping the
    /// compress crate's error tree as a child.
    #[track_caller]
    pub fn codec(err: CompressionError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Codec(inner))
    }
}
