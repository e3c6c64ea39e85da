//! HTTP Decoding Error Types

use derive_more::{Display, Error};
use squash_compress::error::{Error as CompressionError, ErrorKind as CompressionErrorKind};

/// A decoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for response decoding.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A codec in the `Content-Encoding` chain failed; the body is most likely
    /// corrupt.
    #[display("compression error: {_0}")]
    Compression(CompressionErrorKind),
    /// Reading a decoded body failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Convert a compression error into a decoding error, keeping the compress
    /// crate's error tree as a child.
    #[track_caller]
    pub fn compression(err: CompressionError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Compression(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Compression(inner) => inner.is_retryable(),
            Self::Io => true,
        }
    }
}
