//! Response bodies produced by the streaming decoders.

use crate::error::{ErrorKind, Result};
use bytes::Bytes;
use exn::ResultExt;
use futures::io::{AsyncRead, AsyncReadExt};
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A boxed async decoder chain.
pub type AsyncDecoder = Box<dyn AsyncRead + Unpin + Send>;

/// Either the original body (nothing to decode, or an encoding this handler
/// does not support) or a chain of decoders reading from it.
///
/// Dropping the body drops every decoder in the chain along with the
/// original reader.
pub enum Body<R, D = Box<dyn Read>> {
    Untouched(R),
    Decoded(D),
}

impl<R, D> Body<R, D> {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Body::Decoded(_))
    }
}

impl<R: Read, D: Read> Body<R, D> {
    /// Read the whole body into memory.
    pub fn into_bytes(mut self) -> Result<Bytes> {
        let mut output = Vec::new();
        Read::read_to_end(&mut self, &mut output).or_raise(|| ErrorKind::Io)?;
        Ok(Bytes::from(output))
    }
}

impl<R: AsyncRead + Unpin, D: AsyncRead + Unpin> Body<R, D> {
    /// Read the whole body into memory.
    pub async fn into_bytes_async(mut self) -> Result<Bytes> {
        let mut output = Vec::new();
        AsyncReadExt::read_to_end(&mut self, &mut output).await.or_raise(|| ErrorKind::Io)?;
        Ok(Bytes::from(output))
    }
}

impl<R: Read, D: Read> Read for Body<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Body::Untouched(reader) => Read::read(reader, buf),
            Body::Decoded(decoder) => Read::read(decoder, buf),
        }
    }
}

impl<R: AsyncRead + Unpin, D: AsyncRead + Unpin> AsyncRead for Body<R, D> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<io::Result<usize>> {
        match Pin::into_inner(self) {
            Body::Untouched(reader) => Pin::new(reader).poll_read(cx, buf),
            Body::Decoded(decoder) => Pin::new(decoder).poll_read(cx, buf),
        }
    }
}

impl<R, D> std::fmt::Debug for Body<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Untouched(_) => f.write_str("Body::Untouched"),
            Body::Decoded(_) => f.write_str("Body::Decoded"),
        }
    }
}
