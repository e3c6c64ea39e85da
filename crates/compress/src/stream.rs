//! Stream lifetime helpers.
//!
//! [`Closable`] is a stream handle with an explicit closed state, so that an
//! operation can release a caller's stream when it is done with it (the
//! "leave open" contract) and the caller can observe that it happened. Reading,
//! writing or seeking a closed stream fails with a [`StreamClosed`] I/O error.

use crate::error::{ErrorKind, Result};
use crate::input::Input;
use derive_more::{Display, Error};
use exn::ResultExt;
use std::io::{self, BufRead, ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};
use std::num::NonZeroUsize;
use std::ops::{Deref, DerefMut};

/// Returned (wrapped in an [`io::Error`]) by any operation on a closed
/// [`Closable`].
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("stream has been closed")]
pub struct StreamClosed;

/// Whether an I/O error was caused by using a closed [`Closable`].
pub fn is_stream_closed(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<StreamClosed>())
}

fn closed() -> io::Error {
    io::Error::other(StreamClosed)
}

/// A stream that can be closed independently of being dropped.
///
/// ```
/// use squash_compress::{Closable, CodecExt, CompressionType, Options, StandardCodec, Settings};
/// use std::io::{Cursor, Seek};
///
/// let codec = StandardCodec::new(CompressionType::Gzip, Settings::default()).unwrap();
/// let mut source = Closable::new(Cursor::new(b"Hello, World!".to_vec()));
///
/// codec.compress(&mut source, &Options::new().leave_open(true)).unwrap();
/// assert_eq!(source.stream_position().unwrap(), 13);
///
/// source.rewind().unwrap();
/// codec.compress(&mut source, &Options::new()).unwrap();
/// assert!(source.is_closed());
/// assert!(source.stream_position().is_err());
/// ```
#[derive(Debug, Default)]
pub struct Closable<S> {
    inner: Option<S>,
}

impl<S> Closable<S> {
    pub fn new(inner: S) -> Self {
        Self { inner: Some(inner) }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Drop the underlying stream. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("closed stream");
        }
    }

    pub fn get_ref(&self) -> io::Result<&S> {
        self.inner.as_ref().ok_or_else(closed)
    }

    pub fn get_mut(&mut self) -> io::Result<&mut S> {
        self.inner.as_mut().ok_or_else(closed)
    }

    /// Take the underlying stream back, if it has not been closed.
    pub fn into_inner(self) -> Option<S> {
        self.inner
    }
}

impl<S> From<S> for Closable<S> {
    fn from(inner: S) -> Self {
        Self::new(inner)
    }
}

impl<S: Read> Read for Closable<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.get_mut()?.read(buf)
    }
}

impl<S: BufRead> BufRead for Closable<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.get_mut()?.fill_buf()
    }

    fn consume(&mut self, amount: usize) {
        if let Some(inner) = self.inner.as_mut() {
            inner.consume(amount);
        }
    }
}

impl<S: Write> Write for Closable<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.get_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.get_mut()?.flush()
    }
}

impl<S: Seek> Seek for Closable<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.get_mut()?.seek(pos)
    }
}

/// Scoped borrow of a [`Closable`] that closes it on drop unless asked to
/// leave it open.
///
/// Closing happens on every exit path: normal return, early `?` return,
/// unwinding, and an async operation's future being dropped mid-flight.
#[derive(Debug)]
pub struct CloseGuard<'a, S> {
    stream: &'a mut Closable<S>,
    leave_open: bool,
}

impl<'a, S> CloseGuard<'a, S> {
    pub fn new(stream: &'a mut Closable<S>, leave_open: bool) -> Self {
        Self { stream, leave_open }
    }
}

impl<S> Deref for CloseGuard<'_, S> {
    type Target = Closable<S>;
    fn deref(&self) -> &Self::Target {
        self.stream
    }
}

impl<S> DerefMut for CloseGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream
    }
}

impl<S> Drop for CloseGuard<'_, S> {
    fn drop(&mut self) {
        if !self.leave_open {
            self.stream.close();
        }
    }
}

impl<S: Read> Read for CloseGuard<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

/// Copy everything from `reader` into `writer` through a buffer of
/// `buffer_size` bytes, returning the number of bytes copied.
pub fn copy<R, W>(reader: &mut R, writer: &mut W, buffer_size: NonZeroUsize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0; buffer_size.get()];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(read) => read,
            Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
}

/// Read a stream fully into memory.
pub fn drain<R: Read + ?Sized>(reader: &mut R, buffer_size: NonZeroUsize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    copy(reader, &mut output, buffer_size).or_raise(|| ErrorKind::Io)?;
    Ok(output)
}

/// Read any [`Input`] fully into memory, honouring the leave-open contract
/// for stream inputs.
///
/// ```
/// use squash_compress::Closable;
/// use squash_compress::stream::read_all;
/// use std::io::Cursor;
///
/// let mut source = Closable::new(Cursor::new(b"abc".to_vec()));
/// assert_eq!(read_all(&mut source, false).unwrap(), b"abc");
/// assert!(source.is_closed());
/// ```
pub fn read_all<'a, I: Input<'a>>(input: I, leave_open: bool) -> Result<Vec<u8>> {
    let mut reader = input.into_reader(leave_open);
    drain(&mut reader, crate::DEFAULT_BUFFER_SIZE)
}

#[cfg(feature = "async")]
pub use self::async_io::drain_async;

#[cfg(feature = "async")]
mod async_io {
    use super::{CloseGuard, Closable, closed};
    use crate::error::{ErrorKind, Result};
    use exn::ResultExt;
    use futures::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncSeek, AsyncWrite, SeekFrom};
    use std::io;
    use std::num::NonZeroUsize;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn poll_closed<T>() -> Poll<io::Result<T>> {
        Poll::Ready(Err(closed()))
    }

    impl<S: AsyncRead + Unpin> AsyncRead for Closable<S> {
        fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<io::Result<usize>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_read(cx, buf),
                None => poll_closed(),
            }
        }
    }

    impl<S: AsyncBufRead + Unpin> AsyncBufRead for Closable<S> {
        fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_fill_buf(cx),
                None => poll_closed(),
            }
        }

        fn consume(self: Pin<&mut Self>, amount: usize) {
            if let Some(inner) = Pin::into_inner(self).inner.as_mut() {
                Pin::new(inner).consume(amount);
            }
        }
    }

    impl<S: AsyncWrite + Unpin> AsyncWrite for Closable<S> {
        fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_write(cx, buf),
                None => poll_closed(),
            }
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_flush(cx),
                None => poll_closed(),
            }
        }

        fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_close(cx),
                None => poll_closed(),
            }
        }
    }

    impl<S: AsyncSeek + Unpin> AsyncSeek for Closable<S> {
        fn poll_seek(self: Pin<&mut Self>, cx: &mut Context<'_>, pos: SeekFrom) -> Poll<io::Result<u64>> {
            match Pin::into_inner(self).inner.as_mut() {
                Some(inner) => Pin::new(inner).poll_seek(cx, pos),
                None => poll_closed(),
            }
        }
    }

    impl<S: AsyncRead + Unpin> AsyncRead for CloseGuard<'_, S> {
        fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<io::Result<usize>> {
            Pin::new(&mut *Pin::into_inner(self).stream).poll_read(cx, buf)
        }
    }

    /// Read an async stream fully into memory.
    pub async fn drain_async<R>(reader: &mut R, buffer_size: NonZeroUsize) -> Result<Vec<u8>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut output = Vec::with_capacity(buffer_size.get());
        reader.read_to_end(&mut output).await.or_raise(|| ErrorKind::Io)?;
        Ok(output)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn small_buffer() -> NonZeroUsize {
        NonZeroUsize::new(3).unwrap()
    }

    #[test]
    fn test_closable_forwards_until_closed() {
        let mut stream = Closable::new(Cursor::new(b"Hello, World!".to_vec()));
        let mut head = [0; 5];
        stream.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"Hello");
        assert_eq!(stream.stream_position().unwrap(), 5);
        assert!(!stream.is_closed());

        stream.close();
        assert!(stream.is_closed());
        let err = stream.read(&mut head).unwrap_err();
        assert!(is_stream_closed(&err));
        assert!(is_stream_closed(&stream.stream_position().unwrap_err()));
        assert!(is_stream_closed(&stream.get_ref().unwrap_err()));
        assert!(stream.into_inner().is_none());
    }

    #[test]
    fn test_close_twice() {
        let mut stream = Closable::new(Cursor::new(Vec::<u8>::new()));
        stream.close();
        stream.close();
        assert!(stream.is_closed());
    }

    #[test]
    fn test_write_after_close() {
        let mut stream = Closable::new(Vec::new());
        stream.write_all(b"abc").unwrap();
        assert_eq!(stream.get_ref().unwrap(), b"abc");
        stream.close();
        assert!(is_stream_closed(&stream.write_all(b"def").unwrap_err()));
        assert!(is_stream_closed(&stream.flush().unwrap_err()));
    }

    #[test]
    fn test_other_errors_are_not_closed_errors() {
        let err = io::Error::new(IoErrorKind::UnexpectedEof, "eof");
        assert!(!is_stream_closed(&err));
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let mut stream = Closable::new(Cursor::new(b"data".to_vec()));
        {
            let mut guard = CloseGuard::new(&mut stream, false);
            let mut buf = Vec::new();
            guard.read_to_end(&mut buf).unwrap();
            assert_eq!(buf, b"data");
        }
        assert!(stream.is_closed());
    }

    #[test]
    fn test_guard_leaves_open() {
        let mut stream = Closable::new(Cursor::new(b"data".to_vec()));
        drop(CloseGuard::new(&mut stream, true));
        assert!(!stream.is_closed());
        assert_eq!(stream.get_ref().unwrap().get_ref().len(), 4);
    }

    #[test]
    fn test_guard_closes_on_early_return() {
        fn fails(stream: &mut Closable<Cursor<Vec<u8>>>) -> io::Result<()> {
            let _guard = CloseGuard::new(stream, false);
            Err(io::Error::other("boom"))
        }
        let mut stream = Closable::new(Cursor::new(b"data".to_vec()));
        assert!(fails(&mut stream).is_err());
        assert!(stream.is_closed());
    }

    #[test]
    fn test_copy_with_small_buffer() {
        let mut output = Vec::new();
        let copied = copy(&mut Cursor::new(b"Hello, World!"), &mut output, small_buffer()).unwrap();
        assert_eq!(copied, 13);
        assert_eq!(output, b"Hello, World!");
    }

    #[test]
    fn test_drain_empty() {
        let drained = drain(&mut io::empty(), small_buffer()).unwrap();
        assert!(drained.is_empty());
    }

    #[test]
    fn test_read_all_leave_open() {
        let mut stream = Closable::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(read_all(&mut stream, true).unwrap(), b"abc");
        assert!(!stream.is_closed());
        assert_eq!(stream.stream_position().unwrap(), 3);
    }
}
