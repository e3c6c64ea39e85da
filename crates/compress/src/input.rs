//! Input kinds accepted by the compress/decompress verbs.
//!
//! Strings and byte buffers are borrowed and never closed. A
//! [`Closable`] stream is read through a [`CloseGuard`], which closes it once
//! the operation is over unless the caller asked to leave it open.

use crate::stream::{CloseGuard, Closable};
use std::io::Read;

/// Something a synchronous operation can read its input from.
pub trait Input<'a> {
    /// Turn the input into a reader. For stream inputs, dropping the reader
    /// closes the stream unless `leave_open` is set.
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a>;
}

impl<'a> Input<'a> for &'a [u8] {
    fn into_reader(self, _leave_open: bool) -> Box<dyn Read + Send + 'a> {
        Box::new(self)
    }
}

impl<'a, const N: usize> Input<'a> for &'a [u8; N] {
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a> {
        self.as_slice().into_reader(leave_open)
    }
}

impl<'a> Input<'a> for &'a Vec<u8> {
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a> {
        self.as_slice().into_reader(leave_open)
    }
}

impl<'a> Input<'a> for &'a str {
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a> {
        self.as_bytes().into_reader(leave_open)
    }
}

impl<'a> Input<'a> for &'a String {
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a> {
        self.as_bytes().into_reader(leave_open)
    }
}

impl<'a, R: Read + Send + 'a> Input<'a> for &'a mut Closable<R> {
    fn into_reader(self, leave_open: bool) -> Box<dyn Read + Send + 'a> {
        Box::new(CloseGuard::new(self, leave_open))
    }
}

#[cfg(feature = "async")]
pub use self::async_input::AsyncInput;

#[cfg(feature = "async")]
mod async_input {
    use crate::stream::{CloseGuard, Closable};
    use futures::io::AsyncRead;

    /// Something an asynchronous operation can read its input from.
    ///
    /// The returned reader owns the close-on-drop guard, so a stream input is
    /// closed even when the operation's future is dropped before completion.
    pub trait AsyncInput<'a> {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a>;
    }

    impl<'a> AsyncInput<'a> for &'a [u8] {
        fn into_async_reader(self, _leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            Box::new(self)
        }
    }

    impl<'a, const N: usize> AsyncInput<'a> for &'a [u8; N] {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            self.as_slice().into_async_reader(leave_open)
        }
    }

    impl<'a> AsyncInput<'a> for &'a Vec<u8> {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            self.as_slice().into_async_reader(leave_open)
        }
    }

    impl<'a> AsyncInput<'a> for &'a str {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            self.as_bytes().into_async_reader(leave_open)
        }
    }

    impl<'a> AsyncInput<'a> for &'a String {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            self.as_bytes().into_async_reader(leave_open)
        }
    }

    impl<'a, R: AsyncRead + Unpin + Send + 'a> AsyncInput<'a> for &'a mut Closable<R> {
        fn into_async_reader(self, leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            Box::new(CloseGuard::new(self, leave_open))
        }
    }

    /// An input that was already converted, possibly holding a close guard.
    impl<'a> AsyncInput<'a> for Box<dyn AsyncRead + Unpin + Send + 'a> {
        fn into_async_reader(self, _leave_open: bool) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
            self
        }
    }
}
