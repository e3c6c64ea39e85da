//! Whole-input verbs available on every [`Codec`].

use crate::Options;
use crate::codec::Codec;
use crate::error::Result;
#[cfg(feature = "async")]
use crate::input::AsyncInput;
use crate::input::Input;
#[cfg(feature = "async")]
use futures::future::BoxFuture;
#[cfg(feature = "async")]
use futures::io::Cursor as AsyncCursor;
use std::io::Cursor;

/// The compress/decompress verbs, implemented for every [`Codec`] (including
/// `dyn Codec`).
///
/// Each verb resolves `options` against the codec's own
/// [`settings`](Codec::settings), so an explicit level always wins. Stream
/// inputs are closed once the verb is done with them unless
/// [`Options::leave_open`] is set.
///
/// ```
/// use squash_compress::{CodecExt, CompressionType, Options, Settings, StandardCodec};
///
/// let codec = StandardCodec::new(CompressionType::Gzip, Settings::default()).unwrap();
/// let compressed = codec.compress("Hello, World!", &Options::new()).unwrap();
/// let original = codec.decompress(&compressed, &Options::new()).unwrap();
/// assert_eq!(original, b"Hello, World!");
/// ```
pub trait CodecExt: Codec {
    fn compress<'a, I: Input<'a>>(&self, input: I, options: &Options) -> Result<Vec<u8>> {
        let settings = options.resolve(self.settings());
        let mut reader = input.into_reader(options.leave_open);
        let mut output = Vec::new();
        self.encode(&mut reader, &mut output, settings)?;
        Ok(output)
    }

    /// Like [`compress`](Self::compress), but returns a caller-owned stream
    /// positioned at the start.
    fn compress_to_stream<'a, I: Input<'a>>(&self, input: I, options: &Options) -> Result<Cursor<Vec<u8>>> {
        self.compress(input, options).map(Cursor::new)
    }

    fn decompress<'a, I: Input<'a>>(&self, input: I, options: &Options) -> Result<Vec<u8>> {
        let settings = options.resolve(self.settings());
        let mut reader = input.into_reader(options.leave_open);
        let mut output = Vec::new();
        self.decode(&mut reader, &mut output, settings)?;
        Ok(output)
    }

    fn decompress_to_stream<'a, I: Input<'a>>(&self, input: I, options: &Options) -> Result<Cursor<Vec<u8>>> {
        self.decompress(input, options).map(Cursor::new)
    }

    /// Asynchronous [`compress`](Self::compress).
    ///
    /// The input is turned into its reader before the future is returned, so
    /// dropping the future (even unpolled) still honours `leave_open`.
    #[cfg(feature = "async")]
    fn compress_async<'f, 'a: 'f, I>(&'f self, input: I, options: &Options) -> BoxFuture<'f, Result<Vec<u8>>>
    where
        I: AsyncInput<'a>,
    {
        let settings = options.resolve(self.settings());
        let mut reader = input.into_async_reader(options.leave_open);
        Box::pin(async move {
            let mut output = AsyncCursor::new(Vec::new());
            self.encode_async(&mut reader, &mut output, settings).await?;
            Ok(output.into_inner())
        })
    }

    #[cfg(feature = "async")]
    fn compress_to_stream_async<'f, 'a: 'f, I>(
        &'f self,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<AsyncCursor<Vec<u8>>>>
    where
        I: AsyncInput<'a>,
    {
        let compressed = self.compress_async(input, options);
        Box::pin(async move { compressed.await.map(AsyncCursor::new) })
    }

    #[cfg(feature = "async")]
    fn decompress_async<'f, 'a: 'f, I>(&'f self, input: I, options: &Options) -> BoxFuture<'f, Result<Vec<u8>>>
    where
        I: AsyncInput<'a>,
    {
        let settings = options.resolve(self.settings());
        let mut reader = input.into_async_reader(options.leave_open);
        Box::pin(async move {
            let mut output = AsyncCursor::new(Vec::new());
            self.decode_async(&mut reader, &mut output, settings).await?;
            Ok(output.into_inner())
        })
    }

    #[cfg(feature = "async")]
    fn decompress_to_stream_async<'f, 'a: 'f, I>(
        &'f self,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<AsyncCursor<Vec<u8>>>>
    where
        I: AsyncInput<'a>,
    {
        let decompressed = self.decompress_async(input, options);
        Box::pin(async move { decompressed.await.map(AsyncCursor::new) })
    }
}

impl<C: Codec + ?Sized> CodecExt for C {}
