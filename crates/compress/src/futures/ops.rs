//! Async Compression Operations (feature-gated behind `async`)

use crate::codec::StandardCodec;
use crate::error::{ErrorKind, Result};
use crate::stream::drain_async;
use crate::{CompressionType, Level, Settings};
use async_compression::Level as AsyncLevel;
#[cfg(feature = "brotli")]
use async_compression::futures::{bufread::BrotliDecoder, write::BrotliEncoder};
use async_compression::futures::{bufread::DeflateDecoder, write::DeflateEncoder};
use async_compression::futures::{bufread::GzipDecoder, write::GzipEncoder};
#[cfg(feature = "zstd")]
use async_compression::futures::{bufread::ZstdDecoder, write::ZstdEncoder};
use exn::ResultExt;
use futures::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt};
use futures::io::{BufReader as AsyncBufReader, copy_buf as async_copy_buf};
use std::future::Future;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::pin::Pin;
use tracing::instrument;

type BoxAsyncRead<'a> = Box<dyn AsyncRead + Unpin + Send + 'a>;

impl Level {
    fn precise(quality: i32) -> AsyncLevel {
        AsyncLevel::Precise(quality)
    }

    fn async_flate(self) -> AsyncLevel {
        Self::precise(self.flate() as i32)
    }

    #[cfg(feature = "brotli")]
    fn async_brotli(self) -> AsyncLevel {
        Self::precise(self.brotli() as i32)
    }

    #[cfg(feature = "zstd")]
    fn async_zstd(self) -> AsyncLevel {
        Self::precise(self.zstd())
    }
}

/// Copy a buffered reader into a writer, then close the writer so that an
/// encoder flushes its trailer.
async fn pump<R, W>(reader: R, mut writer: W) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let size = async_copy_buf(reader, &mut writer).await.or_raise(|| ErrorKind::Io)?;
    writer.close().await.or_raise(|| ErrorKind::Io)?;
    Ok(size)
}

impl StandardCodec {
    #[instrument(skip(self, reader, writer, settings), fields(
        format = %self.kind,
        level = ?settings.level,
        input_size,
    ))]
    pub(crate) async fn async_encode_into(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64> {
        // `async-compression` only accepts buffered readers, and compression
        // formats are frame-based anyway, so always buffer the input.
        let mut reader = AsyncBufReader::with_capacity(settings.buffer_size.get(), reader);
        let level = settings.level;
        let size = match self.kind {
            CompressionType::None => pump(reader, &mut *writer).await?,
            #[cfg(feature = "snappy")]
            CompressionType::Snappy => {
                // No async Snappy encoder exists; encode in memory instead.
                let input = drain_async(&mut reader, settings.buffer_size).await?;
                let mut output = Vec::new();
                self.encode_into(&mut input.as_slice(), &mut output, settings)?;
                pump(output.as_slice(), &mut *writer).await?;
                input.len() as u64
            },
            CompressionType::Deflate => pump(reader, DeflateEncoder::with_quality(&mut *writer, level.async_flate())).await?,
            CompressionType::Gzip => pump(reader, GzipEncoder::with_quality(&mut *writer, level.async_flate())).await?,
            #[cfg(feature = "zstd")]
            CompressionType::Zstd => pump(reader, ZstdEncoder::with_quality(&mut *writer, level.async_zstd())).await?,
            #[cfg(feature = "brotli")]
            CompressionType::Brotli => {
                pump(reader, BrotliEncoder::with_quality(&mut *writer, level.async_brotli())).await?
            },
            #[allow(unreachable_patterns)]
            disabled => exn::bail!(ErrorKind::DisabledFormat(disabled.to_string())),
        };
        tracing::Span::current().record("input_size", size);
        Ok(size)
    }

    #[instrument(skip(self, reader, writer, settings), fields(format = %self.kind, output_size))]
    pub(crate) async fn async_decode_into(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64> {
        let decoder = self.async_decoder(reader, settings);
        let decoder = AsyncBufReader::with_capacity(settings.buffer_size.get(), decoder);
        let size = async_copy_buf(decoder, &mut *writer).await.or_raise(|| ErrorKind::InvalidData)?;
        writer.flush().await.or_raise(|| ErrorKind::Io)?;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    /// Wrap an async reader with the appropriate decompression layer.
    ///
    /// Does not fail like its sync counterpart: `async-compression` defers
    /// decoder errors until the first read.
    pub(crate) fn async_decoder<'a, R>(&self, reader: R, settings: Settings) -> BoxAsyncRead<'a>
    where
        R: AsyncRead + Unpin + Send + 'a,
    {
        let reader = AsyncBufReader::with_capacity(settings.buffer_size.get(), reader);
        match self.kind {
            CompressionType::None => Box::new(reader),
            #[cfg(feature = "snappy")]
            CompressionType::Snappy => self.buffered_decoder(reader, settings),
            CompressionType::Deflate => Box::new(DeflateDecoder::new(reader)),
            CompressionType::Gzip => Box::new(GzipDecoder::new(reader)),
            #[cfg(feature = "zstd")]
            CompressionType::Zstd => Box::new(ZstdDecoder::new(reader)),
            #[cfg(feature = "brotli")]
            CompressionType::Brotli => Box::new(BrotliDecoder::new(reader)),
            #[allow(unreachable_patterns)]
            _ => self.buffered_decoder(reader, settings),
        }
    }

    /// Decoder for formats without an async implementation: on first read,
    /// drain the source into memory and decode it with the sync decoder.
    fn buffered_decoder<'a, R>(&self, mut reader: R, settings: Settings) -> BoxAsyncRead<'a>
    where
        R: AsyncRead + Unpin + Send + 'a,
    {
        use futures::stream::{self, TryStreamExt};

        let codec = *self;
        let decoded: Pin<Box<dyn Future<Output = std::io::Result<Vec<u8>>> + Send + 'a>> = Box::pin(async move {
            let to_io = |err: crate::error::Error| IoError::new(IoErrorKind::InvalidData, (*err).clone());
            let input = drain_async(&mut reader, settings.buffer_size).await.map_err(to_io)?;
            let mut output = Vec::new();
            codec.decode_into(&mut input.as_slice(), &mut output, settings).map_err(to_io)?;
            Ok::<_, IoError>(output)
        });
        Box::new(stream::once(decoded).into_async_read())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Codec, CompressionType, Level, Settings, StandardCodec};
    use futures::io::{AsyncReadExt, Cursor};
    use rstest::rstest;

    const ORIGINAL: &[u8] = b"Hello, world! This is a test of async streaming compression.";

    fn codec(kind: CompressionType) -> StandardCodec {
        StandardCodec::new(kind, Settings::default()).unwrap()
    }

    #[tokio::test]
    #[rstest]
    #[case(CompressionType::None)]
    #[case(CompressionType::Deflate)]
    #[case(CompressionType::Gzip)]
    #[cfg_attr(feature = "snappy", case(CompressionType::Snappy))]
    #[cfg_attr(feature = "zstd", case(CompressionType::Zstd))]
    #[cfg_attr(feature = "brotli", case(CompressionType::Brotli))]
    async fn test_async_stream_roundtrip(#[case] kind: CompressionType) {
        let codec = codec(kind);

        let mut compressed = Cursor::new(Vec::new());
        let bytes_in = codec.encode_async(&mut Cursor::new(ORIGINAL), &mut compressed, Settings::default()).await.unwrap();
        assert_eq!(bytes_in, ORIGINAL.len() as u64);

        let compressed = compressed.into_inner();
        let mut decompressed = Cursor::new(Vec::new());
        let bytes_out =
            codec.decode_async(&mut Cursor::new(compressed), &mut decompressed, Settings::default()).await.unwrap();
        assert_eq!(bytes_out, ORIGINAL.len() as u64);
        assert_eq!(decompressed.into_inner(), ORIGINAL);
    }

    #[tokio::test]
    #[rstest]
    #[case(CompressionType::Deflate)]
    #[case(CompressionType::Gzip)]
    #[cfg_attr(feature = "snappy", case(CompressionType::Snappy))]
    #[cfg_attr(feature = "zstd", case(CompressionType::Zstd))]
    #[cfg_attr(feature = "brotli", case(CompressionType::Brotli))]
    async fn test_sync_and_async_interoperate(#[case] kind: CompressionType) {
        let codec = codec(kind);
        let settings = Settings { level: Level::SmallestSize, ..Settings::default() };

        let mut compressed = Vec::new();
        codec.encode(&mut &ORIGINAL[..], &mut compressed, settings).unwrap();

        let mut reader = codec.async_wrap_reader(Box::new(Cursor::new(compressed)));
        let mut decompressed = Vec::new();
        reader.read_to_end(&mut decompressed).await.unwrap();
        assert_eq!(decompressed, ORIGINAL);
    }

    #[tokio::test]
    #[rstest]
    #[case(CompressionType::Gzip)]
    #[cfg_attr(feature = "snappy", case(CompressionType::Snappy))]
    #[cfg_attr(feature = "zstd", case(CompressionType::Zstd))]
    async fn test_async_invalid_data(#[case] kind: CompressionType) {
        let mut output = Cursor::new(Vec::new());
        let result = codec(kind)
            .decode_async(&mut Cursor::new(b"This is not compressed data".to_vec()), &mut output, Settings::default())
            .await;
        assert!(result.is_err());
    }
}
