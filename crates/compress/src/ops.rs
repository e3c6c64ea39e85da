//! Compression Operations

use crate::codec::StandardCodec;
use crate::error::{ErrorKind, Result};
use crate::stream::copy;
use crate::{CompressionType, Level, Settings};
#[cfg(feature = "brotli")]
use brotli::{CompressorWriter as BrotliEncoder, Decompressor as BrotliDecoder};
use exn::ResultExt;
use flate2::{Compression as FlateLevel, read::DeflateDecoder, read::GzDecoder, write::DeflateEncoder, write::GzEncoder};
#[cfg(feature = "snappy")]
use snap::{read::FrameDecoder as SnappyDecoder, write::FrameEncoder as SnappyEncoder};
use std::io::{Read, Write};
use tracing::instrument;
#[cfg(feature = "zstd")]
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

#[cfg(feature = "brotli")]
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

impl Level {
    /// `flate2` level (0-9), shared by Deflate and Gzip.
    pub(crate) fn flate(self) -> u32 {
        match self {
            Level::NoCompression => 0,
            Level::Fastest => 1,
            Level::Optimal => 6,
            Level::SmallestSize => 9,
        }
    }

    /// Brotli quality (0-11).
    pub(crate) fn brotli(self) -> u32 {
        match self {
            Level::NoCompression => 0,
            Level::Fastest => 1,
            Level::Optimal => 4,
            Level::SmallestSize => 11,
        }
    }

    /// Zstd level. Zstd has no "store" mode, so `NoCompression` maps to the
    /// fastest regular level.
    pub(crate) fn zstd(self) -> i32 {
        match self {
            Level::NoCompression | Level::Fastest => 1,
            Level::Optimal => 3,
            Level::SmallestSize => 22,
        }
    }
}

impl StandardCodec {
    #[instrument(skip(self, reader, writer, settings), fields(
        format = %self.kind,
        level = ?settings.level,
        input_size,
    ))]
    pub(crate) fn encode_into(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64> {
        let buffer_size = settings.buffer_size;
        let size = match self.kind {
            CompressionType::None => copy(reader, writer, buffer_size).or_raise(|| ErrorKind::Io)?,
            #[cfg(feature = "snappy")]
            CompressionType::Snappy => {
                let mut encoder = SnappyEncoder::new(&mut *writer);
                let size = copy(reader, &mut encoder, buffer_size).or_raise(|| ErrorKind::Io)?;
                encoder.flush().or_raise(|| ErrorKind::Io)?;
                size
            },
            CompressionType::Deflate => {
                let mut encoder = DeflateEncoder::new(&mut *writer, FlateLevel::new(settings.level.flate()));
                let size = copy(reader, &mut encoder, buffer_size).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                size
            },
            CompressionType::Gzip => {
                let mut encoder = GzEncoder::new(&mut *writer, FlateLevel::new(settings.level.flate()));
                let size = copy(reader, &mut encoder, buffer_size).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                size
            },
            #[cfg(feature = "zstd")]
            CompressionType::Zstd => {
                let mut encoder =
                    ZstdEncoder::new(&mut *writer, settings.level.zstd()).or_raise(|| ErrorKind::Encoder)?;
                let size = copy(reader, &mut encoder, buffer_size).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                size
            },
            #[cfg(feature = "brotli")]
            CompressionType::Brotli => {
                let mut encoder = BrotliEncoder::new(
                    &mut *writer,
                    buffer_size.get(),
                    settings.level.brotli(),
                    BROTLI_LG_WINDOW_SIZE,
                );
                let size = copy(reader, &mut encoder, buffer_size).or_raise(|| ErrorKind::Io)?;
                encoder.flush().or_raise(|| ErrorKind::Io)?;
                // Brotli has no fallible finish; the final metablock is written on drop.
                drop(encoder);
                size
            },
            #[allow(unreachable_patterns)]
            disabled => exn::bail!(ErrorKind::DisabledFormat(disabled.to_string())),
        };
        tracing::Span::current().record("input_size", size);
        Ok(size)
    }

    #[instrument(skip(self, reader, writer, settings), fields(format = %self.kind, output_size))]
    pub(crate) fn decode_into(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64> {
        let mut decoder = self.decoder(reader, settings)?;
        let size = copy(&mut decoder, writer, settings.buffer_size).or_raise(|| ErrorKind::InvalidData)?;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    /// Wrap a reader with the appropriate decompression layer.
    pub(crate) fn decoder<'a, R: Read + 'a>(&self, reader: R, settings: Settings) -> Result<Box<dyn Read + 'a>> {
        Ok(match self.kind {
            CompressionType::None => Box::new(reader),
            #[cfg(feature = "snappy")]
            CompressionType::Snappy => Box::new(SnappyDecoder::new(reader)),
            CompressionType::Deflate => Box::new(DeflateDecoder::new(reader)),
            CompressionType::Gzip => Box::new(GzDecoder::new(reader)),
            #[cfg(feature = "zstd")]
            CompressionType::Zstd => Box::new(ZstdDecoder::new(reader).or_raise(|| ErrorKind::Encoder)?),
            #[cfg(feature = "brotli")]
            CompressionType::Brotli => Box::new(BrotliDecoder::new(reader, settings.buffer_size.get())),
            #[allow(unreachable_patterns)]
            disabled => exn::bail!(ErrorKind::DisabledFormat(disabled.to_string())),
        })
    }
}
