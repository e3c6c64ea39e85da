//! The codec contract and the built-in adapter.

use crate::error::{ErrorKind, Result};
use crate::{CompressionType, Settings};
#[cfg(feature = "async")]
use futures::io::{AsyncRead, AsyncWrite};
use std::fmt::Debug;
use std::io::{Read, Write};

/// A configured adapter for one compression algorithm.
///
/// Implementations must not mutate shared state while encoding or decoding:
/// the [`Settings`] are fixed at construction, and a single instance is shared
/// by every caller of a [`CompressionProvider`](crate::CompressionProvider).
///
/// The methods here are the low-level primitives (reader in, writer out).
/// Most callers want the verbs on [`CodecExt`](crate::CodecExt), which every
/// codec gets for free.
#[cfg_attr(feature = "async", async_trait::async_trait)]
pub trait Codec: Debug + Send + Sync {
    fn compression_type(&self) -> CompressionType;

    /// The wire token this codec is advertised as.
    fn encoding_name(&self) -> &'static str {
        self.compression_type().encoding_name()
    }

    /// Defaults applied when a call does not override them.
    fn settings(&self) -> &Settings;

    /// Compress everything from `reader` into `writer`, returning the number
    /// of uncompressed bytes consumed.
    fn encode(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64>;

    /// Decompress everything from `reader` into `writer`, returning the number
    /// of decompressed bytes produced. Must accept input compressed at any
    /// [`Level`](crate::Level).
    fn decode(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64>;

    /// Wrap a reader with this codec's streaming decoder.
    fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>>;

    /// Async counterpart of [`encode`](Self::encode). The writer is closed
    /// once the compressed stream is finalized.
    #[cfg(feature = "async")]
    async fn encode_async(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64>;

    /// Async counterpart of [`decode`](Self::decode).
    #[cfg(feature = "async")]
    async fn decode_async(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64>;

    /// Async counterpart of [`wrap_reader`](Self::wrap_reader).
    #[cfg(feature = "async")]
    fn async_wrap_reader<'a>(
        &self,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Box<dyn AsyncRead + Unpin + Send + 'a>;
}

/// The built-in [`Codec`] for every [`CompressionType`], backed by `flate2`,
/// `brotli`, `snap` and `zstd`.
///
/// ```
/// use squash_compress::{Codec, CompressionType, Settings, StandardCodec};
///
/// let codec = StandardCodec::new(CompressionType::Gzip, Settings::default()).unwrap();
/// assert_eq!(codec.encoding_name(), "gzip");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardCodec {
    pub(crate) kind: CompressionType,
    pub(crate) settings: Settings,
}

impl StandardCodec {
    /// Create an adapter for `kind`. Fails with
    /// [`DisabledFormat`](ErrorKind::DisabledFormat) when support for the
    /// format was not compiled in.
    pub fn new(kind: CompressionType, settings: Settings) -> Result<Self> {
        if !Self::is_enabled(kind) {
            exn::bail!(ErrorKind::DisabledFormat(kind.to_string()));
        }
        Ok(Self { kind, settings })
    }

    /// Whether this build includes an adapter for `kind`.
    #[must_use]
    pub fn is_enabled(kind: CompressionType) -> bool {
        match kind {
            CompressionType::None | CompressionType::Deflate | CompressionType::Gzip => true,
            CompressionType::Snappy => cfg!(feature = "snappy"),
            CompressionType::Zstd => cfg!(feature = "zstd"),
            CompressionType::Brotli => cfg!(feature = "brotli"),
        }
    }

    /// One adapter per format enabled in this build, in tag order, all sharing
    /// the same settings.
    pub fn available(settings: Settings) -> impl Iterator<Item = Self> {
        CompressionType::ALL
            .into_iter()
            .filter(|kind| Self::is_enabled(*kind))
            .map(move |kind| Self { kind, settings })
    }
}

#[cfg_attr(feature = "async", async_trait::async_trait)]
impl Codec for StandardCodec {
    fn compression_type(&self) -> CompressionType {
        self.kind
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn encode(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64> {
        self.encode_into(reader, writer, settings)
    }

    fn decode(&self, reader: &mut dyn Read, writer: &mut dyn Write, settings: Settings) -> Result<u64> {
        self.decode_into(reader, writer, settings)
    }

    fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        self.decoder(reader, self.settings)
    }

    #[cfg(feature = "async")]
    async fn encode_async(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64> {
        self.async_encode_into(reader, writer, settings).await
    }

    #[cfg(feature = "async")]
    async fn decode_async(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        settings: Settings,
    ) -> Result<u64> {
        self.async_decode_into(reader, writer, settings).await
    }

    #[cfg(feature = "async")]
    fn async_wrap_reader<'a>(
        &self,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Box<dyn AsyncRead + Unpin + Send + 'a> {
        self.async_decoder(reader, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CompressionType::None)]
    #[case(CompressionType::Deflate)]
    #[case(CompressionType::Gzip)]
    #[cfg_attr(feature = "snappy", case(CompressionType::Snappy))]
    #[cfg_attr(feature = "zstd", case(CompressionType::Zstd))]
    #[cfg_attr(feature = "brotli", case(CompressionType::Brotli))]
    fn test_new_enabled(#[case] kind: CompressionType) {
        let codec = StandardCodec::new(kind, Settings::default()).unwrap();
        assert_eq!(codec.compression_type(), kind);
        assert_eq!(codec.encoding_name(), kind.encoding_name());
        assert_eq!(codec.settings(), &Settings::default());
    }

    #[cfg(not(feature = "snappy"))]
    #[test]
    fn test_new_disabled() {
        let err = StandardCodec::new(CompressionType::Snappy, Settings::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::DisabledFormat("snappy".to_string()));
    }

    #[test]
    fn test_available_in_tag_order() {
        let kinds: Vec<_> = StandardCodec::available(Settings::default()).map(|c| c.compression_type()).collect();
        assert!(kinds.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(kinds.contains(&CompressionType::None));
        assert!(kinds.contains(&CompressionType::Gzip));
        assert!(kinds.contains(&CompressionType::Deflate));
        assert_eq!(kinds.len(), CompressionType::ALL.iter().filter(|k| StandardCodec::is_enabled(**k)).count());
    }
}
