//! Codec registry.

use crate::codec::{Codec, StandardCodec};
use crate::error::{ErrorKind, Result};
#[cfg(feature = "async")]
use crate::input::AsyncInput;
use crate::input::Input;
use crate::verbs::CodecExt;
use crate::{CompressionType, Options, Resolver, Settings};
use exn::OptionExt;
#[cfg(feature = "async")]
use futures::future::{self, BoxFuture};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Cursor;
use std::sync::Arc;

/// How a caller identifies the codec it wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Type(CompressionType),
    /// An encoding name, resolved through the provider's [`Resolver`].
    Name(&'a str),
}

impl From<CompressionType> for Lookup<'_> {
    fn from(kind: CompressionType) -> Self {
        Lookup::Type(kind)
    }
}

impl<'a> From<&'a str> for Lookup<'a> {
    fn from(name: &'a str) -> Self {
        Lookup::Name(name)
    }
}

impl Display for Lookup<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Lookup::Type(kind) => Display::fmt(kind, f),
            Lookup::Name(name) => f.write_str(name),
        }
    }
}

/// Maps each [`CompressionType`] to at most one live codec.
///
/// Built once, then shared read-only (typically behind an [`Arc`]); every
/// lookup borrows the registered instance rather than constructing a new one.
///
/// ```
/// use squash_compress::{CompressionProvider, CompressionType, Settings};
///
/// let provider = CompressionProvider::standard(Settings::default());
/// assert!(provider.get(CompressionType::Gzip).is_some());
/// assert!(provider.get_by_name("GZIP").is_some());
/// assert!(provider.get_by_name("lzma").is_none());
/// assert_eq!(provider.require_by_name("lzma").unwrap_err().requested(), Some("lzma"));
/// ```
#[derive(Clone, Debug)]
pub struct CompressionProvider {
    resolver: Resolver,
    codecs: BTreeMap<CompressionType, Arc<dyn Codec>>,
}

impl Default for CompressionProvider {
    fn default() -> Self {
        Self::standard(Settings::default())
    }
}

impl CompressionProvider {
    /// Register `codecs` with the default [`Resolver`].
    ///
    /// When several codecs report the same [`CompressionType`], the last one
    /// wins.
    pub fn new<I>(codecs: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Codec>>,
    {
        Self::with_resolver(Resolver::default(), codecs)
    }

    pub fn with_resolver<I>(resolver: Resolver, codecs: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Codec>>,
    {
        let mut registry = BTreeMap::new();
        for codec in codecs {
            let kind = codec.compression_type();
            if let Some(previous) = registry.insert(kind, codec) {
                tracing::debug!(format = %kind, ?previous, "replacing previously registered codec");
            }
        }
        tracing::debug!(codecs = registry.len(), "compression provider ready");
        Self { resolver, codecs: registry }
    }

    /// Every [`StandardCodec`] compiled into this build, sharing `settings`.
    pub fn standard(settings: Settings) -> Self {
        Self::new(StandardCodec::available(settings).map(|codec| Arc::new(codec) as Arc<dyn Codec>))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn get(&self, kind: CompressionType) -> Option<&Arc<dyn Codec>> {
        self.codecs.get(&kind)
    }

    /// Look up by integer tag. Tags outside the enumeration return `None`.
    pub fn get_by_tag(&self, tag: i32) -> Option<&Arc<dyn Codec>> {
        CompressionType::from_tag(tag).and_then(|kind| self.get(kind))
    }

    /// Look up by encoding name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<dyn Codec>> {
        self.resolver.resolve(name).and_then(|kind| self.get(kind))
    }

    /// Like [`get`](Self::get), but an unregistered type is an error.
    pub fn require(&self, kind: CompressionType) -> Result<&Arc<dyn Codec>> {
        self.lookup(kind)
    }

    /// Like [`get_by_name`](Self::get_by_name), but an unknown or unregistered
    /// name is an error carrying the name exactly as given.
    pub fn require_by_name(&self, name: &str) -> Result<&Arc<dyn Codec>> {
        self.lookup(name)
    }

    fn lookup<'k>(&self, key: impl Into<Lookup<'k>>) -> Result<&Arc<dyn Codec>> {
        let key = key.into();
        let codec = match key {
            Lookup::Type(kind) => self.get(kind),
            Lookup::Name(name) => self.get_by_name(name),
        };
        codec.ok_or_raise(|| ErrorKind::NotAvailable(key.to_string()))
    }

    /// Registered codecs in tag order.
    pub fn compressions(&self) -> impl Iterator<Item = &Arc<dyn Codec>> {
        self.codecs.values()
    }

    /// Wire names of the registered codecs, excluding `none`.
    pub fn encodings(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codecs.keys().filter(|kind| kind.is_wire_encoding()).map(|kind| kind.encoding_name())
    }

    /// The value to send as `Accept-Encoding`, e.g. `"snappy, deflate, gzip"`.
    pub fn accept_encoding(&self) -> String {
        self.encodings().collect::<Vec<_>>().join(", ")
    }

    pub fn compress<'a, 'k, I: Input<'a>>(
        &self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> Result<Vec<u8>> {
        self.lookup(key)?.compress(input, options)
    }

    pub fn compress_to_stream<'a, 'k, I: Input<'a>>(
        &self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> Result<Cursor<Vec<u8>>> {
        self.lookup(key)?.compress_to_stream(input, options)
    }

    pub fn decompress<'a, 'k, I: Input<'a>>(
        &self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> Result<Vec<u8>> {
        self.lookup(key)?.decompress(input, options)
    }

    pub fn decompress_to_stream<'a, 'k, I: Input<'a>>(
        &self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> Result<Cursor<Vec<u8>>> {
        self.lookup(key)?.decompress_to_stream(input, options)
    }

    /// Asynchronous [`compress`](Self::compress). A stream input is taken over
    /// before the lookup, so it is closed (unless left open) even when the
    /// lookup fails or the future is dropped without being polled.
    #[cfg(feature = "async")]
    pub fn compress_async<'f, 'a: 'f, 'k, I: AsyncInput<'a>>(
        &'f self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<Vec<u8>>> {
        let reader = input.into_async_reader(options.leave_open);
        match self.lookup(key) {
            Ok(codec) => codec.compress_async(reader, options),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    #[cfg(feature = "async")]
    pub fn compress_to_stream_async<'f, 'a: 'f, 'k, I: AsyncInput<'a>>(
        &'f self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<futures::io::Cursor<Vec<u8>>>> {
        let reader = input.into_async_reader(options.leave_open);
        match self.lookup(key) {
            Ok(codec) => codec.compress_to_stream_async(reader, options),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    #[cfg(feature = "async")]
    pub fn decompress_async<'f, 'a: 'f, 'k, I: AsyncInput<'a>>(
        &'f self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<Vec<u8>>> {
        let reader = input.into_async_reader(options.leave_open);
        match self.lookup(key) {
            Ok(codec) => codec.decompress_async(reader, options),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    #[cfg(feature = "async")]
    pub fn decompress_to_stream_async<'f, 'a: 'f, 'k, I: AsyncInput<'a>>(
        &'f self,
        key: impl Into<Lookup<'k>>,
        input: I,
        options: &Options,
    ) -> BoxFuture<'f, Result<futures::io::Cursor<Vec<u8>>>> {
        let reader = input.into_async_reader(options.leave_open);
        match self.lookup(key) {
            Ok(codec) => codec.decompress_to_stream_async(reader, options),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }
}
