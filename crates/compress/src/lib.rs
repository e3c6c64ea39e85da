//! Compression and decompression behind one codec contract.
//!
//! This crate wraps several compression libraries behind a closed
//! [`CompressionType`] enum and a [`Codec`] trait, providing:
//!
//! - **Name resolution** from wire-level encoding tokens (`"br"`, `"gzip"`,
//!   ...) via an injectable [`Resolver`]
//! - **Codec adapters** ([`StandardCodec`]) configured with a compression
//!   [`Level`] and buffer size ([`Settings`])
//! - **One operation per verb** ([`CodecExt::compress`],
//!   [`CodecExt::decompress`], and their `_to_stream` and `_async`
//!   variants) over strings, byte buffers and [`Closable`] streams
//! - **A provider** ([`CompressionProvider`]) mapping each type to at most one
//!   live codec, with optional and required lookups
//!
//! Deflate and Gzip are always available. Optional formats (Brotli, Snappy,
//! Zstd) are behind feature flags, but every [`CompressionType`] variant exists
//! regardless: a disabled format is simply never registered. Async
//! counterparts require the `async` feature and use
//! [`futures`](::futures::io) traits (not Tokio).

mod codec;
mod construct;
pub mod error;
#[cfg(feature = "async")]
mod futures;
mod input;
mod level;
mod ops;
mod provider;
mod resolver;
pub mod stream;
mod util;
mod verbs;

pub use crate::codec::{Codec, StandardCodec};
#[cfg(feature = "async")]
pub use crate::input::AsyncInput;
pub use crate::input::Input;
pub use crate::level::{DEFAULT_BUFFER_SIZE, Level, Options, Settings};
pub use crate::provider::{CompressionProvider, Lookup};
pub use crate::resolver::Resolver;
pub use crate::stream::Closable;
pub use crate::verbs::CodecExt;

use serde::{Deserialize, Serialize};

/// A compression format, identified by a stable integer tag.
///
/// The set is closed and does not depend on enabled features; whether a codec
/// for a variant is actually available is decided by [`StandardCodec::new`]
/// and the [`CompressionProvider`]. Defaults to [`None`](Self::None)
/// (uncompressed), which is a first-class, always-resolvable type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionType {
    /// Uncompressed, internal only
    #[default]
    None = 0,
    /// Snappy, framed format
    Snappy = 1,
    /// Raw DEFLATE
    Deflate = 2,
    /// Gzip
    Gzip = 3,
    /// Zstandard
    #[serde(alias = "zstandard")]
    Zstd = 4,
    /// Brotli
    #[serde(alias = "br")]
    Brotli = 5,
}

impl CompressionType {
    /// Every variant, in tag order.
    pub const ALL: [CompressionType; 6] = [
        CompressionType::None,
        CompressionType::Snappy,
        CompressionType::Deflate,
        CompressionType::Gzip,
        CompressionType::Zstd,
        CompressionType::Brotli,
    ];
}
