use crate::CompressionType;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for CompressionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.encoding_name())
    }
}

impl AsRef<str> for CompressionType {
    fn as_ref(&self) -> &'static str {
        self.encoding_name()
    }
}

impl CompressionType {
    /// Returns the canonical lowercase wire token for this format, as used in
    /// `Content-Encoding` and `Accept-Encoding` headers.
    #[inline]
    #[must_use]
    pub fn encoding_name(&self) -> &'static str {
        match self {
            CompressionType::None => "none",
            CompressionType::Snappy => "snappy",
            CompressionType::Deflate => "deflate",
            CompressionType::Gzip => "gzip",
            CompressionType::Zstd => "zstd",
            CompressionType::Brotli => "br",
        }
    }

    /// Stable integer tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Whether this format may appear on an outbound HTTP header. `none` is
    /// internal only.
    #[inline]
    #[must_use]
    pub fn is_wire_encoding(&self) -> bool {
        !matches!(self, CompressionType::None)
    }
}
