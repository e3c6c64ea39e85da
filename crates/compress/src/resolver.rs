//! Encoding name resolution.

use crate::CompressionType;
use std::collections::HashMap;

/// Aliases accepted in addition to each format's canonical encoding name.
const ALIASES: [(&str, CompressionType); 2] = [("brotli", CompressionType::Brotli), ("zstandard", CompressionType::Zstd)];

/// Maps case-insensitive encoding names to a [`CompressionType`].
///
/// An immutable value: build it once (at startup, or as part of a
/// [`CompressionProvider`](crate::CompressionProvider)) and pass it around by
/// reference. Names are compared ordinally after ASCII lowercasing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolver {
    names: HashMap<String, CompressionType>,
}

impl Default for Resolver {
    /// The six canonical encoding names plus the `brotli` and `zstandard`
    /// aliases.
    fn default() -> Self {
        Self::with_names(Self::defaults())
    }
}

impl Resolver {
    /// Build a resolver from caller-supplied `(name, type)` pairs only.
    ///
    /// When the same name (case-insensitively) appears more than once, the
    /// **last** occurrence in iteration order wins.
    ///
    /// ```
    /// use squash_compress::{CompressionType, Resolver};
    ///
    /// let resolver = Resolver::with_names([
    ///     ("GZIP", CompressionType::Deflate),
    ///     ("gzip", CompressionType::Gzip),
    /// ]);
    /// assert_eq!(resolver.resolve("Gzip"), Some(CompressionType::Gzip));
    /// assert_eq!(resolver.resolve("br"), None);
    /// ```
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (S, CompressionType)>,
        S: AsRef<str>,
    {
        let pairs: Vec<(String, CompressionType)> =
            names.into_iter().map(|(name, kind)| (name.as_ref().to_ascii_lowercase(), kind)).collect();
        // Group by key and take the last of each group: walking backwards, the
        // first entry seen for a key is the last one supplied.
        let mut names = HashMap::with_capacity(pairs.len());
        for (name, kind) in pairs.into_iter().rev() {
            names.entry(name).or_insert(kind);
        }
        Self { names }
    }

    /// The default table, extended (and possibly overridden) by
    /// caller-supplied pairs. Last occurrence wins, as in
    /// [`with_names`](Self::with_names).
    pub fn extended<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (S, CompressionType)>,
        S: AsRef<str>,
    {
        let extra = names.into_iter().map(|(name, kind)| (name.as_ref().to_string(), kind));
        let defaults = Self::defaults().map(|(name, kind)| (name.to_string(), kind));
        Self::with_names(defaults.chain(extra))
    }

    /// Resolve an encoding name. Unknown (or empty) names return `None`; it is
    /// up to the caller whether that is fatal.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<CompressionType> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of registered names, aliases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn defaults() -> impl Iterator<Item = (&'static str, CompressionType)> {
        CompressionType::ALL.into_iter().map(|kind| (kind.encoding_name(), kind)).chain(ALIASES)
    }
}
