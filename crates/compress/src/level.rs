//! Compression levels, codec settings and per-call options.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default buffer size used when copying between streams.
pub const DEFAULT_BUFFER_SIZE: NonZeroUsize = NonZeroUsize::new(81920).unwrap();

/// How much effort to spend compressing.
///
/// Only affects compression; data compressed at any level decompresses the
/// same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Store without compressing, where the format allows it.
    NoCompression,
    Fastest,
    /// The library's balanced default.
    #[default]
    Optimal,
    SmallestSize,
}

/// Configuration a codec is constructed with. Fixed for the lifetime of the
/// codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    pub level: Level,
    pub buffer_size: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self { level: Level::default(), buffer_size: DEFAULT_BUFFER_SIZE }
    }
}

impl Settings {
    #[must_use]
    pub fn new(level: Level, buffer_size: NonZeroUsize) -> Self {
        Self { level, buffer_size }
    }
}

/// Per-call overrides for a single compress/decompress operation.
///
/// Anything left unset falls back to the codec's own [`Settings`].
/// `leave_open` only matters for [`Closable`](crate::Closable) inputs: when
/// `false` (the default) the source stream is closed once the operation
/// finishes, whether it succeeded or not.
///
/// ```
/// use squash_compress::{Level, Options, Settings};
///
/// let options = Options::new().level(Level::Fastest).leave_open(true);
/// let resolved = options.resolve(&Settings::default());
/// assert_eq!(resolved.level, Level::Fastest);
/// assert_eq!(resolved.buffer_size.get(), 81920);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub level: Option<Level>,
    pub buffer_size: Option<NonZeroUsize>,
    pub leave_open: bool,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn buffer_size(mut self, buffer_size: NonZeroUsize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    #[must_use]
    pub fn leave_open(mut self, leave_open: bool) -> Self {
        self.leave_open = leave_open;
        self
    }

    /// Apply these overrides on top of a codec's defaults.
    #[must_use]
    pub fn resolve(&self, defaults: &Settings) -> Settings {
        Settings {
            level: self.level.unwrap_or(defaults.level),
            buffer_size: self.buffer_size.unwrap_or(defaults.buffer_size),
        }
    }
}
