//! Layered configuration for squash codecs.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`CompressionConfig::default`])
//! 2. A configuration file (TOML, YAML or JSON, chosen by extension); when no
//!    path is given, `config.toml` in the platform configuration directory is
//!    used if it exists
//! 3. Environment variables prefixed with `SQUASH_` (`SQUASH_LEVEL=fastest`,
//!    `SQUASH_BUFFER_SIZE=4096`, `SQUASH_CODECS=[gzip,br]`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use squash_compress::{
    Codec, CompressionProvider, CompressionType, DEFAULT_BUFFER_SIZE, Level, Settings, StandardCodec,
};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_PREFIX: &str = "SQUASH_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Level used when a call does not specify one.
    pub level: Level,
    /// Size of the buffers used when copying between streams.
    pub buffer_size: NonZeroUsize,
    /// Codecs to register. `None` registers every codec in this build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codecs: Option<Vec<CompressionType>>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { level: Level::default(), buffer_size: DEFAULT_BUFFER_SIZE, codecs: None }
    }
}

impl CompressionConfig {
    /// Load from every source. See the [crate docs](crate) for precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// The layered sources, for callers that want to merge in their own.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.exists()),
        };
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = match path.extension().and_then(|extension| extension.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                _ => exn::bail!(ErrorKind::UnsupportedFile(path)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(level = ?config.level, buffer_size = config.buffer_size.get(), codecs = ?config.codecs, "configuration loaded");
        Ok(config)
    }

    /// `config.toml` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "squash").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn settings(&self) -> Settings {
        Settings::new(self.level, self.buffer_size)
    }

    /// Build a provider for the configured codecs. Listing a codec that this
    /// build does not include is an error rather than silently skipping it.
    pub fn provider(&self) -> Result<CompressionProvider> {
        let settings = self.settings();
        let Some(kinds) = &self.codecs else {
            return Ok(CompressionProvider::standard(settings));
        };
        let codecs = kinds
            .iter()
            .map(|kind| -> Result<Arc<dyn Codec>> {
                let codec = StandardCodec::new(*kind, settings).map_err(ErrorKind::codec)?;
                Ok(Arc::new(codec) as Arc<dyn Codec>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompressionProvider::new(codecs))
    }
}
