//! Engine configuration and the providers that supply it
//!
//! The engine never stores plaintext: configuration carries only digests,
//! the enabled flag, the phrase length limit, and the replacement words used
//! by the scrubber. Where it comes from is up to the host; the engine only
//! asks a [`ConfigProvider`] for a fresh copy on initialize and reload.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::hash::{Digest, DigestSet};
use crate::ngram::DEFAULT_MAX_NGRAM;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max n-gram length must be at least 1")]
    InvalidMaxNgram,
    #[error("configuration unavailable: {0}")]
    Unavailable(String),
}

/// Configuration as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub enabled: bool,
    pub word_digests: Vec<Digest>,
    pub site_digests: Vec<Digest>,
    pub max_ngram: usize,
    pub replacements: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            word_digests: Vec::new(),
            site_digests: Vec::new(),
            max_ngram: DEFAULT_MAX_NGRAM,
            replacements: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Digests are validated while parsing.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ngram == 0 {
            return Err(ConfigError::InvalidMaxNgram);
        }
        Ok(())
    }

    pub fn word_set(&self) -> DigestSet {
        self.word_digests.iter().cloned().collect()
    }

    pub fn site_set(&self) -> DigestSet {
        self.site_digests.iter().cloned().collect()
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Source of engine configuration.
pub trait ConfigProvider {
    fn load(&self) -> Result<EngineConfig, ConfigError>;
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for Arc<P> {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        (**self).load()
    }
}

/// In-memory configuration that the host can replace between reloads.
#[derive(Debug, Default)]
pub struct StaticConfig {
    current: RwLock<EngineConfig>,
}

impl StaticConfig {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    /// Replace the configuration served by the next `load`.
    pub fn set(&self, config: EngineConfig) {
        match self.current.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

impl ConfigProvider for StaticConfig {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        let guard = self
            .current
            .read()
            .map_err(|_| ConfigError::Unavailable("configuration lock poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

/// Configuration read from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for JsonFileConfig {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        EngineConfig::from_json(&text)
    }
}
