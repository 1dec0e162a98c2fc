//! YAML provider configuration.
//!
//! # File layout
//!
//! ```yaml
//! # <config_dir>/caster/casters.yaml
//! json:
//!   pretty: false
//!   escape_unicode: false   # true writes `\u00e9` and `\/`
//! aliases:
//!   port: "trim|int"
//!   flag: "trim|bool"
//! ```
//!
//! # API pattern
//!
//! - `load_config_at(path)`: explicit path; used in tests with `TempDir`
//! - `load_config()`: resolves the path with `dirs::config_dir()`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use caster_core::{Caster, CasterProvider, ProviderError};

use crate::structured::{JsonCaster, JsonOptions};

/// Errors from loading configuration or applying it to a provider.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure other than a missing file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML, with path and serde_yaml's line context.
    #[error("failed to parse caster config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine the user configuration directory")]
    ConfigDirNotFound,

    /// The provider rejected a binding.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// An alias name or target was rejected by the provider.
    #[error("alias '{alias}': {source}")]
    Alias {
        alias: String,
        #[source]
        source: ProviderError,
    },
}

/// Provider settings read from `casters.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Options for the built-in `json` caster.
    pub json: JsonOptions,
    /// Simple names bound to pipe expressions, registered in file order.
    pub aliases: IndexMap<String, String>,
}

/// `<config_dir>/caster/casters.yaml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("caster").join("casters.yaml"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_at(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no caster config, using defaults");
            return Ok(ProviderConfig::default());
        }
        Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
    };
    if contents.trim().is_empty() {
        return Ok(ProviderConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `load_config_at` convenience wrapper.
pub fn load_config() -> Result<ProviderConfig, ConfigError> {
    load_config_at(&default_config_path()?)
}

/// Build the default provider, then apply `config`.
///
/// The `json` caster is rebuilt with the configured options. Each alias is
/// bound with [`CasterProvider::add_alias`] in file order, so an alias may
/// refer to an earlier alias and always follows its target's current binding.
pub fn provider_from_config(config: &ProviderConfig) -> Result<CasterProvider, ConfigError> {
    let provider = crate::default_provider();
    let json = config.json;
    provider.add_lazy(JsonCaster::NAME, move || Arc::new(JsonCaster::new(json)) as Arc<dyn Caster>)?;

    for (alias, target) in &config.aliases {
        provider
            .add_alias(alias.as_str(), target.as_str())
            .map_err(|source| ConfigError::Alias { alias: alias.clone(), source })?;
        debug!(alias = %alias, target = %target, "registered alias");
    }
    Ok(provider)
}
