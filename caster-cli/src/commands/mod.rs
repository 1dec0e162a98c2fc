pub mod cast;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use caster_builtins::config::{default_config_path, load_config_at, ProviderConfig};
use caster_builtins::provider_from_config;
use caster_core::CasterProvider;

/// Build the provider from `--config`, or from the default config file when
/// one can be located.
pub fn load_provider(config: Option<&Path>) -> Result<CasterProvider> {
    let path: Option<PathBuf> = match config {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().ok(),
    };
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading caster config");
            load_config_at(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => ProviderConfig::default(),
    };
    provider_from_config(&config).context("failed to apply caster config")
}
