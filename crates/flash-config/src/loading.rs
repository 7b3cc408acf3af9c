//! Layered configuration loading.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use path_clean::PathClean;
use serde::Serialize;

use crate::config::FlashConfig;
use crate::error::{ConfigError, Result};

/// Config file looked up in the project root when none is given.
pub const CONFIG_FILE_NAME: &str = "flash.config.json";

/// Prefix for environment overrides (`FLASH_PORT`, `FLASH_HMR_PORT`, ...).
pub const ENV_PREFIX: &str = "FLASH_";

/// Values supplied on the command line. `None` leaves lower layers intact.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmr_port: Option<u16>,

    /// Explicit config file; not a config field itself
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl FlashConfig {
    /// Load configuration from all sources.
    /// Priority: CLI overrides > environment variables > config file > defaults
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let base_root = overrides.root.clone().unwrap_or_else(|| cwd.clone());
        let base_root = absolutize(&cwd, &base_root);

        let mut figment = Figment::new().merge(Serialized::defaults(FlashConfig {
            root: base_root.clone(),
            ..FlashConfig::default()
        }));

        let config_file = match &overrides.config_file {
            Some(path) => {
                let path = absolutize(&cwd, path);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => {
                let default_path = base_root.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("Loading config file {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        let cli = ConfigOverrides {
            root: overrides.root.as_ref().map(|_| base_root.clone()),
            ..overrides.clone()
        };
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli));

        let mut config: FlashConfig = figment.extract().map_err(|e| {
            ConfigError::invalid(
                "configuration",
                e,
                "Check flash.config.json syntax and field types",
            )
        })?;

        // A relative root from the file or environment is taken relative to
        // the directory the lookup started in.
        config.root = absolutize(&base_root, &config.root);
        Ok(config)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path).clean()
    }
}
