use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{default_config_path, AnalyticsConfig};
use crate::error::{ErrorCode, EsgError, Result};

/// Resolves the effective configuration: file, then environment, then
/// validation
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    apply_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            apply_env: true,
        }
    }

    /// Read this file instead of the user-level one; it must exist
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.apply_env = false;
        self
    }

    pub async fn load(&self) -> Result<AnalyticsConfig> {
        let mut config = match &self.explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(EsgError::config_with_code(
                        ErrorCode::CONFIG_NOT_FOUND,
                        "Configuration file does not exist",
                        Some(path.clone()),
                    ));
                }
                Self::load_file(path).await?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path).await?,
                _ => {
                    debug!("No configuration file found, using defaults");
                    AnalyticsConfig::default()
                }
            },
        };

        if self.apply_env {
            config.merge_env_vars()?;
        }

        config.validate()?;
        Ok(config)
    }

    async fn load_file(path: &Path) -> Result<AnalyticsConfig> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            EsgError::config_with_code(
                ErrorCode::CONFIG_GENERIC,
                "Could not read configuration file",
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;

        AnalyticsConfig::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("in {}", path.display())))
    }
}
