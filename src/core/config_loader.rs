//! Configuration file loader for image-publisher
//!
//! This module provides configuration loading and merging capabilities.

use super::config::*;
use crate::core::error::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".image-publisher.yaml";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Project path to load config from; relative paths resolve against it
    pub project_path: PathBuf,

    /// CLI arguments (highest priority)
    pub cli_args: Option<ConfigOverrides>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.image-publisher.yaml)
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PublisherConfig, ConfigError> {
        let mut config = PublisherConfig::default();

        if let Some(project_config) = Self::load_project_config(&options.project_path).await? {
            config.apply(project_config);
        }

        config.apply(Self::load_env_config(&options.env));

        if let Some(cli_config) = options.cli_args {
            config.apply(cli_config);
        }

        config.manifest = Self::resolve(&options.project_path, &config.manifest);
        config.context_dir = Self::resolve(&options.project_path, &config.context_dir);

        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Load project configuration from ./.image-publisher.yaml
    async fn load_project_config(
        project_path: &Path,
    ) -> Result<Option<ConfigOverrides>, ConfigError> {
        let path = project_path.join(CONFIG_FILENAME);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        // An empty file is valid and changes nothing
        if content.trim().is_empty() {
            return Ok(Some(ConfigOverrides::default()));
        }

        let overrides = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(Some(overrides))
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> ConfigOverrides {
        ConfigOverrides {
            namespace: env.get("IMAGE_PUBLISHER_NAMESPACE").cloned(),
            engine: env.get("IMAGE_PUBLISHER_ENGINE").cloned(),
            keep_context: env
                .get("IMAGE_PUBLISHER_KEEP_CONTEXT")
                .map(|value| value == "true"),
            ..Default::default()
        }
    }

    fn resolve(project_path: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_path.join(path)
        }
    }
}
