//! Engine Loader - selects the container engine for a run
//!
//! # Example
//!
//! ```
//! use image_publisher::plugins::EngineLoader;
//!
//! let engine = EngineLoader::new().load("docker", true).unwrap();
//! assert_eq!(engine.name(), "docker");
//! ```

use crate::core::error::ConfigError;
use crate::core::traits::ContainerEngine;
use crate::plugins::cli_engine::CliEngine;
use crate::plugins::dry_run_engine::DryRunEngine;
use crate::security::command_executor::is_allowed_command;
use std::sync::Arc;

/// Supported engine type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    Docker,
    Podman,
}

impl EngineType {
    /// Get string representation of engine type
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::Docker => "docker",
            EngineType::Podman => "podman",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "docker" => Some(EngineType::Docker),
            "podman" => Some(EngineType::Podman),
            _ => None,
        }
    }
}

/// Loader for container engines
#[derive(Debug, Default)]
pub struct EngineLoader;

impl EngineLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load an engine by name
    ///
    /// With `dry_run` set, the returned engine only prints commands.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnsupportedEngine` for names other than `docker` and `podman`.
    pub fn load(&self, name: &str, dry_run: bool) -> Result<Arc<dyn ContainerEngine>, ConfigError> {
        let engine_type = EngineType::parse(name)
            .filter(|engine_type| is_allowed_command(engine_type.as_str()))
            .ok_or_else(|| ConfigError::UnsupportedEngine(name.to_string()))?;

        tracing::debug!(engine = engine_type.as_str(), dry_run, "engine selected");

        if dry_run {
            Ok(Arc::new(DryRunEngine::new(engine_type.as_str())))
        } else {
            Ok(Arc::new(CliEngine::new(engine_type.as_str())))
        }
    }
}
