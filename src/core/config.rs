//! Configuration structures and types for image-publisher
//!
//! This module provides type-safe configuration management with serde support.

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_NAMESPACE: &str = "factoriotools/factorio";
pub const DEFAULT_MANIFEST: &str = "buildinfo.json";
pub const DEFAULT_CONTEXT_DIR: &str = "docker";
pub const DEFAULT_ENGINE: &str = "docker";
pub const DEFAULT_USERNAME_ENV: &str = "DOCKER_USERNAME";
pub const DEFAULT_PASSWORD_ENV: &str = "DOCKER_PASSWORD";

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Repository every tag is qualified in (e.g. `factoriotools/factorio`)
    pub namespace: String,

    /// Path of the build manifest
    pub manifest: PathBuf,

    /// Build-context template directory, copied once per build
    pub context_dir: PathBuf,

    /// Container engine program
    pub engine: String,

    /// Environment variable holding the registry username
    pub username_env: String,

    /// Environment variable holding the registry password
    pub password_env: String,

    /// Keep build contexts on disk after each build
    pub keep_context: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            context_dir: PathBuf::from(DEFAULT_CONTEXT_DIR),
            engine: DEFAULT_ENGINE.to_string(),
            username_env: DEFAULT_USERNAME_ENV.to_string(),
            password_env: DEFAULT_PASSWORD_ENV.to_string(),
            keep_context: false,
        }
    }
}

impl PublisherConfig {
    /// Apply every field that is set in `overrides`
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(namespace) = overrides.namespace {
            self.namespace = namespace;
        }
        if let Some(manifest) = overrides.manifest {
            self.manifest = manifest;
        }
        if let Some(context_dir) = overrides.context_dir {
            self.context_dir = context_dir;
        }
        if let Some(engine) = overrides.engine {
            self.engine = engine;
        }
        if let Some(username_env) = overrides.username_env {
            self.username_env = username_env;
        }
        if let Some(password_env) = overrides.password_env {
            self.password_env = password_env;
        }
        if let Some(keep_context) = overrides.keep_context {
            self.keep_context = keep_context;
        }
    }
}

/// Partial configuration from one source (config file, environment, CLI)
///
/// The config file `.image-publisher.yaml` deserializes straight into this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub namespace: Option<String>,

    pub manifest: Option<PathBuf>,

    pub context_dir: Option<PathBuf>,

    pub engine: Option<String>,

    pub username_env: Option<String>,

    pub password_env: Option<String>,

    pub keep_context: Option<bool>,
}

/// Per-run selection derived from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Tags to act on; `None` selects every tag in the manifest
    pub requested_tags: Option<Vec<String>>,

    /// Authenticate and push after building
    pub should_publish: bool,

    /// Print engine commands instead of running them
    pub dry_run: bool,
}
