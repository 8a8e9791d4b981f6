//! Error handling for image building and publishing
//!
//! Every component has its own error enum. All of them are fatal to the run:
//! the driver stops at the first one and the binary exits with status 1.

use crate::security::command_executor::CommandError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the build manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Manifest {origin} is invalid:\n  - {}", .errors.join("\n  - "))]
    Invalid { origin: String, errors: Vec<String> },
}

/// Errors raised while authenticating against the registry
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username and password need to be given ({variable} is not set)")]
    MissingCredentials { variable: String },

    #[error("{variable} is set but its value is not valid UTF-8")]
    NotUnicode { variable: String },

    #[error("Registry login failed{}", exit_suffix(.code))]
    LoginRejected { code: Option<i32> },

    #[error("Registry login could not be started: {0}")]
    Command(#[source] CommandError),
}

/// Errors raised while building an image
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Build context template not found: {}", .path.display())]
    ContextTemplateMissing { path: PathBuf },

    #[error("Failed to prepare build context from {}: {source}", .template.display())]
    ContextCopy {
        template: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build of image {version} failed{}", exit_suffix(.code))]
    ToolFailed { version: String, code: Option<i32> },

    #[error("Build of image {version} could not be started: {source}")]
    Command {
        version: String,
        #[source]
        source: CommandError,
    },
}

/// Errors raised while pushing a tag
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Push of {image} failed{}", exit_suffix(.code))]
    PushFailed { image: String, code: Option<i32> },

    #[error("Push of {image} could not be started: {source}")]
    Command {
        image: String,
        #[source]
        source: CommandError,
    },
}

/// Errors raised while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported container engine: {0}")]
    UnsupportedEngine(String),
}

/// Any error that terminates a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => " (terminated by signal)".to_string(),
    }
}

impl RunError {
    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::Read { .. }) => "CONFIG_READ_FAILED",
            Self::Config(ConfigError::Parse { .. }) => "CONFIG_PARSE_FAILED",
            Self::Config(ConfigError::UnsupportedEngine(_)) => "UNSUPPORTED_ENGINE",
            Self::Manifest(ManifestError::NotFound { .. }) => "MANIFEST_NOT_FOUND",
            Self::Manifest(ManifestError::Read { .. }) => "MANIFEST_READ_FAILED",
            Self::Manifest(ManifestError::Parse { .. }) => "MANIFEST_PARSE_FAILED",
            Self::Manifest(ManifestError::Invalid { .. }) => "MANIFEST_INVALID",
            Self::Auth(AuthError::MissingCredentials { .. }) => "MISSING_CREDENTIALS",
            Self::Auth(AuthError::NotUnicode { .. }) => "CREDENTIALS_NOT_UNICODE",
            Self::Auth(AuthError::LoginRejected { .. }) => "LOGIN_REJECTED",
            Self::Auth(AuthError::Command(_)) => "LOGIN_COMMAND_ERROR",
            Self::Build(BuildError::ContextTemplateMissing { .. }) => "CONTEXT_TEMPLATE_MISSING",
            Self::Build(BuildError::ContextCopy { .. }) => "CONTEXT_COPY_FAILED",
            Self::Build(BuildError::ToolFailed { .. }) => "BUILD_FAILED",
            Self::Build(BuildError::Command { .. }) => "BUILD_COMMAND_ERROR",
            Self::Publish(PublishError::PushFailed { .. }) => "PUSH_FAILED",
            Self::Publish(PublishError::Command { .. }) => "PUSH_COMMAND_ERROR",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::Config(ConfigError::UnsupportedEngine(_)) => {
                vec!["Use --engine docker or --engine podman"]
            }
            Self::Config(_) => vec!["Check .image-publisher.yaml for YAML syntax errors"],
            Self::Manifest(ManifestError::NotFound { .. }) => vec![
                "Run from the directory containing buildinfo.json",
                "Pass --manifest to point at the manifest explicitly",
            ],
            Self::Manifest(ManifestError::Invalid { .. }) => vec![
                "Make every tag unique across the manifest",
                "Tags may only contain letters, digits, '_', '.' and '-'",
            ],
            Self::Manifest(_) => vec![
                "Check that the manifest is a JSON object of version -> {sha256, tags}",
            ],
            Self::Auth(AuthError::MissingCredentials { .. }) => vec![
                "Export DOCKER_USERNAME and DOCKER_PASSWORD before using --push-tags",
            ],
            Self::Auth(AuthError::NotUnicode { .. }) => {
                vec!["Re-export the credential variable as plain UTF-8 text"]
            }
            Self::Auth(_) => vec![
                "Check the registry username and password",
                "Check that the container engine is installed and running",
            ],
            Self::Build(BuildError::ContextTemplateMissing { .. }) => {
                vec!["Pass --context-dir pointing at the directory holding the Dockerfile"]
            }
            Self::Build(_) => vec![
                "Check the build output above",
                "Verify the sha256 in the manifest matches the release archive",
            ],
            Self::Publish(_) => vec![
                "Check the push output above",
                "Check network connectivity to the registry",
            ],
        }
    }
}
