//! Core traits and types for image building and publishing
//!
//! This module defines the container engine abstraction the builder and the
//! publisher drive, together with the request types passed through it.

use crate::security::command_executor::CommandError;
use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

// ============================================================================
// Image references
// ============================================================================

/// Fully-qualified image name: `namespace:tag`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub namespace: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(namespace: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.tag)
    }
}

// ============================================================================
// Build requests
// ============================================================================

/// Build argument carrying the version label
pub const VERSION_BUILD_ARG: &str = "VERSION";

/// Build argument carrying the content checksum
pub const CHECKSUM_BUILD_ARG: &str = "SHA256";

/// One image build: a single image tagged with every name in `images`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub version: String,
    pub checksum: String,
    pub images: Vec<ImageRef>,
    /// Isolated copy of the build-context template
    pub context_dir: PathBuf,
}

impl BuildRequest {
    /// `KEY=value` build arguments, in the order they are passed
    pub fn build_args(&self) -> Vec<String> {
        vec![
            format!("{}={}", VERSION_BUILD_ARG, self.version),
            format!("{}={}", CHECKSUM_BUILD_ARG, self.checksum),
        ]
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Outcome of one external engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: Option<i32>) -> Self {
        Self {
            success: false,
            code,
        }
    }
}

impl From<ExitStatus> for CommandOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Container engine that builds, logs in, and pushes
///
/// Implementations block until the external command finishes; callers
/// await every call before issuing the next one.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Engine name (e.g., "docker")
    fn name(&self) -> &str;

    /// Build one image inside `request.context_dir`
    async fn build(&self, request: &BuildRequest) -> Result<CommandOutcome, CommandError>;

    /// Log in to the registry
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CommandOutcome, CommandError>;

    /// Push one fully-qualified image
    async fn push(&self, image: &ImageRef) -> Result<CommandOutcome, CommandError>;
}
