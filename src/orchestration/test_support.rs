//! Recording container engine for orchestration tests

use crate::core::traits::{BuildRequest, CommandOutcome, ContainerEngine, ImageRef};
use crate::security::command_executor::CommandError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build {
        version: String,
        checksum: String,
        images: Vec<String>,
        /// The context held a Dockerfile while the build ran
        had_dockerfile: bool,
    },
    Login {
        username: String,
        password: String,
    },
    Push {
        image: String,
    },
}

#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<Call>>,
    contexts: Mutex<Vec<PathBuf>>,
    fail_build_for: Option<String>,
    fail_login: bool,
    fail_push_for: Option<String>,
    unstartable: bool,
}

impl FakeEngine {
    /// Engine whose build of `version` exits non-zero
    pub fn failing_build(version: &str) -> Self {
        Self {
            fail_build_for: Some(version.to_string()),
            ..Default::default()
        }
    }

    /// Engine that rejects every login
    pub fn failing_login() -> Self {
        Self {
            fail_login: true,
            ..Default::default()
        }
    }

    /// Engine whose push of `tag` exits non-zero
    pub fn failing_push(tag: &str) -> Self {
        Self {
            fail_push_for: Some(tag.to_string()),
            ..Default::default()
        }
    }

    /// Engine whose commands can never be started
    pub fn unstartable() -> Self {
        Self {
            unstartable: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn builds(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Build { .. }))
            .collect()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Push { image } => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn logins(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Login { .. }))
            .count()
    }

    /// Build-context directories handed to `build`, in call order
    pub fn contexts(&self) -> Vec<PathBuf> {
        self.contexts.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn build(&self, request: &BuildRequest) -> Result<CommandOutcome, CommandError> {
        self.record(Call::Build {
            version: request.version.clone(),
            checksum: request.checksum.clone(),
            images: request.images.iter().map(ToString::to_string).collect(),
            had_dockerfile: request.context_dir.join("Dockerfile").is_file(),
        });
        self.contexts.lock().unwrap().push(request.context_dir.clone());
        if self.unstartable {
            return Err(CommandError::ExecutionFailed("fake engine not found".to_string()));
        }
        if self.fail_build_for.as_deref() == Some(request.version.as_str()) {
            return Ok(CommandOutcome::failed(Some(1)));
        }
        Ok(CommandOutcome::succeeded())
    }

    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CommandOutcome, CommandError> {
        self.record(Call::Login {
            username: username.to_string(),
            password: password.expose_secret().to_string(),
        });
        if self.fail_login {
            return Ok(CommandOutcome::failed(Some(1)));
        }
        Ok(CommandOutcome::succeeded())
    }

    async fn push(&self, image: &ImageRef) -> Result<CommandOutcome, CommandError> {
        self.record(Call::Push {
            image: image.to_string(),
        });
        if self.fail_push_for.as_deref() == Some(image.tag.as_str()) {
            return Ok(CommandOutcome::failed(Some(1)));
        }
        Ok(CommandOutcome::succeeded())
    }
}

/// Build-context template holding a single Dockerfile
pub fn context_template() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_dockerfile(dir.path());
    dir
}

fn write_dockerfile(dir: &Path) {
    fs::write(
        dir.join("Dockerfile"),
        "FROM debian:stable-slim\nARG VERSION\nARG SHA256\n",
    )
    .unwrap();
}
