//! CLI Engine - drives the `docker` (or `podman`) command line
//!
//! Commands issued:
//! - `build --build-arg VERSION=.. --build-arg SHA256=.. -t <image>... .` inside the build context
//! - `login -u <user> --password-stdin` with the password on stdin
//! - `push <image>`

use crate::core::traits::{BuildRequest, CommandOutcome, ContainerEngine, ImageRef};
use crate::security::command_executor::{CommandError, SafeCommandExecutor};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

/// Container engine backed by an external CLI program
#[derive(Debug, Clone)]
pub struct CliEngine {
    program: String,
}

impl CliEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for the build command
    pub fn build_args(request: &BuildRequest) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        for build_arg in request.build_args() {
            args.push("--build-arg".to_string());
            args.push(build_arg);
        }
        for image in &request.images {
            args.push("-t".to_string());
            args.push(image.to_string());
        }
        args.push(".".to_string());
        args
    }

    /// Arguments for the login command; the password is sent on stdin
    pub fn login_args(username: &str) -> Vec<String> {
        vec![
            "login".to_string(),
            "-u".to_string(),
            username.to_string(),
            "--password-stdin".to_string(),
        ]
    }

    /// Arguments for the push command
    pub fn push_args(image: &ImageRef) -> Vec<String> {
        vec!["push".to_string(), image.to_string()]
    }

    async fn run_in(
        &self,
        dir: PathBuf,
        args: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutcome, CommandError> {
        let executor = SafeCommandExecutor::new(dir)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let status = executor.run(&self.program, &args, stdin).await?;
        Ok(status.into())
    }

    fn current_dir() -> Result<PathBuf, CommandError> {
        std::env::current_dir().map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl ContainerEngine for CliEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn build(&self, request: &BuildRequest) -> Result<CommandOutcome, CommandError> {
        self.run_in(request.context_dir.clone(), &Self::build_args(request), None)
            .await
    }

    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CommandOutcome, CommandError> {
        self.run_in(
            Self::current_dir()?,
            &Self::login_args(username),
            Some(password.expose_secret().as_bytes()),
        )
        .await
    }

    async fn push(&self, image: &ImageRef) -> Result<CommandOutcome, CommandError> {
        self.run_in(Self::current_dir()?, &Self::push_args(image), None)
            .await
    }
}
