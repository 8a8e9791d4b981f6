//! Dry-run engine - prints the commands a real engine would run

use crate::core::traits::{BuildRequest, CommandOutcome, ContainerEngine, ImageRef};
use crate::plugins::cli_engine::CliEngine;
use crate::security::command_executor::CommandError;
use async_trait::async_trait;
use secrecy::SecretString;

/// Engine that reports success without executing anything
#[derive(Debug, Clone)]
pub struct DryRunEngine {
    program: String,
}

impl DryRunEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    /// Login command line; the password is always shown as a fixed placeholder
    fn login_line(&self, username: &str) -> String {
        format!(
            "{} <<< ****",
            self.command_line(&CliEngine::login_args(username))
        )
    }
}

#[async_trait]
impl ContainerEngine for DryRunEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn build(&self, request: &BuildRequest) -> Result<CommandOutcome, CommandError> {
        println!(
            "   [dry-run] (in {}) {}",
            request.context_dir.display(),
            self.command_line(&CliEngine::build_args(request))
        );
        Ok(CommandOutcome::succeeded())
    }

    async fn login(
        &self,
        username: &str,
        _password: &SecretString,
    ) -> Result<CommandOutcome, CommandError> {
        println!("   [dry-run] {}", self.login_line(username));
        Ok(CommandOutcome::succeeded())
    }

    async fn push(&self, image: &ImageRef) -> Result<CommandOutcome, CommandError> {
        println!(
            "   [dry-run] {}",
            self.command_line(&CliEngine::push_args(image))
        );
        Ok(CommandOutcome::succeeded())
    }
}
