pub mod core;
pub mod orchestration;
pub mod plugins;
pub mod security;
pub mod validation;

pub use crate::core::*;
pub use orchestration::{BatchPublisher, RunReport};
pub use plugins::EngineLoader;
pub use security::{CommandError, Credentials, SafeCommandExecutor};
