pub mod cli_engine;
pub mod dry_run_engine;
pub mod engine_loader;

pub use cli_engine::CliEngine;
pub use dry_run_engine::DryRunEngine;
pub use engine_loader::{EngineLoader, EngineType};
