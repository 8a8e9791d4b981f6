//! Orchestration layer for image building and publishing
//!
//! This module provides the components that turn a manifest and a tag
//! selection into builds and pushes.

pub mod batch_publisher;
pub mod build_context;
pub mod image_builder;
pub mod planner;
pub mod registry_publisher;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use batch_publisher::{BatchPublisher, BuiltVersion, RunReport};
pub use build_context::BuildContext;
pub use image_builder::ImageBuilder;
pub use planner::{BuildPlan, PlannedBuild, plan};
pub use registry_publisher::RegistryPublisher;
