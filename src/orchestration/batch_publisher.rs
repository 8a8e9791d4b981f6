//! Batch Publisher - drives a whole run over the manifest
//!
//! Flow:
//! - Authenticate (only when publishing was requested)
//! - For each manifest entry: select tags, skip if none, build, push each tag
//!
//! Every step is awaited before the next starts. The first error ends the
//! run; earlier builds and pushes are not rolled back.

use crate::core::config::{PublisherConfig, RunConfig};
use crate::core::error::RunError;
use crate::core::manifest::Manifest;
use crate::core::traits::{ContainerEngine, ImageRef};
use crate::orchestration::image_builder::ImageBuilder;
use crate::orchestration::planner::{self, BuildPlan};
use crate::orchestration::registry_publisher::RegistryPublisher;
use crate::security::credentials::Credentials;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// One successfully built manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltVersion {
    pub version: String,
    pub images: Vec<ImageRef>,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Built entries, in build order
    pub built: Vec<BuiltVersion>,
    /// Pushed images, in push order
    pub pushed: Vec<ImageRef>,
    /// Versions with no selected tags
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Print run summary
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("📊 Build Summary");
        println!("{}", "=".repeat(60));

        println!("\n🐳 Built: {}", self.built.len());
        for built in &self.built {
            let tags: Vec<&str> = built.images.iter().map(|i| i.tag.as_str()).collect();
            println!("   - {} [{}]", built.version, tags.join(", "));
        }

        if !self.pushed.is_empty() {
            println!("\n📤 Pushed: {}", self.pushed.len());
            for image in &self.pushed {
                println!("   - {}", image);
            }
        }

        if !self.skipped.is_empty() {
            println!("\n⏭️  Skipped (no matching tags): {}", self.skipped.len());
            for version in &self.skipped {
                println!("   - {}", version);
            }
        }

        println!("\n{}", "=".repeat(60));
        println!("Finished in {}ms", self.duration_ms());
        println!("{}\n", "=".repeat(60));
    }
}

/// Drives builds and pushes for one run
pub struct BatchPublisher {
    config: PublisherConfig,
    builder: ImageBuilder,
    publisher: RegistryPublisher,
}

impl BatchPublisher {
    /// Create a new BatchPublisher
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine shared by the builder and the publisher
    /// * `config` - Resolved configuration
    pub fn new(engine: Arc<dyn ContainerEngine>, config: PublisherConfig) -> Self {
        let builder = ImageBuilder::new(
            Arc::clone(&engine),
            config.namespace.as_str(),
            config.context_dir.clone(),
        )
        .keep_context(config.keep_context);
        let publisher = RegistryPublisher::new(engine);

        Self {
            config,
            builder,
            publisher,
        }
    }

    /// Run the whole batch.
    ///
    /// `env` is consulted only when publishing, for the registry credentials.
    ///
    /// # Errors
    ///
    /// The first authentication, build, or push failure. Nothing after it runs.
    pub async fn run(
        &self,
        manifest: &Manifest,
        run: &RunConfig,
        env: &HashMap<String, String>,
    ) -> Result<RunReport, RunError> {
        let started_at = Utc::now();

        // Authentication comes first, even if nothing ends up matching.
        if run.should_publish {
            let credentials =
                Credentials::from_env(env, &self.config.username_env, &self.config.password_env)?;
            self.publisher.authenticate(credentials).await?;
        }

        let plan = planner::plan(manifest, run.requested_tags.as_deref());
        Self::announce(&plan, run);

        let mut built = Vec::with_capacity(plan.builds.len());
        let mut pushed = Vec::with_capacity(if run.should_publish {
            plan.tag_count()
        } else {
            0
        });

        for planned in &plan.builds {
            println!(
                "\n🐳 Building {} [{}]...",
                planned.version,
                planned.tags.join(", ")
            );

            let images = self
                .builder
                .build(&planned.version, &planned.checksum, &planned.tags)
                .await?;
            println!("   ✅ Built {}", planned.version);

            if run.should_publish {
                for image in &images {
                    self.publisher.publish(image).await?;
                    pushed.push(image.clone());
                }
            }

            built.push(BuiltVersion {
                version: planned.version.clone(),
                images,
            });
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            built,
            pushed,
            skipped: plan.skipped,
        })
    }

    fn announce(plan: &BuildPlan, run: &RunConfig) {
        for tag in &plan.unknown_tags {
            tracing::warn!(tag = tag.as_str(), "requested tag is not in the manifest");
            eprintln!("⚠️  Tag {} is not in the manifest", tag);
        }

        for version in &plan.skipped {
            tracing::debug!(version = version.as_str(), "no selected tags, skipping");
        }

        println!(
            "\n📦 {} image(s) to build{}",
            plan.builds.len(),
            if run.should_publish {
                format!(", {} tag(s) to push", plan.tag_count())
            } else {
                String::new()
            }
        );
    }
}
