//! Image Builder - builds one manifest entry into a multi-tagged image

use crate::core::error::BuildError;
use crate::core::traits::{BuildRequest, ContainerEngine, ImageRef};
use crate::orchestration::build_context::BuildContext;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds images from a context template through a container engine
pub struct ImageBuilder {
    engine: Arc<dyn ContainerEngine>,
    namespace: String,
    template: PathBuf,
    keep_context: bool,
}

impl ImageBuilder {
    /// Create a new ImageBuilder
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine that runs the build
    /// * `namespace` - Repository each tag is qualified in
    /// * `template` - Build-context template directory
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        namespace: impl Into<String>,
        template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            namespace: namespace.into(),
            template: template.into(),
            keep_context: false,
        }
    }

    /// Keep each build context on disk after the build
    pub fn keep_context(mut self, keep: bool) -> Self {
        self.keep_context = keep;
        self
    }

    /// Build `version` once, tagged with every tag in `tags`.
    ///
    /// `tags` must not be empty; the driver skips entries with no selected tags.
    ///
    /// # Returns
    ///
    /// The image names that now refer to the built image
    pub async fn build(
        &self,
        version: &str,
        checksum: &str,
        tags: &[String],
    ) -> Result<Vec<ImageRef>, BuildError> {
        debug_assert!(!tags.is_empty(), "build called without tags");

        let template = self.template.clone();
        let keep = self.keep_context;
        let context =
            tokio::task::spawn_blocking(move || BuildContext::materialize(&template, keep))
                .await
                .map_err(|e| BuildError::ContextCopy {
                    template: self.template.clone(),
                    source: std::io::Error::other(e),
                })??;

        if context.is_kept() {
            println!("   📁 Build context kept at {}", context.path().display());
        }

        let images: Vec<ImageRef> = tags
            .iter()
            .map(|tag| ImageRef::new(self.namespace.as_str(), tag.as_str()))
            .collect();

        let request = BuildRequest {
            version: version.to_string(),
            checksum: checksum.to_string(),
            images,
            context_dir: context.path().to_path_buf(),
        };

        tracing::info!(
            version,
            engine = self.engine.name(),
            context = %context.path().display(),
            tags = ?tags,
            "building image"
        );

        let outcome = self
            .engine
            .build(&request)
            .await
            .map_err(|source| BuildError::Command {
                version: version.to_string(),
                source,
            })?;

        if !outcome.success {
            return Err(BuildError::ToolFailed {
                version: version.to_string(),
                code: outcome.code,
            });
        }

        Ok(request.images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::test_support::{Call, FakeEngine, context_template};

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_build_qualifies_every_tag() {
        let template = context_template();
        let engine = Arc::new(FakeEngine::default());
        let builder = ImageBuilder::new(engine.clone(), "factoriotools/factorio", template.path());

        let images = builder
            .build("1.1.0", "abc", &tags(&["1.1.0", "stable"]))
            .await
            .unwrap();

        assert_eq!(
            images,
            vec![
                ImageRef::new("factoriotools/factorio", "1.1.0"),
                ImageRef::new("factoriotools/factorio", "stable"),
            ]
        );
        assert_eq!(
            engine.calls(),
            vec![Call::Build {
                version: "1.1.0".to_string(),
                checksum: "abc".to_string(),
                images: vec![
                    "factoriotools/factorio:1.1.0".to_string(),
                    "factoriotools/factorio:stable".to_string(),
                ],
                had_dockerfile: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_build_is_build_error() {
        let template = context_template();
        let engine = Arc::new(FakeEngine::failing_build("1.0.0"));
        let builder = ImageBuilder::new(engine, "factoriotools/factorio", template.path());

        let err = builder.build("1.0.0", "abc", &tags(&["1.0.0"])).await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::ToolFailed { ref version, code: Some(1) } if version == "1.0.0"
        ));
    }

    #[tokio::test]
    async fn test_missing_template_never_reaches_engine() {
        let engine = Arc::new(FakeEngine::default());
        let builder = ImageBuilder::new(engine.clone(), "ns/img", "/nonexistent/docker");

        let err = builder.build("1.0.0", "abc", &tags(&["1.0.0"])).await.unwrap_err();
        assert!(matches!(err, BuildError::ContextTemplateMissing { .. }));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_engine_spawn_failure_is_command_error() {
        use crate::plugins::CliEngine;

        let template = context_template();
        let builder = ImageBuilder::new(
            Arc::new(CliEngine::new("not-an-engine")),
            "ns/img",
            template.path(),
        );

        let err = builder.build("1.0.0", "abc", &tags(&["1.0.0"])).await.unwrap_err();
        assert!(matches!(err, BuildError::Command { .. }));
    }

    #[tokio::test]
    async fn test_kept_context_survives_engine_that_cannot_start() {
        let template = context_template();
        let engine = Arc::new(FakeEngine::unstartable());
        let builder =
            ImageBuilder::new(engine.clone(), "ns/img", template.path()).keep_context(true);

        let err = builder.build("1.0.0", "abc", &tags(&["1.0.0"])).await.unwrap_err();
        assert!(matches!(err, BuildError::Command { .. }));

        let contexts = engine.contexts();
        assert_eq!(contexts.len(), 1);
        assert!(contexts[0].join("Dockerfile").is_file());
        std::fs::remove_dir_all(&contexts[0]).unwrap();
    }

    #[tokio::test]
    async fn test_scoped_context_removed_after_engine_that_cannot_start() {
        let template = context_template();
        let engine = Arc::new(FakeEngine::unstartable());
        let builder = ImageBuilder::new(engine.clone(), "ns/img", template.path());

        builder.build("1.0.0", "abc", &tags(&["1.0.0"])).await.unwrap_err();
        assert!(!engine.contexts()[0].exists());
    }
}
