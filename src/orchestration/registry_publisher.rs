//! Registry Publisher - logs in once and pushes built tags

use crate::core::error::{AuthError, PublishError};
use crate::core::traits::{ContainerEngine, ImageRef};
use crate::security::credentials::Credentials;
use std::sync::Arc;

pub struct RegistryPublisher {
    engine: Arc<dyn ContainerEngine>,
}

impl RegistryPublisher {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    /// Log in to the registry.
    ///
    /// Takes ownership of the credentials; they are dropped as soon as the
    /// login command returns.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<(), AuthError> {
        println!("🔐 Logging in to registry as {}...", credentials.username());
        tracing::info!(username = credentials.username(), "registry login");

        let outcome = self
            .engine
            .login(credentials.username(), credentials.password())
            .await
            .map_err(AuthError::Command)?;
        drop(credentials);

        if !outcome.success {
            return Err(AuthError::LoginRejected { code: outcome.code });
        }

        println!("   ✅ Logged in");
        Ok(())
    }

    /// Push one fully-qualified image
    pub async fn publish(&self, image: &ImageRef) -> Result<(), PublishError> {
        println!("📤 Pushing {}...", image);
        tracing::info!(%image, engine = self.engine.name(), "pushing image");

        let outcome = self
            .engine
            .push(image)
            .await
            .map_err(|source| PublishError::Command {
                image: image.to_string(),
                source,
            })?;

        if !outcome.success {
            return Err(PublishError::PushFailed {
                image: image.to_string(),
                code: outcome.code,
            });
        }

        println!("   ✅ Pushed {}", image);
        Ok(())
    }
}
