// Generation Backend
// Opaque capability standing in front of the actual text-generation model.
// The engine only uses it as a readiness gate; loading/inference is the one
// legitimate suspension point per request.

use crate::models::ModelLoadConfig;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Load the model described by `config`. Must complete before any
    /// humanization request is accepted.
    async fn initialize(&self, config: &ModelLoadConfig) -> anyhow::Result<()>;
}

/// Default backend: accepts any configuration and reports ready. The
/// rule-based rewriter performs the transformation, so there is nothing to
/// load; a real model loader plugs in behind the same trait.
#[derive(Default)]
pub struct LocalGenerationBackend;

#[async_trait]
impl GenerationBackend for LocalGenerationBackend {
    async fn initialize(&self, config: &ModelLoadConfig) -> anyhow::Result<()> {
        info!(
            model_path = %config.model_path,
            device = %config.device,
            "generation.initialize"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backend_initializes() {
        let backend = LocalGenerationBackend;
        let config = ModelLoadConfig {
            model_path: "/models/gen-v1".to_string(),
            device: "cpu".to_string(),
        };
        assert!(backend.initialize(&config).await.is_ok());
    }
}
