// Detection Backend
// Registry-backed detection surface mirroring a real classifier deployment:
// models are loaded by path and kind, one is active, and `detect` refuses to
// run without one. The composite estimator is the current algorithm.

use crate::error::EngineError;
use crate::models::{DetectionModelKind, DetectionReport};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

use super::composite;

#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub id: String,
    pub kind: DetectionModelKind,
    pub path: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct HeuristicDetector {
    models: RwLock<HashMap<String, LoadedModel>>,
    active_model: RwLock<Option<String>>,
}

impl HeuristicDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detection model and make it active.
    /// The heuristic implementation validates nothing about the path; a real
    /// classifier backend would deserialize weights here.
    pub async fn load_model(
        &self,
        model_path: &str,
        kind: DetectionModelKind,
    ) -> Result<String, EngineError> {
        info!(path = model_path, kind = kind.as_str(), "detection.load_model");

        let model_id = format!("{}_{}", kind.as_str(), Utc::now().timestamp_millis());
        let model = LoadedModel {
            id: model_id.clone(),
            kind,
            path: model_path.to_string(),
            loaded_at: Utc::now(),
        };

        self.models
            .write()
            .map_err(|e| EngineError::Pipeline(format!("model registry poisoned: {e}")))?
            .insert(model_id.clone(), model);
        *self
            .active_model
            .write()
            .map_err(|e| EngineError::Pipeline(format!("model registry poisoned: {e}")))? =
            Some(model_id.clone());

        Ok(model_id)
    }

    /// Score a text. Fails with [`EngineError::NotReady`] until a model is
    /// loaded.
    pub async fn detect(&self, text: &str) -> Result<DetectionReport, EngineError> {
        if !self.is_model_loaded() {
            return Err(EngineError::NotReady);
        }
        Ok(composite::score(text))
    }

    /// Score a batch of texts in input order.
    pub async fn batch_detect(&self, texts: &[String]) -> Result<Vec<DetectionReport>, EngineError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.detect(text).await?);
        }
        Ok(results)
    }

    pub fn loaded_models(&self) -> Vec<LoadedModel> {
        self.models
            .read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_active_model(&self, model_id: &str) -> Result<(), EngineError> {
        let models = self
            .models
            .read()
            .map_err(|e| EngineError::Pipeline(format!("model registry poisoned: {e}")))?;
        if !models.contains_key(model_id) {
            return Err(EngineError::InvalidInput(format!("model {model_id} not found")));
        }
        drop(models);

        *self
            .active_model
            .write()
            .map_err(|e| EngineError::Pipeline(format!("model registry poisoned: {e}")))? =
            Some(model_id.to_string());
        Ok(())
    }

    pub fn unload_model(&self, model_id: &str) {
        if let Ok(mut models) = self.models.write() {
            models.remove(model_id);
        }
        if let Ok(mut active) = self.active_model.write() {
            if active.as_deref() == Some(model_id) {
                *active = None;
            }
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.active_model
            .read()
            .map(|a| a.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detect_requires_loaded_model() {
        let detector = HeuristicDetector::new();
        let err = detector.detect("some text").await.unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
    }

    #[tokio::test]
    async fn test_load_and_detect() {
        let detector = HeuristicDetector::new();
        detector
            .load_model("/models/det-v1.bin", DetectionModelKind::Statistical)
            .await
            .unwrap();
        assert!(detector.is_model_loaded());

        let report = detector.detect("yeah I don't think so, you know").await.unwrap();
        assert!(!report.is_machine_generated);
    }

    #[tokio::test]
    async fn test_unload_active_model_drops_readiness() {
        let detector = HeuristicDetector::new();
        let id = detector
            .load_model("/models/det-v1.bin", DetectionModelKind::Hybrid)
            .await
            .unwrap();
        detector.unload_model(&id);
        assert!(!detector.is_model_loaded());
        assert!(detector.detect("x").await.is_err());
    }

    #[tokio::test]
    async fn test_set_active_unknown_model() {
        let detector = HeuristicDetector::new();
        let err = detector.set_active_model("nope").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_batch_detect_preserves_order() {
        let detector = HeuristicDetector::new();
        detector
            .load_model("/models/det-v1.bin", DetectionModelKind::Neural)
            .await
            .unwrap();
        let texts = vec!["first text here".to_string(), "second text here".to_string()];
        let reports = detector.batch_detect(&texts).await.unwrap();
        assert_eq!(reports.len(), 2);
    }
}
