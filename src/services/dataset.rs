// Dataset Collaborator
// Narrow write/read contract for paragraph records keyed by an opaque
// dataset id. Schema ownership lives outside the core; the in-memory store
// exists for tests and single-process use.

use crate::error::EngineError;
use crate::models::ParagraphRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait ParagraphStore: Send + Sync {
    async fn put_paragraphs(
        &self,
        dataset_id: &str,
        records: Vec<ParagraphRecord>,
    ) -> Result<usize, EngineError>;

    async fn get_paragraphs(&self, dataset_id: &str) -> Result<Vec<ParagraphRecord>, EngineError>;
}

/// Validate a paragraph record before ingestion. Mirrors the bounds the
/// analysis pipeline guarantees on its own output.
pub fn validate_paragraph(record: &ParagraphRecord) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let text = record.original_text.trim();
    if text.is_empty() {
        errors.push("Original text is required".to_string());
    }
    if !text.is_empty() && record.original_text.len() < 20 {
        errors.push("Text must be at least 20 characters long".to_string());
    }
    if record.original_text.len() > 2000 {
        errors.push("Text must not exceed 2000 characters".to_string());
    }

    if record.category.is_none() {
        errors.push("Category is required".to_string());
    }

    if let Some(complexity) = record.complexity_score {
        if !(1.0..=10.0).contains(&complexity) {
            errors.push("Complexity score must be between 1 and 10".to_string());
        }
    }
    if let Some(quality) = record.quality_score {
        if !(0.0..=1.0).contains(&quality) {
            errors.push("Quality score must be between 0 and 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Default)]
pub struct MemoryParagraphStore {
    datasets: RwLock<HashMap<String, Vec<ParagraphRecord>>>,
}

impl MemoryParagraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParagraphStore for MemoryParagraphStore {
    async fn put_paragraphs(
        &self,
        dataset_id: &str,
        records: Vec<ParagraphRecord>,
    ) -> Result<usize, EngineError> {
        for record in &records {
            validate_paragraph(record)
                .map_err(|errors| EngineError::InvalidInput(errors.join("; ")))?;
        }

        let mut datasets = self.datasets.write().await;
        let stored = datasets.entry(dataset_id.to_string()).or_default();
        stored.extend(records);
        Ok(stored.len())
    }

    async fn get_paragraphs(&self, dataset_id: &str) -> Result<Vec<ParagraphRecord>, EngineError> {
        let datasets = self.datasets.read().await;
        Ok(datasets.get(dataset_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TextCategory;

    fn record(text: &str) -> ParagraphRecord {
        ParagraphRecord {
            original_text: text.to_string(),
            category: Some(TextCategory::General),
            style_tags: vec![],
            complexity_score: Some(4.0),
            quality_score: Some(0.7),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_record() {
        assert!(validate_paragraph(&record("A paragraph that is long enough to pass.")).is_ok());
    }

    #[test]
    fn test_validate_rejects_short_text() {
        let errors = validate_paragraph(&record("too short")).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("20 characters")));
    }

    #[test]
    fn test_validate_rejects_out_of_range_scores() {
        let mut bad = record("A paragraph that is long enough to pass.");
        bad.complexity_score = Some(11.0);
        bad.quality_score = Some(1.5);
        let errors = validate_paragraph(&bad).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_requires_category() {
        let mut bad = record("A paragraph that is long enough to pass.");
        bad.category = None;
        assert!(validate_paragraph(&bad).is_err());
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = MemoryParagraphStore::new();
        store
            .put_paragraphs("ds-1", vec![record("A paragraph that is long enough to pass.")])
            .await
            .unwrap();
        let records = store.get_paragraphs("ds-1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(store.get_paragraphs("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_batch() {
        let store = MemoryParagraphStore::new();
        let err = store
            .put_paragraphs("ds-1", vec![record("nope")])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
