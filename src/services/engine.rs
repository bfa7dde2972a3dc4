// Humanization Engine
// Top-level request workflow: validate, consult the result cache, run
// analyze -> plan -> rewrite -> score, record the session, return a result.
// The engine is the only stateful component; analyzer, selector, rewriter
// and scorers are pure functions over their inputs.

use crate::error::EngineError;
use crate::models::{
    CacheEntry, HumanizationRequest, HumanizationResult, ModelLoadConfig, Pattern, Session,
    SessionStatus,
};
use crate::services::backend::GenerationBackend;
use crate::services::cache::{cache_key, ResultCache, DEFAULT_CACHE_CAPACITY};
use crate::services::detection::heuristics;
use crate::services::rewriter::{self, RandomSource, ThreadRandom};
use crate::services::{analyzer, patterns};
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub struct HumanizerEngine {
    backend: Arc<dyn GenerationBackend>,
    catalog: Vec<Pattern>,
    model_ready: AtomicBool,
    sessions: RwLock<HashMap<String, Session>>,
    cache: Mutex<ResultCache>,
    cache_ttl: Option<Duration>,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl HumanizerEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            catalog: patterns::default_patterns(),
            model_ready: AtomicBool::new(false),
            sessions: RwLock::new(HashMap::new()),
            cache: Mutex::new(ResultCache::new(DEFAULT_CACHE_CAPACITY)),
            cache_ttl: None,
            rng: Mutex::new(Box::new(ThreadRandom)),
        }
    }

    /// Swap in an alternate pattern catalog.
    pub fn with_catalog(mut self, catalog: Vec<Pattern>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Swap in an alternate entropy source (seeded or fixed for tests).
    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Mutex::new(ResultCache::new(capacity));
        self
    }

    /// Entries written after this call expire `ttl_seconds` after caching.
    pub fn with_cache_ttl(mut self, ttl_seconds: i64) -> Self {
        self.cache_ttl = Some(Duration::seconds(ttl_seconds));
        self
    }

    /// Load the generation model. Must complete before `humanize` accepts
    /// requests; this is the pipeline's suspension point.
    pub async fn initialize(&self, config: &ModelLoadConfig) -> Result<(), EngineError> {
        self.backend.initialize(config).await?;
        self.model_ready.store(true, Ordering::SeqCst);
        info!(model_path = %config.model_path, "engine.model_ready");
        Ok(())
    }

    /// Drop readiness; subsequent requests fail with NotReady until the
    /// next initialize.
    pub fn shutdown(&self) {
        self.model_ready.store(false, Ordering::SeqCst);
        info!("engine.shutdown");
    }

    pub fn is_ready(&self) -> bool {
        self.model_ready.load(Ordering::SeqCst)
    }

    /// Run one humanization request end to end.
    pub async fn humanize(
        &self,
        request: HumanizationRequest,
    ) -> Result<HumanizationResult, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotReady);
        }
        validate_request(&request)?;

        let session_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        self.create_session(&session_id, &request)?;
        self.update_session(&session_id, |s| s.status = SessionStatus::Processing)?;

        info!(
            session_id = %session_id,
            input_chars = request.input_text.len(),
            use_cache = request.use_cache,
            "humanize.start"
        );

        // Cache consult uses the exact key composition used for writing
        let key = cache_key(&request);
        if request.use_cache {
            let cached = self
                .cache
                .lock()
                .ok()
                .and_then(|mut cache| cache.get(&key));
            if let Some(entry) = cached {
                let elapsed_ms = started.elapsed().as_millis() as i64;
                self.update_session(&session_id, |s| {
                    s.status = SessionStatus::Completed;
                    s.output_text = Some(entry.output_text.clone());
                    s.detection_score_before = Some(entry.detection_score_before);
                    s.detection_score_after = Some(entry.detection_score_after);
                    s.quality_score = Some(entry.quality_score);
                    s.elapsed_ms = Some(elapsed_ms);
                })?;
                info!(session_id = %session_id, "humanize.cache_hit");

                return Ok(HumanizationResult {
                    session_id,
                    output_text: entry.output_text,
                    detection_score_before: entry.detection_score_before,
                    detection_score_after: entry.detection_score_after,
                    quality_score: entry.quality_score,
                    elapsed_ms,
                    applied_patterns: entry.applied_patterns,
                    cache_hit: true,
                    metadata: request.metadata,
                });
            }
        }

        match self.run_pipeline(&session_id, &request) {
            Ok(output) => {
                if request.use_cache {
                    // Last-writer-wins; a racing identical request may also
                    // write, either fill is acceptable
                    let entry = CacheEntry {
                        output_text: output.output_text.clone(),
                        detection_score_before: output.score_before,
                        detection_score_after: output.score_after,
                        quality_score: output.quality,
                        applied_patterns: output.applied_patterns.clone(),
                        cached_at: Utc::now(),
                        expires_at: self.cache_ttl.map(|ttl| Utc::now() + ttl),
                    };
                    if let Ok(mut cache) = self.cache.lock() {
                        cache.insert(key, entry);
                    } else {
                        warn!(session_id = %session_id, "humanize.cache_write_skipped");
                    }
                }

                let elapsed_ms = started.elapsed().as_millis() as i64;
                self.update_session(&session_id, |s| {
                    s.status = SessionStatus::Completed;
                    s.output_text = Some(output.output_text.clone());
                    s.detection_score_before = Some(output.score_before);
                    s.detection_score_after = Some(output.score_after);
                    s.quality_score = Some(output.quality);
                    s.elapsed_ms = Some(elapsed_ms);
                })?;
                info!(
                    session_id = %session_id,
                    score_before = output.score_before,
                    score_after = output.score_after,
                    quality = output.quality,
                    elapsed_ms,
                    "humanize.completed"
                );

                Ok(HumanizationResult {
                    session_id,
                    output_text: output.output_text,
                    detection_score_before: output.score_before,
                    detection_score_after: output.score_after,
                    quality_score: output.quality,
                    elapsed_ms,
                    applied_patterns: output.applied_patterns,
                    cache_hit: false,
                    metadata: request.metadata,
                })
            }
            Err(EngineError::Cancelled) => {
                // cancel_session already made the record terminal
                warn!(session_id = %session_id, "humanize.cancelled");
                Err(EngineError::Cancelled)
            }
            Err(err) => {
                let message = err.to_string();
                let recorded = self.update_session(&session_id, |s| {
                    s.status = SessionStatus::Failed;
                    s.error_message = Some(message.clone());
                });
                if recorded.is_err() {
                    warn!(session_id = %session_id, "humanize.session_write_failed");
                }
                warn!(session_id = %session_id, error = %message, "humanize.failed");
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        session_id: &str,
        request: &HumanizationRequest,
    ) -> Result<PipelineOutput, EngineError> {
        let features = analyzer::analyze(&request.input_text);
        self.update_session(session_id, |s| {
            s.input_category = Some(features.suggested_category)
        })?;
        let score_before = heuristics::estimate(&request.input_text);
        self.check_cancelled(session_id)?;

        // Explicit pattern list bypasses selection entirely
        let applied_patterns = match &request.selected_patterns {
            Some(names) => names.clone(),
            None => {
                let target_complexity = request
                    .target_complexity
                    .unwrap_or(features.complexity_score);
                let plan = patterns::select_plan(
                    &request.input_text,
                    features.suggested_category.as_str(),
                    target_complexity,
                    &self.catalog,
                );
                plan.selected_patterns.iter().map(|p| p.name.clone()).collect()
            }
        };
        self.check_cancelled(session_id)?;

        let output_text = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|e| EngineError::Pipeline(format!("random source poisoned: {e}")))?;
            rewriter::apply(
                &request.input_text,
                request.target_style,
                request.target_complexity,
                rng.as_mut(),
            )
        };
        self.check_cancelled(session_id)?;

        let score_after = heuristics::estimate(&output_text);
        let quality = quality_score(&request.input_text, &output_text);

        Ok(PipelineOutput {
            output_text,
            score_before,
            score_after,
            quality,
            applied_patterns,
        })
    }

    /// Flip a non-terminal session to cancelled. The owning pipeline
    /// observes the status at its next checkpoint and aborts with no
    /// further side effects. A cancel landing after the final checkpoint
    /// does not retract the result: the caller still receives it and any
    /// cache fill stands, while the session record reads Cancelled.
    /// Returns false if the session is unknown or already terminal.
    pub fn cancel_session(&self, session_id: &str) -> bool {
        let Ok(mut sessions) = self.sessions.write() else {
            return false;
        };
        match sessions.get_mut(session_id) {
            Some(session) if !session.status.is_terminal() => {
                session.status = SessionStatus::Cancelled;
                session.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    pub fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions
            .read()
            .ok()
            .and_then(|s| s.get(session_id).cloned())
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.sessions
            .read()
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn create_session(
        &self,
        session_id: &str,
        request: &HumanizationRequest,
    ) -> Result<(), EngineError> {
        let now = Utc::now();
        let session = Session {
            id: session_id.to_string(),
            model_version_id: request.model_version_id.clone(),
            input_text: request.input_text.clone(),
            output_text: None,
            input_category: None,
            target_style: request.target_style,
            target_complexity: request.target_complexity,
            selected_patterns: request.selected_patterns.clone(),
            detection_score_before: None,
            detection_score_after: None,
            quality_score: None,
            elapsed_ms: None,
            status: SessionStatus::Pending,
            error_message: None,
            metadata: request.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| EngineError::Pipeline(format!("session store poisoned: {e}")))?;
        sessions.insert(session_id.to_string(), session);
        Ok(())
    }

    /// Apply `mutate` unless the session already reached a terminal state.
    fn update_session(
        &self,
        session_id: &str,
        mutate: impl FnOnce(&mut Session),
    ) -> Result<(), EngineError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| EngineError::Pipeline(format!("session store poisoned: {e}")))?;
        if let Some(session) = sessions.get_mut(session_id) {
            if session.status.is_terminal() {
                return Ok(());
            }
            mutate(session);
            session.updated_at = Utc::now();
        }
        Ok(())
    }

    fn check_cancelled(&self, session_id: &str) -> Result<(), EngineError> {
        let cancelled = self
            .sessions
            .read()
            .ok()
            .and_then(|s| s.get(session_id).map(|s| s.status == SessionStatus::Cancelled))
            .unwrap_or(false);
        if cancelled {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

struct PipelineOutput {
    output_text: String,
    score_before: f64,
    score_after: f64,
    quality: f64,
    applied_patterns: Vec<String>,
}

fn validate_request(request: &HumanizationRequest) -> Result<(), EngineError> {
    if request.input_text.trim().is_empty() {
        return Err(EngineError::InvalidInput("input text is empty".to_string()));
    }
    if let Some(complexity) = request.target_complexity {
        if !(1.0..=10.0).contains(&complexity) {
            return Err(EngineError::InvalidInput(format!(
                "target complexity {complexity} outside [1, 10]"
            )));
        }
    }
    Ok(())
}

/// Heuristic rewrite-quality score: length preservation, vocabulary overlap
/// with the original, and lexical-variety improvement. [0, 1].
pub fn quality_score(original: &str, rewritten: &str) -> f64 {
    let mut quality: f64 = 0.5;

    if !original.is_empty() {
        let length_ratio = rewritten.len() as f64 / original.len() as f64;
        if (0.8..=1.2).contains(&length_ratio) {
            quality += 0.2;
        }
    }

    let original_lower = original.to_lowercase();
    let rewritten_lower = rewritten.to_lowercase();
    let original_words: HashSet<&str> = original_lower.split_whitespace().collect();
    let rewritten_words: HashSet<&str> = rewritten_lower.split_whitespace().collect();
    if !original_words.is_empty() {
        let overlap = original_words.intersection(&rewritten_words).count() as f64;
        quality += (overlap / original_words.len() as f64) * 0.2;
    }

    if type_token_ratio(&rewritten_lower) > type_token_ratio(&original_lower) {
        quality += 0.1;
    }

    quality.clamp(0.0, 1.0)
}

fn type_token_ratio(lower: &str) -> f64 {
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().copied().collect();
    unique.len() as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::LocalGenerationBackend;
    use crate::services::rewriter::test_support::FixedSequence;
    use crate::models::TargetStyle;

    fn load_config() -> ModelLoadConfig {
        ModelLoadConfig {
            model_path: "/models/gen-v1".to_string(),
            device: "cpu".to_string(),
        }
    }

    fn engine() -> HumanizerEngine {
        HumanizerEngine::new(Arc::new(LocalGenerationBackend))
            .with_random_source(Box::new(FixedSequence::new(vec![0.99])))
    }

    async fn ready_engine() -> HumanizerEngine {
        let engine = engine();
        engine.initialize(&load_config()).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_not_ready_creates_no_session() {
        let engine = engine();
        let err = engine.humanize(HumanizationRequest::new("some text")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
        assert!(engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let engine = ready_engine().await;
        let err = engine.humanize(HumanizationRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_complexity_rejected() {
        let engine = ready_engine().await;
        let mut request = HumanizationRequest::new("valid text here");
        request.target_complexity = Some(12.0);
        let err = engine.humanize(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_completed_session_has_output_fields() {
        let engine = ready_engine().await;
        let mut request = HumanizationRequest::new("This is very good and it's a big improvement.");
        request.target_style = Some(TargetStyle::Casual);

        let result = engine.humanize(request).await.unwrap();
        assert!(!result.cache_hit);
        assert!((0.0..=1.0).contains(&result.detection_score_before));
        assert!((0.0..=1.0).contains(&result.detection_score_after));
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert!(result.output_text.contains("it's"));

        let session = engine.session(&result.session_id).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.output_text.as_deref(), Some(result.output_text.as_str()));
        assert!(session.detection_score_before.is_some());
        assert!(session.input_category.is_some());
    }

    #[tokio::test]
    async fn test_sequential_cache_hit_matches_first_result() {
        let engine = ready_engine().await;
        let request = HumanizationRequest::new("The research demonstrates a very good outcome.");

        let first = engine.humanize(request.clone()).await.unwrap();
        let second = engine.humanize(request).await.unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.output_text, second.output_text);
        assert_eq!(first.detection_score_before, second.detection_score_before);
        assert_eq!(first.detection_score_after, second.detection_score_after);
        assert_eq!(first.quality_score, second.quality_score);
        assert_eq!(first.applied_patterns, second.applied_patterns);
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn test_use_cache_false_skips_cache() {
        let engine = ready_engine().await;
        let mut request = HumanizationRequest::new("Some text to process without caching.");
        request.use_cache = false;

        let first = engine.humanize(request.clone()).await.unwrap();
        let second = engine.humanize(request).await.unwrap();
        assert!(!first.cache_hit);
        assert!(!second.cache_hit);
        assert_eq!(engine.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_explicit_patterns_bypass_selection() {
        let engine = ready_engine().await;
        let mut request = HumanizationRequest::new("The system is very good.");
        request.selected_patterns = Some(vec!["Contractions Usage".to_string()]);

        let result = engine.humanize(request).await.unwrap();
        assert_eq!(result.applied_patterns, vec!["Contractions Usage".to_string()]);
    }

    #[tokio::test]
    async fn test_metadata_echoed() {
        let engine = ready_engine().await;
        let mut request = HumanizationRequest::new("Echo this metadata back.");
        request.metadata.insert("caller".to_string(), serde_json::json!("test"));

        let result = engine.humanize(request).await.unwrap();
        assert_eq!(result.metadata.get("caller"), Some(&serde_json::json!("test")));
    }

    #[tokio::test]
    async fn test_shutdown_drops_readiness() {
        let engine = ready_engine().await;
        assert!(engine.is_ready());
        engine.shutdown();
        let err = engine.humanize(HumanizationRequest::new("text")).await.unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
    }

    /// Parks the pipeline at its first entropy draw until released, so a
    /// test can cancel the request while it is in flight.
    struct ParkedRandom {
        started: std::sync::mpsc::Sender<()>,
        release: std::sync::mpsc::Receiver<()>,
        parked: bool,
    }

    impl RandomSource for ParkedRandom {
        fn next_f64(&mut self) -> f64 {
            if !self.parked {
                self.parked = true;
                let _ = self.started.send(());
                let _ = self.release.recv();
            }
            0.99
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_in_flight_leaves_cancelled_session_and_no_cache_entry() {
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let engine = Arc::new(
            HumanizerEngine::new(Arc::new(LocalGenerationBackend)).with_random_source(Box::new(
                ParkedRandom {
                    started: started_tx,
                    release: release_rx,
                    parked: false,
                },
            )),
        );
        engine.initialize(&load_config()).await.unwrap();

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .humanize(HumanizationRequest::new("This request is very good."))
                    .await
            })
        };

        started_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("pipeline never reached the rewrite stage");
        let in_flight = engine.sessions().into_iter().next().expect("no session record");
        assert_eq!(in_flight.status, SessionStatus::Processing);
        assert!(engine.cancel_session(&in_flight.id));
        release_tx.send(()).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(EngineError::Cancelled)));
        let session = engine.session(&in_flight.id).unwrap();
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert_eq!(engine.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_poisoned_session_store_surfaces_pipeline_error() {
        let engine = ready_engine().await;
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = engine.sessions.write().unwrap();
            panic!("poison the session store");
        }));

        let err = engine
            .humanize(HumanizationRequest::new("some text"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_or_terminal_session() {
        let engine = ready_engine().await;
        assert!(!engine.cancel_session("missing"));

        let result = engine.humanize(HumanizationRequest::new("finished text")).await.unwrap();
        // Terminal sessions are immutable
        assert!(!engine.cancel_session(&result.session_id));
        let session = engine.session(&result.session_id).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let engine = ready_engine().await;
        engine.humanize(HumanizationRequest::new("Cache this result please.")).await.unwrap();
        assert_eq!(engine.cache_len(), 1);
        engine.clear_cache();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_quality_score_bounds() {
        assert!((0.0..=1.0).contains(&quality_score("", "")));
        let q = quality_score("the quick brown fox", "the quick brown fox");
        // identical text: length band + full overlap, no variety gain
        assert!((q - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_quality_rewards_variety_improvement() {
        let original = "good good good good";
        let rewritten = "good fine nice great";
        let q = quality_score(original, rewritten);
        let q_same = quality_score(original, original);
        assert!(q > q_same);
        assert!((0.0..=1.0).contains(&q));
    }
}
