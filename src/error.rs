// Engine Error Types
// Terminal outcomes a caller can receive from the pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The generation backend has not been initialized yet.
    /// Not retryable until initialization completes.
    #[error("model not ready: call initialize() first")]
    NotReady,

    /// Request rejected before pipeline entry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure inside analysis/selection/rewriting/scoring.
    /// The owning session is finalized as failed before this is surfaced.
    #[error("pipeline failure: {0}")]
    Pipeline(String),

    /// The caller cancelled the request before it reached a terminal state.
    #[error("request cancelled")]
    Cancelled,

    /// Failure reported by an external backend collaborator.
    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}
