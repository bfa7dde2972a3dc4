// Humanizer Core Services

pub mod analyzer;
pub mod backend;
pub mod cache;
pub mod dataset;
pub mod detection;
pub mod engine;
pub mod patterns;
pub mod rewriter;
pub mod training_estimate;

pub use analyzer::{analyze, analyze_dataset};
pub use backend::{GenerationBackend, LocalGenerationBackend};
pub use cache::{cache_key, ResultCache};
pub use dataset::{validate_paragraph, MemoryParagraphStore, ParagraphStore};
pub use engine::{quality_score, HumanizerEngine};
pub use patterns::{default_patterns, select_plan};
pub use rewriter::{RandomSource, SeededRandom, ThreadRandom};
pub use training_estimate::{
    estimate_memory_gb, estimate_training_hours, validate_training_config,
};

// Re-export detection module functions
pub use detection::{composite_score, estimate, HeuristicDetector};
