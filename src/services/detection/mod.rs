// Detection Module
// Machine-generated text likelihood estimation:
// - heuristics: lightweight estimator used inside the rewriting loop
// - composite: weighted four-part estimator with explanations
// - backend: model-registry surface wrapping the composite estimator

pub mod heuristics;
pub mod composite;
pub mod backend;

pub use heuristics::estimate;
pub use composite::score as composite_score;
pub use backend::{HeuristicDetector, LoadedModel};
