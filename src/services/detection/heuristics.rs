// Lightweight Detection Estimator
// Fast surface-feature score used inside the rewriting loop. The richer
// weighted composite lives in `composite`; the two serve different call
// sites and are deliberately kept distinct.

use regex::Regex;

/// Estimate the likelihood that `text` is machine-generated, [0, 1].
/// Pure function of the input; degenerate input stays at the 0.5 base.
pub fn estimate(text: &str) -> f64 {
    let mut score: f64 = 0.5;

    // Signals that raise the estimate
    if text.contains("furthermore") || text.contains("moreover") {
        score += 0.1;
    }
    if text.contains("consequently") || text.contains("therefore") {
        score += 0.1;
    }
    let intensifier = Regex::new(r"\bvery \w+\b").unwrap();
    if intensifier.is_match(text) {
        score += 0.05;
    }
    let sentences: Vec<&str> = text.split('.').collect();
    if sentences.iter().all(|s| s.trim().len() > 20) {
        // Uniformly long sentences
        score += 0.1;
    }

    // Signals that lower the estimate
    let contractions = Regex::new(r"\bdon't\b|\bcan't\b|\bwon't\b").unwrap();
    if contractions.is_match(text) {
        score -= 0.1;
    }
    let fillers = Regex::new(r"\byou know\b|\bI mean\b").unwrap();
    if fillers.is_match(text) {
        score -= 0.05;
    }
    if sentences.iter().any(|s| s.trim().len() < 10) {
        score -= 0.05;
    }

    score.clamp(0.0, 1.0)
}
