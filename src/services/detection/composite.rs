// Composite Detection Estimator
// Weighted blend of four independent sub-scores with human-readable
// explanations. This is the algorithm behind the standalone detection
// backend; a production classifier would replace it behind the same shape.

use crate::models::{DetectionReport, DetectionSubScores};
use regex::Regex;

const BASE_WEIGHT: f64 = 0.3;
const SURFACE_WEIGHT: f64 = 0.3;
const LINGUISTIC_WEIGHT: f64 = 0.2;
const STRUCTURAL_WEIGHT: f64 = 0.2;

const AI_INDICATORS: [&str; 7] = [
    "furthermore",
    "moreover",
    "consequently",
    "nevertheless",
    "in conclusion",
    "to summarize",
    "it is important to note",
];

const FORMAL_WORDS: [&str; 4] = ["utilize", "facilitate", "implement", "optimize"];

const TRANSITION_WORDS: [&str; 9] = [
    "however",
    "therefore",
    "furthermore",
    "moreover",
    "consequently",
    "nevertheless",
    "nonetheless",
    "additionally",
    "subsequently",
];

const LOGICAL_SEQUENCE_WORDS: [&str; 7] = [
    "first",
    "second",
    "third",
    "finally",
    "in conclusion",
    "in summary",
    "to summarize",
];

/// Score `text` with the full composite estimator.
pub fn score(text: &str) -> DetectionReport {
    let base = base_pattern_score(text);
    let surface = surface_pattern_score(text);
    let linguistic = linguistic_feature_score(text);
    let structural = structural_score(text);

    let overall = (base * BASE_WEIGHT
        + surface * SURFACE_WEIGHT
        + linguistic * LINGUISTIC_WEIGHT
        + structural * STRUCTURAL_WEIGHT)
        .clamp(0.0, 1.0);

    let detailed_scores = DetectionSubScores {
        base_patterns: base,
        surface_patterns: surface,
        linguistic_features: linguistic,
        structural_analysis: structural,
    };
    let explanations = build_explanations(&detailed_scores);

    DetectionReport {
        is_machine_generated: overall > 0.5,
        confidence_score: overall,
        detailed_scores,
        explanations,
    }
}

/// Formal connectors, flat sentence lengths and formal-word density.
fn base_pattern_score(text: &str) -> f64 {
    let mut score: f64 = 0.3;
    let lower = text.to_lowercase();

    for indicator in AI_INDICATORS {
        if lower.contains(indicator) {
            score += 0.05;
        }
    }

    // Low variance in sentence length reads as templated output
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.len() > 2 {
        let avg = sentences.iter().map(|s| s.len() as f64).sum::<f64>() / sentences.len() as f64;
        let variance = sentences
            .iter()
            .map(|s| (s.len() as f64 - avg).powi(2))
            .sum::<f64>()
            / sentences.len() as f64;
        if variance < 100.0 {
            score += 0.1;
        }
    }

    let total_words = text.split_whitespace().count().max(1) as f64;
    let formal_count = FORMAL_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
    score += (formal_count / total_words) * 0.2;

    score.clamp(0.0, 1.0)
}

/// Capitalization, punctuation and contraction surface signals.
fn surface_pattern_score(text: &str) -> f64 {
    let mut score: f64 = 0.2;

    // Perfect opening capital and closing terminator
    let starts_capital = text.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let ends_terminated = text.trim_end().ends_with(['.', '!', '?']);
    if starts_capital && ends_terminated {
        score += 0.05;
    }

    // Long vowel runs are a typo signature; their absence leans generated
    let vowel_run = Regex::new(r"(?i)\b\w*[aeiou]{4,}\w*\b").unwrap();
    if !vowel_run.is_match(text) {
        score += 0.05;
    }

    let serial_comma = Regex::new(r",\s*and").unwrap();
    if serial_comma.is_match(text) {
        score += 0.05;
    }

    let contractions = Regex::new(r"\b(don't|can't|won't|it's|you're|we're)\b").unwrap();
    if !contractions.is_match(text) {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Vocabulary diversity, word length, passive voice and subordinate clauses.
fn linguistic_feature_score(text: &str) -> f64 {
    let mut score: f64 = 0.2;
    let lower = text.to_lowercase();

    let words: Vec<&str> = lower.split_whitespace().collect();
    if !words.is_empty() {
        let unique: std::collections::HashSet<&str> = words.iter().copied().collect();
        if unique.len() as f64 / words.len() as f64 > 0.8 {
            score += 0.05;
        }

        let avg_word_length =
            words.iter().map(|w| w.len() as f64).sum::<f64>() / words.len() as f64;
        if avg_word_length > 5.0 {
            score += 0.05;
        }
    }

    let passive_patterns = [
        Regex::new(r"\b(is|are|was|were)\s+\w+ed\b").unwrap(),
        Regex::new(r"\bhas been\s+\w+ed\b").unwrap(),
        Regex::new(r"\bhave been\s+\w+ed\b").unwrap(),
    ];
    let passive_count: usize = passive_patterns.iter().map(|p| p.find_iter(text).count()).sum();
    if passive_count as f64 > words.len().max(1) as f64 * 0.1 {
        score += 0.05;
    }

    // Subordinate clause followed by a comma within the same sentence
    let subordinate = Regex::new(r"(?i)\b(although|while|because)\b[^.!?]*,").unwrap();
    if subordinate.is_match(text) {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Paragraph shape, topic sentences, transition and sequence word density.
fn structural_score(text: &str) -> f64 {
    let mut score: f64 = 0.2;
    let lower = text.to_lowercase();

    let paragraph_re = Regex::new(r"\n\n+").unwrap();
    let paragraphs: Vec<&str> = paragraph_re
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .collect();

    if paragraphs.len() == 1 {
        score += 0.05;
    }

    let topic_sentence = Regex::new(r"\b(the|this|these|those)\s+\w+\s+(is|are)\s+").unwrap();
    for paragraph in &paragraphs {
        if let Some(first) = paragraph
            .split(['.', '!', '?'])
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
        {
            if topic_sentence.is_match(first) {
                score += 0.02;
            }
        }
    }

    let total_words = text.split_whitespace().count().max(1) as f64;
    let transition_count = TRANSITION_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
    if transition_count > total_words * 0.05 {
        score += 0.05;
    }

    if LOGICAL_SEQUENCE_WORDS.iter().any(|w| lower.contains(w)) {
        score += 0.03;
    }

    score.clamp(0.0, 1.0)
}

fn build_explanations(scores: &DetectionSubScores) -> Vec<String> {
    let mut explanations = Vec::new();

    if scores.base_patterns > 0.6 {
        explanations
            .push("Text contains common AI writing patterns and formal connectors".to_string());
    }
    if scores.surface_patterns > 0.6 {
        explanations
            .push("Perfect grammar and lack of contractions suggest AI generation".to_string());
    }
    if scores.linguistic_features > 0.6 {
        explanations
            .push("High vocabulary diversity and complex sentence structures detected".to_string());
    }
    if scores.structural_analysis > 0.6 {
        explanations.push("Logical flow and transition word usage indicate AI writing".to_string());
    }

    if explanations.is_empty() {
        explanations.push("Text shows characteristics of human writing".to_string());
    }

    explanations
}
