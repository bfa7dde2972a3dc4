// Rewriter Service
// Applies the transformation stages to text in fixed order: lexical
// substitution, syntactic variation, stylistic adjustment, complexity
// adjustment. Every stage is total; a stage with no matches is a no-op.
//
// All randomness flows through the injected RandomSource so tests can pin
// the draws.

use crate::models::TargetStyle;
use crate::services::analyzer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

/// Injectable entropy source: uniform draws in [0, 1).
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;
}

/// Production source backed by the thread-local generator.
#[derive(Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Seeded source for reproducible runs.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

// Synonym lists keyed in fixed order so the draw sequence is stable.
const SYNONYMS: [(&str, &[&str]); 6] = [
    ("good", &["excellent", "outstanding", "superb", "remarkable"]),
    ("bad", &["poor", "inadequate", "substandard", "deficient"]),
    ("big", &["large", "substantial", "significant", "considerable"]),
    ("small", &["tiny", "minor", "modest", "limited"]),
    ("important", &["crucial", "vital", "essential", "critical"]),
    ("very", &["extremely", "highly", "particularly", "especially"]),
];

const TRANSITIONS: [&str; 4] = ["However,", "Therefore,", "In addition,", "Furthermore,"];

const ACADEMIC_CONNECTORS: [&str; 3] = ["furthermore,", "consequently,", "nevertheless,"];

const SIMPLE_TO_COMPLEX: [(&str, &str); 5] = [
    ("show", "demonstrate"),
    ("use", "utilize"),
    ("help", "facilitate"),
    ("make", "fabricate"),
    ("get", "obtain"),
];

const TRANSITION_PROBABILITY: f64 = 0.3;
const ACADEMIC_CONNECTOR_PROBABILITY: f64 = 0.4;
const COMPLEXITY_SWAP_PROBABILITY: f64 = 0.3;

/// Run the full stage pipeline over `text`.
pub fn apply(
    text: &str,
    target_style: Option<TargetStyle>,
    target_complexity: Option<f64>,
    rng: &mut dyn RandomSource,
) -> String {
    let mut result = apply_lexical_variations(text, rng);
    result = apply_syntactic_variations(&result, rng);
    result = apply_stylistic_adjustments(&result, target_style, rng);
    result = apply_complexity_adjustments(&result, target_complexity, rng);
    result
}

/// Stage 1: lexical substitution. One synonym is rolled per target word per
/// call and reused for every occurrence of that word, not re-rolled per
/// occurrence.
pub fn apply_lexical_variations(text: &str, rng: &mut dyn RandomSource) -> String {
    let mut result = text.to_string();

    for (word, synonyms) in SYNONYMS {
        let re = Regex::new(&format!(r"(?i)\b{}\b", word)).unwrap();
        if re.is_match(&result) {
            let synonym = synonyms[pick_index(rng, synonyms.len())];
            result = re.replace_all(&result, synonym).to_string();
        }
    }

    result
}

/// Stage 2: syntactic variation. Each sentence gets a transition phrase
/// prepended with fixed probability, lower-casing its original first letter.
pub fn apply_syntactic_variations(text: &str, rng: &mut dyn RandomSource) -> String {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return text.to_string();
    }

    let rewritten: Vec<String> = sentences
        .iter()
        .map(|sentence| {
            if rng.next_f64() < TRANSITION_PROBABILITY {
                let transition = TRANSITIONS[pick_index(rng, TRANSITIONS.len())];
                format!("{} {}", transition, lowercase_first(sentence))
            } else {
                sentence.to_string()
            }
        })
        .collect();

    format!("{}.", rewritten.join(". "))
}

/// Stage 3: style-specific rewrites. Casual contracts, formal expands,
/// academic occasionally prepends a connector. No style, no change.
pub fn apply_stylistic_adjustments(
    text: &str,
    target_style: Option<TargetStyle>,
    rng: &mut dyn RandomSource,
) -> String {
    let Some(style) = target_style else {
        return text.to_string();
    };

    match style {
        TargetStyle::Casual => {
            let mut result = text.to_string();
            for (long, short) in [
                (r"\bdo not\b", "don't"),
                (r"\bwill not\b", "won't"),
                (r"\bcannot\b", "can't"),
                (r"\bit is\b", "it's"),
            ] {
                result = Regex::new(long).unwrap().replace_all(&result, short).to_string();
            }
            result
        }
        TargetStyle::Formal => {
            let mut result = text.to_string();
            for (short, long) in [
                (r"\bdon't\b", "do not"),
                (r"\bwon't\b", "will not"),
                (r"\bcan't\b", "cannot"),
                (r"\bit's\b", "it is"),
            ] {
                result = Regex::new(short).unwrap().replace_all(&result, long).to_string();
            }
            result
        }
        TargetStyle::Academic => {
            if rng.next_f64() < ACADEMIC_CONNECTOR_PROBABILITY {
                let connector = ACADEMIC_CONNECTORS[pick_index(rng, ACADEMIC_CONNECTORS.len())];
                format!("{} {}", connector, text)
            } else {
                text.to_string()
            }
        }
        TargetStyle::Neutral => text.to_string(),
    }
}

/// Stage 4: complexity adjustment. Recomputes the current complexity and
/// nudges vocabulary toward or away from the target with per-word draws.
pub fn apply_complexity_adjustments(
    text: &str,
    target_complexity: Option<f64>,
    rng: &mut dyn RandomSource,
) -> String {
    let Some(target) = target_complexity else {
        return text.to_string();
    };

    let words = analyzer::split_words(text);
    let sentence_count = analyzer::split_sentences(text).len();
    let avg_sentence_length = if sentence_count > 0 {
        words.len() as f64 / sentence_count as f64
    } else {
        0.0
    };
    let current = analyzer::complexity(text, &words, avg_sentence_length);

    if target > current {
        swap_words(text, &SIMPLE_TO_COMPLEX, rng)
    } else if target < current {
        let inverse: Vec<(&str, &str)> =
            SIMPLE_TO_COMPLEX.iter().map(|(a, b)| (*b, *a)).collect();
        swap_words(text, &inverse, rng)
    } else {
        text.to_string()
    }
}

fn swap_words(text: &str, map: &[(&str, &str)], rng: &mut dyn RandomSource) -> String {
    let mut result = text.to_string();
    for (from, to) in map {
        if rng.next_f64() < COMPLEXITY_SWAP_PROBABILITY {
            let re = Regex::new(&format!(r"(?i)\b{}\b", from)).unwrap();
            result = re.replace_all(&result, *to).to_string();
        }
    }
    result
}

fn pick_index(rng: &mut dyn RandomSource, len: usize) -> usize {
    ((rng.next_f64() * len as f64) as usize).min(len - 1)
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
