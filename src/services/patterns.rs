// Pattern Catalog & Transformation Planning
// The catalog is immutable configuration data built once at process start
// and passed explicitly into the selector and rewriter; callers may supply
// an alternate catalog.

use crate::models::{Pattern, PatternType, TransformationPlan, TransformationRule};
use crate::services::detection::heuristics;
use std::collections::HashMap;

/// The six built-in transformation patterns.
pub fn default_patterns() -> Vec<Pattern> {
    vec![
        Pattern {
            name: "Synonym Variation".to_string(),
            pattern_type: PatternType::Lexical,
            description: "Replace common words with appropriate synonyms to reduce repetition"
                .to_string(),
            transformation_rule: TransformationRule::SynonymReplacement {
                target_words: owned(&["good", "bad", "big", "small", "important", "very"]),
                replacements: synonym_map(),
                probability: 0.7,
            },
            confidence_weight: 0.8,
            applicable_categories: owned(&["formal", "academic", "technical", "general"]),
        },
        Pattern {
            name: "Sentence Structure Variation".to_string(),
            pattern_type: PatternType::Syntactic,
            description: "Vary sentence structures to create more natural flow".to_string(),
            transformation_rule: TransformationRule::SentenceRestructuring {
                operations: owned(&[
                    "invert_subject_verb",
                    "add_transitional_phrases",
                    "vary_sentence_length",
                    "use_participial_phrases",
                ]),
                probability: 0.6,
            },
            confidence_weight: 0.9,
            applicable_categories: owned(&["formal", "academic", "technical"]),
        },
        Pattern {
            name: "Conversational Insertions".to_string(),
            pattern_type: PatternType::Stylistic,
            description: "Add natural conversational elements and filler words".to_string(),
            transformation_rule: TransformationRule::ConversationalEnhancement {
                insertions: owned(&[
                    "you know",
                    "I mean",
                    "to be honest",
                    "frankly",
                    "actually",
                    "basically",
                ]),
                max_frequency: 0.1,
                probability: 0.4,
            },
            confidence_weight: 0.7,
            applicable_categories: owned(&["casual", "conversational"]),
        },
        Pattern {
            name: "Contractions Usage".to_string(),
            pattern_type: PatternType::Lexical,
            description: "Introduce appropriate contractions for natural writing".to_string(),
            transformation_rule: TransformationRule::ContractionExpansion {
                contractions: contraction_map(),
                probability: 0.8,
            },
            confidence_weight: 0.6,
            applicable_categories: owned(&["casual", "conversational", "general"]),
        },
        Pattern {
            name: "Semantic Variation".to_string(),
            pattern_type: PatternType::Semantic,
            description: "Rephrase concepts using different semantic approaches".to_string(),
            transformation_rule: TransformationRule::SemanticRephrasing {
                strategies: owned(&[
                    "change_voice",
                    "reorder_clauses",
                    "substitute_concepts",
                    "modify_perspective",
                ]),
                probability: 0.5,
            },
            confidence_weight: 0.9,
            applicable_categories: owned(&["academic", "formal", "technical"]),
        },
        Pattern {
            name: "Punctuation Variation".to_string(),
            pattern_type: PatternType::Syntactic,
            description: "Vary punctuation usage for more natural rhythm".to_string(),
            transformation_rule: TransformationRule::PunctuationModification {
                operations: owned(&[
                    "replace_periods_with_semicolons",
                    "add_em_dashes",
                    "use_parenthetical_asides",
                    "vary_comma_usage",
                ]),
                probability: 0.3,
            },
            confidence_weight: 0.5,
            applicable_categories: owned(&["formal", "academic", "creative"]),
        },
    ]
}

fn synonym_map() -> HashMap<String, Vec<String>> {
    [
        ("good", vec!["excellent", "outstanding", "superb", "remarkable", "exceptional"]),
        ("bad", vec!["poor", "inadequate", "substandard", "deficient", "unsatisfactory"]),
        ("big", vec!["large", "substantial", "significant", "considerable", "extensive"]),
        ("small", vec!["tiny", "minor", "modest", "limited", "compact"]),
        ("important", vec!["crucial", "vital", "essential", "significant", "critical"]),
        ("very", vec!["extremely", "highly", "particularly", "especially", "remarkably"]),
    ]
    .into_iter()
    .map(|(word, synonyms)| {
        (
            word.to_string(),
            synonyms.into_iter().map(String::from).collect(),
        )
    })
    .collect()
}

fn contraction_map() -> HashMap<String, String> {
    [
        ("do not", "don't"),
        ("will not", "won't"),
        ("cannot", "can't"),
        ("it is", "it's"),
        ("that is", "that's"),
        ("I am", "I'm"),
        ("you are", "you're"),
        ("we are", "we're"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Complexity impact multiplier per pattern type.
fn type_weight(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::Lexical => 1.0,
        PatternType::Syntactic => 2.0,
        PatternType::Semantic => 3.0,
        PatternType::Stylistic => 1.5,
    }
}

/// Detection-score reduction multiplier per pattern type.
fn effectiveness_weight(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::Lexical => 0.15,
        PatternType::Syntactic => 0.25,
        PatternType::Semantic => 0.30,
        PatternType::Stylistic => 0.20,
    }
}

/// Build a transformation plan for `text`: filter by category, order by
/// confidence, greedily accumulate complexity impact toward the target,
/// then estimate the post-transformation detection score.
pub fn select_plan(
    text: &str,
    target_category: &str,
    target_complexity: f64,
    available_patterns: &[Pattern],
) -> TransformationPlan {
    let mut applicable: Vec<&Pattern> = available_patterns
        .iter()
        .filter(|p| p.applicable_categories.iter().any(|c| c == target_category))
        .collect();

    // Stable sort: ties keep catalog order
    applicable.sort_by(|a, b| {
        b.confidence_weight
            .partial_cmp(&a.confidence_weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut selected: Vec<Pattern> = Vec::new();
    let mut total_impact = 0.0;
    for pattern in applicable {
        if total_impact >= target_complexity * 0.8 {
            break;
        }
        total_impact += type_weight(pattern.pattern_type) * pattern.confidence_weight;
        selected.push(pattern.clone());
    }

    let confidence = if selected.is_empty() {
        0.0
    } else {
        selected.iter().map(|p| p.confidence_weight).sum::<f64>() / selected.len() as f64
    };

    let expected_detection_score = estimate_expected_score(text, &selected, confidence);

    TransformationPlan {
        selected_patterns: selected,
        confidence,
        expected_detection_score,
    }
}

fn estimate_expected_score(text: &str, selected: &[Pattern], confidence: f64) -> f64 {
    let baseline = heuristics::estimate(text);
    if selected.is_empty() {
        return baseline;
    }

    let pattern_impact: f64 = selected
        .iter()
        .map(|p| effectiveness_weight(p.pattern_type) * p.confidence_weight)
        .sum();
    let improvement = pattern_impact * confidence / selected.len() as f64;

    let expected = (baseline - improvement).max(0.0);
    (expected * 100.0).round() / 100.0
}
