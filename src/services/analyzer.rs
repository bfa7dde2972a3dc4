// Text Analysis Service
// Extracts structural and stylistic features from raw text.
// Two entry points exist on purpose: `analyze` serves the humanization
// pipeline, `analyze_dataset` serves dataset ingestion. They differ in
// complexity rounding and category priority and must stay distinct.

use crate::models::{DatasetAnalysis, TargetStyle, TextCategory, TextFeatures};
use regex::Regex;
use std::collections::BTreeSet;

const COMPLEX_CONNECTIVES: [&str; 4] = ["consequently", "nevertheless", "furthermore", "subsequently"];
const FORMAL_WORDS: [&str; 5] = ["furthermore", "consequently", "nevertheless", "moreover", "therefore"];
const INFORMAL_WORDS: [&str; 5] = ["yeah", "gonna", "wanna", "kinda", "sorta"];
const POSITIVE_WORDS: [&str; 5] = ["good", "great", "excellent", "amazing", "wonderful"];
const NEGATIVE_WORDS: [&str; 5] = ["bad", "terrible", "awful", "horrible", "disappointing"];

// Style lexicons used only by the dataset-ingestion variant.
const STYLE_LEXICONS: [(&str, &[&str]); 5] = [
    ("formal", &["furthermore", "consequently", "nevertheless", "moreover"]),
    ("casual", &["yeah", "gonna", "wanna", "kinda", "sorta"]),
    ("academic", &["hypothesis", "methodology", "subsequently", "empirical"]),
    ("conversational", &["you know", "i mean", "like", "basically"]),
    ("technical", &["algorithm", "implementation", "optimization", "architecture"]),
];

/// Split into word tokens on whitespace runs.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().filter(|w| !w.is_empty()).collect()
}

/// Split into sentences on terminator runs, discarding blank fragments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Analyze text for the humanization pipeline. Never fails: degenerate
/// input yields zeroed counts and neutral defaults.
pub fn analyze(text: &str) -> TextFeatures {
    let words = split_words(text);
    let sentences = split_sentences(text);

    let word_count = words.len();
    let sentence_count = sentences.len();
    let avg_sentence_length = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };

    let complexity_score = complexity(text, &words, avg_sentence_length);
    let formality_score = formality(text);
    let sentiment_score = sentiment(text);

    let detected_patterns = detect_rhetorical_patterns(text);
    let suggested_category = suggest_category(text, &detected_patterns);
    let suggested_style = suggest_style(formality_score);

    TextFeatures {
        word_count,
        sentence_count,
        avg_sentence_length,
        complexity_score,
        formality_score,
        sentiment_score,
        detected_patterns,
        suggested_category,
        suggested_style,
    }
}

/// Analyze text for dataset ingestion. Same feature base as [`analyze`] but
/// with integer complexity rounding, style-lexicon pattern tags, a dataset
/// quality score and a pattern-tags-first category order.
pub fn analyze_dataset(text: &str) -> DatasetAnalysis {
    let words = split_words(text);
    let sentences = split_sentences(text);

    let word_count = words.len();
    let sentence_count = sentences.len();
    let avg_sentence_length = if sentence_count > 0 {
        ((word_count as f64 / sentence_count as f64) * 100.0).round() / 100.0
    } else {
        0.0
    };

    let complexity_score = complexity_raw(text, &words, avg_sentence_length)
        .round()
        .clamp(1.0, 10.0);
    let detected_patterns = detect_dataset_patterns(text);
    let quality_score = dataset_quality(text, complexity_score);
    let suggested_category = suggest_category_for_dataset(text, &detected_patterns);
    let suggested_style_tags = suggest_style_tags(&detected_patterns);

    DatasetAnalysis {
        word_count,
        sentence_count,
        avg_sentence_length,
        complexity_score,
        detected_patterns,
        quality_score,
        suggested_category,
        suggested_style_tags,
    }
}

fn complexity_raw(text: &str, words: &[&str], avg_sentence_length: f64) -> f64 {
    let mut complexity = 1.0;

    // Long-word density
    if !words.is_empty() {
        let complex_words = words.iter().filter(|w| w.len() > 6).count();
        complexity += (complex_words as f64 / words.len() as f64) * 3.0;
    }

    // Sentence length
    if avg_sentence_length > 20.0 {
        complexity += 2.0;
    } else if avg_sentence_length > 15.0 {
        complexity += 1.0;
    }

    // Complex connectives
    let lower = text.to_lowercase();
    let indicator_count = COMPLEX_CONNECTIVES.iter().filter(|c| lower.contains(*c)).count();
    complexity += indicator_count as f64;

    complexity
}

/// Complexity on [1, 10], rounded to the nearest 0.1.
pub fn complexity(text: &str, words: &[&str], avg_sentence_length: f64) -> f64 {
    let raw = complexity_raw(text, words, avg_sentence_length);
    ((raw * 10.0).round() / 10.0).clamp(1.0, 10.0)
}

/// Formality on [0, 1]; 0.5 is neutral.
pub fn formality(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let formal_count = FORMAL_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
    let informal_count = INFORMAL_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;

    let total_words = text.split_whitespace().count().max(1) as f64;
    let ratio = (formal_count - informal_count) / total_words;

    (0.5 + ratio * 10.0).clamp(0.0, 1.0)
}

/// Sentiment on [0, 1]; 0.5 when neither lexicon matches.
pub fn sentiment(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;

    if positive + negative == 0.0 {
        return 0.5;
    }
    positive / (positive + negative)
}

/// Structural and rhetorical presence tags (the inference-variant set).
pub fn detect_rhetorical_patterns(text: &str) -> BTreeSet<String> {
    let mut patterns = BTreeSet::new();

    if text.contains(',') {
        patterns.insert("comma_usage".to_string());
    }
    if text.contains(';') {
        patterns.insert("semicolon_usage".to_string());
    }

    let contrast = Regex::new(r"(?i)\bhowever\b|\bbut\b|\balthough\b").unwrap();
    if contrast.is_match(text) {
        patterns.insert("contrast_structure".to_string());
    }
    let causal = Regex::new(r"(?i)\bbecause\b|\bsince\b|\btherefore\b").unwrap();
    if causal.is_match(text) {
        patterns.insert("causal_structure".to_string());
    }
    let example = Regex::new(r"(?i)\bfor example\b|\bsuch as\b|\blike\b").unwrap();
    if example.is_match(text) {
        patterns.insert("exemplification".to_string());
    }

    patterns
}

/// Dataset-variant tags: rhetorical set plus style lexicons, colon and
/// parenthetical usage.
fn detect_dataset_patterns(text: &str) -> BTreeSet<String> {
    let mut patterns = detect_rhetorical_patterns(text);
    let lower = text.to_lowercase();

    for (style, lexicon) in STYLE_LEXICONS {
        let matches = lexicon.iter().filter(|w| lower.contains(*w)).count();
        if matches > 0 {
            patterns.insert(format!("{}_style_{}", style, matches));
        }
    }

    if text.contains(':') {
        patterns.insert("colon_usage".to_string());
    }
    let parenthetical = Regex::new(r"\([^)]+\)").unwrap();
    if parenthetical.is_match(text) {
        patterns.insert("parenthetical_usage".to_string());
    }

    patterns
}

/// Inference-path category heuristic: content keywords only.
pub fn suggest_category(text: &str, patterns: &BTreeSet<String>) -> TextCategory {
    let lower = text.to_lowercase();

    if lower.contains("research") || lower.contains("study") {
        return TextCategory::Academic;
    }
    if lower.contains("business") || lower.contains("professional") {
        return TextCategory::Professional;
    }
    if lower.contains("system") || lower.contains("technical") {
        return TextCategory::Technical;
    }
    if patterns.iter().any(|p| p.contains("conversational")) {
        return TextCategory::Casual;
    }

    TextCategory::General
}

/// Dataset-path category heuristic: detected style tags take priority over
/// the keyword fallback. Kept separate from [`suggest_category`]; the two
/// call sites diverge upstream and are reconciled by product, not here.
pub fn suggest_category_for_dataset(text: &str, patterns: &BTreeSet<String>) -> TextCategory {
    if patterns.iter().any(|p| p.contains("academic")) {
        return TextCategory::Academic;
    }
    if patterns.iter().any(|p| p.contains("technical")) {
        return TextCategory::Technical;
    }
    if patterns.iter().any(|p| p.contains("formal")) {
        return TextCategory::Formal;
    }
    if patterns.iter().any(|p| p.contains("casual")) {
        return TextCategory::Casual;
    }
    if patterns.iter().any(|p| p.contains("conversational")) {
        return TextCategory::Conversational;
    }

    let lower = text.to_lowercase();
    if lower.contains("research") || lower.contains("study") || lower.contains("analysis") {
        return TextCategory::Academic;
    }
    if lower.contains("system") || lower.contains("code") || lower.contains("algorithm") {
        return TextCategory::Technical;
    }
    if lower.contains("business") || lower.contains("professional") || lower.contains("corporate") {
        return TextCategory::Formal;
    }

    TextCategory::General
}

pub fn suggest_style(formality_score: f64) -> TargetStyle {
    if formality_score > 0.7 {
        TargetStyle::Formal
    } else if formality_score < 0.3 {
        TargetStyle::Casual
    } else {
        TargetStyle::Neutral
    }
}

/// Style tags derived from detected patterns, deduplicated, "neutral" when
/// nothing matched.
fn suggest_style_tags(patterns: &BTreeSet<String>) -> Vec<String> {
    let mut tags: BTreeSet<&str> = BTreeSet::new();

    for pattern in patterns {
        if pattern.contains("formal") {
            tags.insert("formal");
        }
        if pattern.contains("casual") {
            tags.insert("casual");
        }
        if pattern.contains("academic") {
            tags.insert("academic");
        }
        if pattern.contains("conversational") {
            tags.insert("conversational");
        }
        if pattern.contains("technical") {
            tags.insert("technical");
        }
        if pattern.contains("contrast_structure") {
            tags.insert("argumentative");
        }
        if pattern.contains("causal_structure") {
            tags.insert("analytical");
        }
        if pattern.contains("exemplification") {
            tags.insert("explanatory");
        }
    }

    if tags.is_empty() {
        return vec!["neutral".to_string()];
    }
    tags.into_iter().map(String::from).collect()
}

fn dataset_quality(text: &str, complexity_score: f64) -> f64 {
    let mut quality: f64 = 0.5;

    let word_count = split_words(text).len();
    if (50..=300).contains(&word_count) {
        quality += 0.2;
    }

    // Sentence-length variety
    let sentence_lengths: Vec<f64> = split_sentences(text)
        .iter()
        .map(|s| s.split_whitespace().count() as f64)
        .collect();
    if !sentence_lengths.is_empty() {
        let avg = sentence_lengths.iter().sum::<f64>() / sentence_lengths.len() as f64;
        let variance = sentence_lengths.iter().map(|l| (l - avg).powi(2)).sum::<f64>()
            / sentence_lengths.len() as f64;
        if variance > 4.0 {
            quality += 0.1;
        }
    }

    if (3.0..=7.0).contains(&complexity_score) {
        quality += 0.2;
    }

    if text.chars().next().is_some_and(|c| c.is_uppercase()) {
        quality += 0.05;
    }
    if text.trim_end().ends_with(['.', '!', '?']) {
        quality += 0.05;
    }

    ((quality * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_defaults() {
        let features = analyze("");
        assert_eq!(features.word_count, 0);
        assert_eq!(features.sentence_count, 0);
        assert_eq!(features.avg_sentence_length, 0.0);
        assert_eq!(features.complexity_score, 1.0);
        assert_eq!(features.formality_score, 0.5);
        assert_eq!(features.sentiment_score, 0.5);
        assert!(features.detected_patterns.is_empty());
        assert_eq!(features.suggested_category, TextCategory::General);
        assert_eq!(features.suggested_style, TargetStyle::Neutral);
    }

    #[test]
    fn test_whitespace_only_input() {
        let features = analyze("   \n\t  ");
        assert_eq!(features.word_count, 0);
        assert_eq!(features.sentence_count, 0);
        assert_eq!(features.complexity_score, 1.0);
    }

    #[test]
    fn test_score_ranges() {
        let samples = [
            "Short.",
            "Furthermore, the methodology was consequently validated; nevertheless, subsequent analysis demonstrated considerable improvements across the experimental conditions evaluated.",
            "yeah it's kinda good, you know",
            "word",
        ];
        for text in samples {
            let f = analyze(text);
            assert!((1.0..=10.0).contains(&f.complexity_score), "complexity out of range for {:?}", text);
            assert!((0.0..=1.0).contains(&f.formality_score));
            assert!((0.0..=1.0).contains(&f.sentiment_score));
        }
    }

    #[test]
    fn test_complexity_connectives_raise_score() {
        let plain = analyze("The cat sat on the mat. It was warm.");
        let connected = analyze("Consequently the cat sat on the mat. Furthermore it was warm.");
        assert!(connected.complexity_score > plain.complexity_score);
    }

    #[test]
    fn test_formality_informal_text() {
        let features = analyze("yeah I'm gonna go, kinda tired sorta");
        assert!(features.formality_score < 0.3);
        assert_eq!(features.suggested_style, TargetStyle::Casual);
    }

    #[test]
    fn test_sentiment_positive() {
        let score = sentiment("This is a good and great and excellent result");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_sentiment_mixed() {
        let score = sentiment("good but terrible");
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_detected_patterns_are_a_set() {
        let patterns = detect_rhetorical_patterns("However, because of this, because of that; such as these.");
        assert!(patterns.contains("comma_usage"));
        assert!(patterns.contains("semicolon_usage"));
        assert!(patterns.contains("contrast_structure"));
        assert!(patterns.contains("causal_structure"));
        assert!(patterns.contains("exemplification"));
        assert_eq!(patterns.len(), 5);
    }

    #[test]
    fn test_category_keyword_priority() {
        let f = analyze("This research covers the business system.");
        // "research" wins over the later keyword checks
        assert_eq!(f.suggested_category, TextCategory::Academic);
    }

    #[test]
    fn test_category_variants_diverge() {
        // Formal connectives produce a formal style tag, which only the
        // dataset variant consults before keywords.
        let text = "Furthermore, moreover, the corporate outlook improved.";
        let inference = analyze(text);
        let dataset = analyze_dataset(text);
        assert_eq!(inference.suggested_category, TextCategory::General);
        assert_eq!(dataset.suggested_category, TextCategory::Formal);
    }

    #[test]
    fn test_dataset_complexity_is_integer() {
        let analysis = analyze_dataset("The considerable experimental methodology demonstrated improvements.");
        assert_eq!(analysis.complexity_score, analysis.complexity_score.round());
        assert!((1.0..=10.0).contains(&analysis.complexity_score));
    }

    #[test]
    fn test_dataset_style_tags_neutral_fallback() {
        let analysis = analyze_dataset("Plain words only here.");
        assert_eq!(analysis.suggested_style_tags, vec!["neutral".to_string()]);
    }

    #[test]
    fn test_dataset_quality_in_range() {
        let long = "The quick brown fox jumps over a lazy dog. ".repeat(10);
        for text in ["", "One.", long.as_str()] {
            let analysis = analyze_dataset(text);
            assert!((0.0..=1.0).contains(&analysis.quality_score));
        }
    }
}
