// Humanizer Data Models
// Shared types for the analysis, transformation and detection pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ============ Categories & Styles ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextCategory {
    Academic,
    Technical,
    Formal,
    Casual,
    Conversational,
    Professional,
    #[default]
    General,
}

impl TextCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Technical => "technical",
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Conversational => "conversational",
            Self::Professional => "professional",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetStyle {
    Formal,
    Casual,
    Academic,
    #[default]
    Neutral,
}

// ============ Text Analysis ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextFeatures {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    /// Clamped to [1, 10].
    pub complexity_score: f64,
    /// Clamped to [0, 1].
    pub formality_score: f64,
    /// [0, 1]; 0.5 means neutral / no sentiment signal.
    pub sentiment_score: f64,
    pub detected_patterns: BTreeSet<String>,
    pub suggested_category: TextCategory,
    pub suggested_style: TargetStyle,
}

/// Output of the dataset-ingestion analysis variant.
/// Differs from [`TextFeatures`] in complexity rounding (nearest integer),
/// pattern tagging (style lexicons included) and category priority order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub complexity_score: f64,
    pub detected_patterns: BTreeSet<String>,
    pub quality_score: f64,
    pub suggested_category: TextCategory,
    pub suggested_style_tags: Vec<String>,
}

// ============ Transformation Patterns ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Lexical,
    Syntactic,
    Semantic,
    Stylistic,
}

/// Rule payload attached to a catalog pattern. Tagged so alternate catalogs
/// can be loaded from configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformationRule {
    SynonymReplacement {
        target_words: Vec<String>,
        replacements: HashMap<String, Vec<String>>,
        probability: f64,
    },
    SentenceRestructuring {
        operations: Vec<String>,
        probability: f64,
    },
    ConversationalEnhancement {
        insertions: Vec<String>,
        max_frequency: f64,
        probability: f64,
    },
    ContractionExpansion {
        contractions: HashMap<String, String>,
        probability: f64,
    },
    SemanticRephrasing {
        strategies: Vec<String>,
        probability: f64,
    },
    PunctuationModification {
        operations: Vec<String>,
        probability: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub pattern_type: PatternType,
    pub description: String,
    pub transformation_rule: TransformationRule,
    /// [0, 1].
    pub confidence_weight: f64,
    /// Category names; may include categories outside [`TextCategory`]
    /// (the default catalog names "creative").
    pub applicable_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransformationPlan {
    /// Most-confident first.
    pub selected_patterns: Vec<Pattern>,
    /// Mean confidence weight of the selection; 0 when empty.
    pub confidence: f64,
    /// Estimated post-transformation detection score, [0, 1].
    pub expected_detection_score: f64,
}

// ============ Humanization Request / Result ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizationRequest {
    pub input_text: String,
    pub target_style: Option<TargetStyle>,
    /// 1–10 when present; validated before pipeline entry.
    pub target_complexity: Option<f64>,
    /// Explicit pattern-name override; bypasses auto-selection entirely.
    pub selected_patterns: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    pub model_version_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl HumanizationRequest {
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            target_style: None,
            target_complexity: None,
            selected_patterns: None,
            use_cache: true,
            model_version_id: None,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizationResult {
    pub session_id: String,
    pub output_text: String,
    pub detection_score_before: f64,
    pub detection_score_after: f64,
    pub quality_score: f64,
    pub elapsed_ms: i64,
    pub applied_patterns: Vec<String>,
    pub cache_hit: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

// ============ Sessions ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Durable record of one humanization request's lifecycle.
/// Mutated only by the owning request flow; immutable once terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub model_version_id: Option<String>,
    pub input_text: String,
    pub output_text: Option<String>,
    pub input_category: Option<TextCategory>,
    pub target_style: Option<TargetStyle>,
    pub target_complexity: Option<f64>,
    pub selected_patterns: Option<Vec<String>>,
    pub detection_score_before: Option<f64>,
    pub detection_score_after: Option<f64>,
    pub quality_score: Option<f64>,
    pub elapsed_ms: Option<i64>,
    pub status: SessionStatus,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============ Result Cache ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub output_text: String,
    pub detection_score_before: f64,
    pub detection_score_after: f64,
    pub quality_score: f64,
    pub applied_patterns: Vec<String>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

// ============ Detection Backend ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionModelKind {
    Statistical,
    Neural,
    Hybrid,
}

impl DetectionModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statistical => "statistical",
            Self::Neural => "neural",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSubScores {
    pub base_patterns: f64,
    pub surface_patterns: f64,
    pub linguistic_features: f64,
    pub structural_analysis: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub is_machine_generated: bool,
    /// Overall weighted score, [0, 1].
    pub confidence_score: f64,
    pub detailed_scores: DetectionSubScores,
    pub explanations: Vec<String>,
}

// ============ Generation Backend ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLoadConfig {
    pub model_path: String,
    #[serde(default = "default_device")]
    pub device: String,
}

// ============ Dataset Collaborator ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphRecord {
    pub original_text: String,
    pub category: Option<TextCategory>,
    #[serde(default)]
    pub style_tags: Vec<String>,
    pub complexity_score: Option<f64>,
    pub quality_score: Option<f64>,
}

// ============ Training Resource Estimation ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningMode {
    FullFineTune,
    Qlora,
    Lora,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConfig {
    pub model_type: TuningMode,
    #[serde(default = "default_device")]
    pub device: String,
    pub batch_size: u32,
    pub max_seq_length: u32,
    pub num_epochs: u32,
    #[serde(default = "default_split")]
    pub train_test_split: f64,
}

// ============ Default Value Functions ============

fn default_true() -> bool { true }
fn default_device() -> String { "cpu".to_string() }
fn default_split() -> f64 { 0.8 }
