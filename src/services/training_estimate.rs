// Training Resource Estimation
// Rough duration and memory forecasts for a training configuration. Used by
// the configuration-presets collaborator when sizing jobs; the core does not
// run training itself.

use crate::models::{TrainingConfig, TuningMode};

/// Estimated wall-clock training time in hours.
/// `(dataset_size / batch_size) * 0.001 * epochs * tuning * hardware`.
pub fn estimate_training_hours(config: &TrainingConfig, dataset_size: u64) -> f64 {
    let base_time_per_epoch = (dataset_size as f64 / config.batch_size.max(1) as f64) * 0.001;

    let complexity_multiplier = match config.model_type {
        TuningMode::FullFineTune => 3.0,
        TuningMode::Qlora => 1.5,
        TuningMode::Lora => 1.0,
    };
    let hardware_multiplier = if is_accelerated(&config.device) { 0.3 } else { 1.0 };

    (base_time_per_epoch * config.num_epochs as f64 * complexity_multiplier * hardware_multiplier)
        .round()
}

/// Estimated peak memory in GB: tuned base model footprint plus batch
/// activation memory (batch × seq × 4 bytes).
pub fn estimate_memory_gb(config: &TrainingConfig) -> f64 {
    let mut base_memory: f64 = 8.0;

    match config.model_type {
        TuningMode::FullFineTune => base_memory *= 4.0,
        TuningMode::Qlora => base_memory *= 0.5,
        TuningMode::Lora => {}
    }

    base_memory += (config.batch_size as f64 * config.max_seq_length as f64 * 4.0)
        / (1024.0 * 1024.0 * 1024.0);

    (base_memory * 100.0).round() / 100.0
}

/// Range checks on a training configuration before estimation or submission.
pub fn validate_training_config(config: &TrainingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.num_epochs == 0 || config.num_epochs > 100 {
        errors.push("Number of epochs must be between 1 and 100".to_string());
    }
    if config.batch_size == 0 || config.batch_size > 128 {
        errors.push("Batch size must be between 1 and 128".to_string());
    }
    if config.max_seq_length == 0 || config.max_seq_length > 4096 {
        errors.push("Max sequence length must be between 1 and 4096".to_string());
    }
    if config.train_test_split <= 0.0 || config.train_test_split >= 1.0 {
        errors.push("Train/test split must be between 0 and 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_accelerated(device: &str) -> bool {
    matches!(device.trim().to_lowercase().as_str(), "cuda" | "mps")
}
