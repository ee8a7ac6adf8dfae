// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that every layer of the described network fits the layer feeding
//! it, and that weights and counts are usable. All problems are collected
//! before returning.

use crate::{ConfigError, ConfigResult, SpikeconvConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    LayerMismatch { layer: String, reason: String },
    CountMismatch { left: String, right: String, left_len: usize, right_len: usize },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::LayerMismatch { layer, reason } => {
                write!(f, "Layer '{}' does not fit its input: {}", layer, reason)
            }
            Self::CountMismatch {
                left,
                right,
                left_len,
                right_len,
            } => {
                write!(
                    f,
                    "{} has {} entries but {} has {}",
                    left, left_len, right, right_len
                )
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SpikeconvConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_weights(config, &mut errors);
    validate_layer_chain(config, &mut errors);
    validate_recognition(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: &str, reason: &str) {
    errors.push(ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    });
}

fn validate_system(config: &SpikeconvConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(
            errors,
            "system.log_level",
            "must be one of trace, debug, info, warn, error",
        );
    }
}

/// Uniform weights must be positive; multipliers must be finite and non-zero
fn validate_weights(config: &SpikeconvConfig, errors: &mut Vec<ConfigValidationError>) {
    let positive = [
        ("input.relay_weight", config.input.relay_weight),
        ("pooling.weight", config.pooling.weight),
        ("pooling.integrate_weight", config.pooling.integrate_weight),
    ];
    for (field, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            invalid(errors, field, "must be finite and positive");
        }
    }

    let w = config.orientation.weight_scale;
    if !w.is_finite() || w == 0.0 {
        invalid(errors, "orientation.weight_scale", "must be finite and non-zero");
    }
    if !(config.orientation.scale.is_finite() && config.orientation.scale > 0.0) {
        invalid(errors, "orientation.scale", "must be finite and positive");
    }
    if !config.orientation.frequency.is_finite() {
        invalid(errors, "orientation.frequency", "must be finite");
    }
}

fn validate_layer_chain(config: &SpikeconvConfig, errors: &mut Vec<ConfigValidationError>) {
    let input = &config.input;
    if input.width == 0 || input.height == 0 {
        invalid(errors, "input", "width and height must be at least 1");
        return;
    }

    let orientation = &config.orientation;
    if orientation.count == 0 {
        invalid(errors, "orientation.count", "must be at least 1");
    }
    if orientation.stride == 0 {
        invalid(errors, "orientation.stride", "must be at least 1");
    }
    if orientation.kernel_size == 0 || orientation.kernel_size % 2 == 0 {
        invalid(errors, "orientation.kernel_size", "must be odd");
    }

    let conv = orientation
        .output_side(input.width)
        .zip(orientation.output_side(input.height));
    let (conv_w, conv_h) = match conv {
        Some(sides) => sides,
        None => {
            if orientation.stride > 0 && orientation.kernel_size > 0 {
                errors.push(ConfigValidationError::LayerMismatch {
                    layer: "orientation".to_string(),
                    reason: format!(
                        "{}x{} filter is larger than the {}x{} input",
                        orientation.kernel_size,
                        orientation.kernel_size,
                        input.width,
                        input.height
                    ),
                });
            }
            return;
        }
    };

    let pooling = &config.pooling;
    if pooling.size == 0 {
        invalid(errors, "pooling.size", "must be at least 1");
    }
    if pooling.shift == 0 {
        invalid(errors, "pooling.shift", "must be at least 1");
    }
    if pooling.size > 0 && pooling.shift > 0 && pooling.output_side(conv_w.min(conv_h)).is_none() {
        errors.push(ConfigValidationError::LayerMismatch {
            layer: "pooling".to_string(),
            reason: format!(
                "{}x{} window is larger than the {}x{} orientation map",
                pooling.size, pooling.size, conv_w, conv_h
            ),
        });
    }
}

fn validate_recognition(config: &SpikeconvConfig, errors: &mut Vec<ConfigValidationError>) {
    let recognition = &config.recognition;
    if recognition.class_names.len() != recognition.scales.len() {
        errors.push(ConfigValidationError::CountMismatch {
            left: "recognition.class_names".to_string(),
            right: "recognition.scales".to_string(),
            left_len: recognition.class_names.len(),
            right_len: recognition.scales.len(),
        });
    }
    if recognition.class_names.iter().any(|n| n.trim().is_empty()) {
        invalid(errors, "recognition.class_names", "names must not be empty");
    }
    if recognition.scales.iter().any(|s| !s.is_finite()) {
        invalid(errors, "recognition.scales", "must be finite");
    }
    if let Some(path) = &recognition.template_file {
        if path.as_os_str().is_empty() {
            invalid(errors, "recognition.template_file", "must not be empty when set");
        }
    }
}
