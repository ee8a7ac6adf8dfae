// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `spikeconv.toml`. Every section is
//! optional; missing keys fall back to the gesture recognition network.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpikeconvConfig {
    pub system: SystemConfig,
    pub input: InputConfig,
    pub orientation: OrientationConfig,
    pub pooling: PoolingConfig,
    pub recognition: RecognitionConfig,
    pub export: ExportConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub debug: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

/// Retina grid and the one-to-one relay into the input layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub width: usize,
    pub height: usize,
    pub relay_weight: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            relay_weight: 6.0,
        }
    }
}

/// Oriented edge filter bank applied to the input layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Filter side length (odd)
    pub kernel_size: usize,
    /// Number of orientations, evenly spread over [0, pi)
    pub count: usize,
    pub scale: f64,
    pub frequency: f64,
    /// Multiplier applied to every filter entry
    pub weight_scale: f64,
    pub stride: usize,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            kernel_size: 17,
            count: 4,
            scale: 3.0,
            frequency: 1.0,
            weight_scale: 2.0,
            stride: 1,
        }
    }
}

impl OrientationConfig {
    /// Output side for an input side, or `None` if the filter does not fit
    pub fn output_side(&self, input: usize) -> Option<usize> {
        if self.kernel_size == 0 || self.stride == 0 || self.kernel_size > input {
            return None;
        }
        Some((input - self.kernel_size) / self.stride + 1)
    }
}

/// Pooling over each orientation map, plus the relay into the integration layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolingConfig {
    pub size: usize,
    pub shift: usize,
    pub weight: f64,
    pub integrate_weight: f64,
}

impl Default for PoolingConfig {
    fn default() -> Self {
        Self {
            size: 5,
            shift: 3,
            weight: 4.5,
            integrate_weight: 4.5,
        }
    }
}

impl PoolingConfig {
    pub fn output_side(&self, input: usize) -> Option<usize> {
        if self.size == 0 || self.shift == 0 || self.size > input {
            return None;
        }
        Some((input - self.size) / self.shift + 1)
    }
}

/// Template matching from the integration layer to one detector per class
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// JSON file mapping class name to template matrix; recognition is
    /// skipped when unset
    pub template_file: Option<PathBuf>,
    pub class_names: Vec<String>,
    /// Per-class weight scale, same order as `class_names`
    pub scales: Vec<f64>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            template_file: None,
            class_names: ["fist", "one", "two", "hand", "thumb"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scales: vec![0.14, 0.18, 0.2, 0.23, 0.22],
        }
    }
}

/// Connection list export
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Delay stamped on every exported row
    pub delay: u32,
    /// Maximum rows per projection descriptor (0 = unbounded)
    pub chunk_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delay: 1,
            chunk_size: 0,
        }
    }
}
