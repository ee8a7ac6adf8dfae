// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity rules. Each rule lives in its own module.
*/

pub mod convolution;
pub mod pooling;
pub mod projector;
pub mod template;

pub use convolution::{compile, compile_on_grid, ConvolutionPlan};
pub use pooling::compile_pooling;
pub use projector::project_one_to_one;
pub use template::{compile_templates, ClassTemplate, TemplateBank, TemplateConnectivity};
