// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Kernel-to-synapse compilation.

Every rule reduces to the same walk: for each output neuron, place the kernel
window over the source grid and emit one connection per nonzero kernel entry,
routed to the excitatory or inhibitory list by the entry's sign.
*/

pub mod connection;
pub mod rules;

pub use connection::{CompiledConnectivity, Connection, ConnectionRow, ConnectionSet};
pub use rules::{
    compile, compile_on_grid, compile_pooling, compile_templates, project_one_to_one,
    ClassTemplate, ConvolutionPlan, TemplateBank, TemplateConnectivity,
};
