// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Projection descriptors handed to the simulation runtime.

A compiled layer becomes one descriptor per polarity (and per chunk when a
chunk limit is set). Empty polarity lists produce no descriptor. Every
descriptor carries both grid sizes so the runtime can size the populations.
*/

use crate::connectivity::{CompiledConnectivity, ConnectionRow};
use crate::spatial::GridDimensions;
use crate::types::SynapseType;
use serde::Serialize;

/// List-based projection between two named populations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionDescriptor {
    pub label: String,
    pub pre: String,
    pub post: String,
    pub receptor: SynapseType,
    pub pre_grid: GridDimensions,
    pub post_grid: GridDimensions,
    pub rows: Vec<ConnectionRow>,
}

impl ProjectionDescriptor {
    /// Descriptors for both polarities of `compiled`.
    ///
    /// `chunk_size` bounds the rows per descriptor (`0` = unbounded).
    pub fn from_compiled(
        compiled: &CompiledConnectivity,
        pre: &str,
        post: &str,
        delay: u32,
        chunk_size: usize,
    ) -> Vec<Self> {
        let mut out = Vec::new();
        for receptor in [SynapseType::Excitatory, SynapseType::Inhibitory] {
            for (idx, chunk) in compiled.connections.chunks(receptor, chunk_size).enumerate() {
                let rows = chunk
                    .iter()
                    .map(|c| ConnectionRow::from_connection(c, delay))
                    .collect();
                out.push(Self {
                    label: format!("{}->{}:{}#{}", pre, post, receptor, idx),
                    pre: pre.to_string(),
                    post: post.to_string(),
                    receptor,
                    pre_grid: compiled.source,
                    post_grid: compiled.output,
                    rows,
                });
            }
        }
        out
    }
}
