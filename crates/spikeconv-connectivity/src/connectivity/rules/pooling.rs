// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Pooling connectivity - block downsampling with a uniform excitatory window.

Equivalent to a convolution with a `pool_size x pool_size` kernel whose
entries all equal `weight`, strided by `pool_shift` on both axes.

- `pool_shift == pool_size`: windows tile the grid, every covered source
  feeds exactly one target
- `pool_shift < pool_size`: windows overlap, a source may feed several targets
- `pool_shift > pool_size`: gaps, some sources feed nothing (see
  [`CompiledConnectivity::uncovered_sources`])
*/

use super::convolution::ConvolutionPlan;
use crate::connectivity::connection::CompiledConnectivity;
use crate::kernel::Kernel;
use crate::spatial::GridDimensions;
use crate::types::{ConnectivityError, ConnectivityResult, SynapticWeight};
use tracing::debug;

/// Compile a pooling layer over a `source_width x source_height` grid.
///
/// # Errors
/// - `InvalidGeometry` for a zero pool size, zero shift, or a window larger
///   than the grid
/// - `InvalidWeight` if `weight` is not finite and positive
pub fn compile_pooling(
    source_width: usize,
    source_height: usize,
    pool_size: usize,
    pool_shift: usize,
    weight: f64,
) -> ConnectivityResult<CompiledConnectivity> {
    let source = GridDimensions::new(source_width, source_height)?;
    if pool_size == 0 {
        return Err(ConnectivityError::InvalidGeometry(
            "pool size must be at least 1".to_string(),
        ));
    }
    let weight = SynapticWeight::new(weight).ok_or(ConnectivityError::InvalidWeight(weight))?;

    let window = Kernel::uniform(pool_size, pool_size, weight.get())?;
    let compiled = ConvolutionPlan::new(source, &window, pool_shift, pool_shift)?.compile();

    if pool_shift > pool_size {
        let uncovered = compiled.uncovered_sources().len();
        debug!(
            target: "spikeconv-connectivity",
            "Pooling {} (size {}, shift {}) leaves {} source neurons unconnected",
            source, pool_size, pool_shift, uncovered
        );
    }

    Ok(compiled)
}
