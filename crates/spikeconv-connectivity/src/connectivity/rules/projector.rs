// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Projector - direct layer-to-layer relay.

A 1x1 kernel with stride 1: every source neuron connects to the target with
the same id at one uniform excitatory weight. The result is exactly the
identity permutation of ids and the output grid equals the source grid.
*/

use super::convolution::compile_on_grid;
use crate::connectivity::connection::CompiledConnectivity;
use crate::kernel::Kernel;
use crate::spatial::GridDimensions;
use crate::types::{ConnectivityError, ConnectivityResult, SynapticWeight};

/// One-to-one projection over a `width x height` grid.
///
/// # Errors
/// `InvalidGeometry` for an empty grid, `InvalidWeight` if `weight` is not
/// finite and positive.
pub fn project_one_to_one(
    width: usize,
    height: usize,
    weight: f64,
) -> ConnectivityResult<CompiledConnectivity> {
    let grid = GridDimensions::new(width, height)?;
    let weight = SynapticWeight::new(weight).ok_or(ConnectivityError::InvalidWeight(weight))?;
    let kernel = Kernel::uniform(1, 1, weight.get())?;
    compile_on_grid(grid, &kernel, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NeuronId;

    #[test]
    fn test_identity_permutation() {
        let compiled = project_one_to_one(6, 4, 5.75).unwrap();
        assert_eq!(compiled.output, compiled.source);
        assert!(compiled.connections.inhibitory().is_empty());

        let exc = compiled.connections.excitatory();
        assert_eq!(exc.len(), 24);
        for (i, c) in exc.iter().enumerate() {
            assert_eq!(c.source, NeuronId(i as u32));
            assert_eq!(c.target, NeuronId(i as u32));
            assert_eq!(c.weight.get(), 5.75);
        }
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        assert!(matches!(
            project_one_to_one(4, 4, 0.0),
            Err(ConnectivityError::InvalidWeight(_))
        ));
        assert!(project_one_to_one(4, 4, f64::NAN).is_err());
        assert!(project_one_to_one(0, 4, 1.0).is_err());
    }
}
