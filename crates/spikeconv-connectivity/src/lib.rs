// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spikeconv-connectivity

Kernel-to-synapse connectivity compiler for layered spiking networks.

Turns dense 2-D kernels (oriented edge filters, pooling windows, recognition
templates) into sparse excitatory/inhibitory connection lists between
rectangular neuron grids, without ever building a dense connectivity matrix.

## Pipeline

```text
Kernel (oriented filter | uniform window | loaded template)
   ↓
GridGeometry (output size, window origins)
   ↓
ConvolutionPlan → ConnectionSet { excitatory, inhibitory } + output grid
   ↓
ProjectionDescriptor rows for the simulation runtime
```

All operations are pure: explicit grid sizes and kernels in, freshly
allocated connection data out. Errors are reported before any connection is
emitted.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectivity;
pub mod export;
pub mod kernel;
pub mod spatial;
pub mod types;

pub use connectivity::{
    compile, compile_on_grid, compile_pooling, compile_templates, project_one_to_one,
    ClassTemplate, CompiledConnectivity, Connection, ConnectionRow, ConnectionSet,
    ConvolutionPlan, TemplateBank, TemplateConnectivity,
};
pub use export::ProjectionDescriptor;
pub use kernel::{
    generate_oriented_filter, load_template, oriented_filter_bank, InMemoryTemplateStore,
    JsonTemplateStore, Kernel, OrientedFilterParams, TemplateStore,
};
pub use spatial::{from_linear, output_size, to_linear, window_origin, GridDimensions};
pub use types::{ConnectivityError, ConnectivityResult, NeuronId, SynapseType, SynapticWeight};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_projection() {
        // Smoke test to ensure modules compile together
        let result = project_one_to_one(128, 128, 6.0);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().connections.len(), 128 * 128);
    }
}
