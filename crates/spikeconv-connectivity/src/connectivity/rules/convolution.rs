// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Convolution connectivity - expands one kernel into sparse connection lists.

```text
for (out_row, out_col) in output grid:
    origin = (out_row * stride_row, out_col * stride_col)
    for (kr, kc) in nonzero kernel entries:
        source = (origin.row + kr) * source_width + (origin.col + kc)
        target = out_row * output_width + out_col
        -> excitatory if k > 0, inhibitory if k < 0, weight |k|
```

All validation happens in [`ConvolutionPlan::new`], before anything is
emitted. The plan can then be streamed with [`ConvolutionPlan::iter`] or
collected into pre-sized lists with [`ConvolutionPlan::compile`].
*/

use crate::connectivity::connection::{CompiledConnectivity, Connection, ConnectionSet};
use crate::kernel::Kernel;
use crate::spatial::{GridDimensions, WindowGeometry};
use crate::types::{ConnectivityResult, NeuronId, SynapseType, SynapticWeight};
use tracing::{debug, warn};

/// A nonzero kernel entry, pre-split into polarity and magnitude
#[derive(Debug, Clone, Copy)]
struct Tap {
    row: usize,
    col: usize,
    synapse_type: SynapseType,
    weight: SynapticWeight,
}

/// Validated convolution of one kernel over one source grid
#[derive(Debug, Clone)]
pub struct ConvolutionPlan {
    geometry: WindowGeometry,
    taps: Vec<Tap>,
}

impl ConvolutionPlan {
    /// # Errors
    /// `InvalidGeometry` if the kernel does not fit the source grid or a
    /// stride is zero.
    pub fn new(
        source: GridDimensions,
        kernel: &Kernel,
        stride_row: usize,
        stride_col: usize,
    ) -> ConnectivityResult<Self> {
        let geometry =
            WindowGeometry::new(source, kernel.height(), kernel.width(), stride_row, stride_col)?;

        let taps = kernel
            .nonzero_entries()
            .filter_map(|(row, col, value)| {
                let synapse_type = SynapseType::of(value)?;
                let weight = SynapticWeight::magnitude_of(value)?;
                Some(Tap {
                    row,
                    col,
                    synapse_type,
                    weight,
                })
            })
            .collect();

        Ok(Self { geometry, taps })
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    pub fn source(&self) -> GridDimensions {
        self.geometry.source()
    }

    pub fn output(&self) -> GridDimensions {
        self.geometry.output()
    }

    fn tap_count(&self, synapse_type: SynapseType) -> usize {
        self.taps
            .iter()
            .filter(|t| t.synapse_type == synapse_type)
            .count()
    }

    /// Exact number of excitatory connections the plan emits
    pub fn excitatory_count(&self) -> usize {
        self.tap_count(SynapseType::Excitatory) * self.output().neuron_count()
    }

    /// Exact number of inhibitory connections the plan emits
    pub fn inhibitory_count(&self) -> usize {
        self.tap_count(SynapseType::Inhibitory) * self.output().neuron_count()
    }

    /// True when the kernel has no nonzero entry (the layer is a no-op)
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Lazily emit every connection, output neuron by output neuron
    pub fn iter(&self) -> impl Iterator<Item = (SynapseType, Connection)> + '_ {
        let source = self.geometry.source();
        let output = self.geometry.output();
        let out_rows = output.height();
        let out_cols = output.width();

        (0..out_rows)
            .flat_map(move |out_row| (0..out_cols).map(move |out_col| (out_row, out_col)))
            .flat_map(move |(out_row, out_col)| {
                let (origin_row, origin_col) = self.geometry.origin(out_row, out_col);
                let target = output.neuron_id(out_row, out_col);
                self.taps.iter().map(move |tap| {
                    let src: NeuronId =
                        source.neuron_id(origin_row + tap.row, origin_col + tap.col);
                    (tap.synapse_type, Connection::new(src, target, tap.weight))
                })
            })
    }

    /// Collect the plan into pre-sized excitatory/inhibitory lists
    pub fn compile(&self) -> CompiledConnectivity {
        let mut connections =
            ConnectionSet::with_capacity(self.excitatory_count(), self.inhibitory_count());
        for (synapse_type, connection) in self.iter() {
            connections.push(synapse_type, connection);
        }

        if self.is_empty() {
            warn!(
                target: "spikeconv-connectivity",
                "Kernel {}x{} has no nonzero entries; {} -> {} compiles to no connections",
                self.geometry.window().0,
                self.geometry.window().1,
                self.source(),
                self.output()
            );
        } else {
            debug!(
                target: "spikeconv-connectivity",
                "Compiled {}x{} kernel (stride {:?}): {} -> {}, {} excitatory, {} inhibitory",
                self.geometry.window().0,
                self.geometry.window().1,
                self.geometry.strides(),
                self.source(),
                self.output(),
                connections.excitatory().len(),
                connections.inhibitory().len()
            );
        }

        CompiledConnectivity {
            connections,
            source: self.source(),
            output: self.output(),
        }
    }
}

/// Compile `kernel` over a `source_width x source_height` grid.
///
/// Returns the connection lists plus the output grid the target population
/// must be created with. No partial result is returned on error.
pub fn compile(
    source_width: usize,
    source_height: usize,
    kernel: &Kernel,
    stride_row: usize,
    stride_col: usize,
) -> ConnectivityResult<CompiledConnectivity> {
    let source = GridDimensions::new(source_width, source_height)?;
    compile_on_grid(source, kernel, stride_row, stride_col)
}

/// [`compile`] for an already validated source grid
pub fn compile_on_grid(
    source: GridDimensions,
    kernel: &Kernel,
    stride_row: usize,
    stride_col: usize,
) -> ConnectivityResult<CompiledConnectivity> {
    Ok(ConvolutionPlan::new(source, kernel, stride_row, stride_col)?.compile())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConnectivityError;

    #[test]
    fn test_all_ones_3x3_over_5x5() {
        let kernel = Kernel::uniform(3, 3, 1.0).unwrap();
        let compiled = compile(5, 5, &kernel, 1, 1).unwrap();

        assert_eq!(compiled.output_width(), 3);
        assert_eq!(compiled.output_height(), 3);
        assert_eq!(compiled.connections.excitatory().len(), 81);
        assert!(compiled.connections.inhibitory().is_empty());
        assert!(compiled.target_fan_in().iter().all(|&n| n == 9));
        assert!(compiled
            .connections
            .excitatory()
            .iter()
            .all(|c| c.weight.get() == 1.0));
    }

    #[test]
    fn test_window_sources_for_one_target() {
        let kernel = Kernel::uniform(3, 3, 1.0).unwrap();
        let compiled = compile(5, 5, &kernel, 1, 1).unwrap();
        // Output (1, 2) -> id 5, window origin (1, 2) in the 5-wide source
        let mut sources: Vec<u32> = compiled
            .incoming(NeuronId(5))
            .map(|(_, c)| c.source.0)
            .collect();
        sources.sort_unstable();
        assert_eq!(sources, vec![7, 8, 9, 12, 13, 14, 17, 18, 19]);
    }

    #[test]
    fn test_signed_kernel_split() {
        let kernel = Kernel::from_rows(vec![vec![0.5, -0.25], vec![0.0, -1.0]]).unwrap();
        let compiled = compile(3, 2, &kernel, 1, 1).unwrap();

        // Output is 2 wide, 1 high
        assert_eq!(compiled.output, GridDimensions::new(2, 1).unwrap());
        let exc = compiled.connections.excitatory();
        let inh = compiled.connections.inhibitory();
        assert_eq!(exc.len(), 2);
        assert_eq!(inh.len(), 4);
        assert!(inh.iter().all(|c| c.weight.get() > 0.0));

        assert_eq!(
            exc[0],
            Connection::new(NeuronId(0), NeuronId(0), SynapticWeight::new(0.5).unwrap())
        );
        assert_eq!(
            exc[1],
            Connection::new(NeuronId(1), NeuronId(1), SynapticWeight::new(0.5).unwrap())
        );
        let to_second: Vec<(u32, f64)> = inh
            .iter()
            .filter(|c| c.target == NeuronId(1))
            .map(|c| (c.source.0, c.weight.get()))
            .collect();
        assert_eq!(to_second, vec![(2, 0.25), (5, 1.0)]);
    }

    #[test]
    fn test_independent_strides() {
        let kernel = Kernel::uniform(2, 2, 1.0).unwrap();
        let compiled = compile(6, 4, &kernel, 2, 1).unwrap();
        assert_eq!(compiled.output_width(), 5);
        assert_eq!(compiled.output_height(), 2);
        // Second output row starts two source rows down
        let mut sources: Vec<u32> = compiled
            .incoming(NeuronId(5))
            .map(|(_, c)| c.source.0)
            .collect();
        sources.sort_unstable();
        assert_eq!(sources, vec![12, 13, 18, 19]);
    }

    #[test]
    fn test_all_zero_kernel_is_noop() {
        let kernel = Kernel::uniform(3, 3, 0.0).unwrap();
        let compiled = compile(10, 8, &kernel, 1, 1).unwrap();
        assert!(compiled.connections.is_empty());
        assert_eq!(compiled.output, GridDimensions::new(8, 6).unwrap());
    }

    #[test]
    fn test_kernel_larger_than_grid() {
        let kernel = Kernel::uniform(5, 5, 1.0).unwrap();
        let err = compile(4, 10, &kernel, 1, 1).unwrap_err();
        assert!(matches!(err, ConnectivityError::InvalidGeometry(_)));
        assert!(compile(10, 10, &kernel, 0, 1).is_err());
        assert!(compile(0, 10, &kernel, 1, 1).is_err());
    }

    #[test]
    fn test_plan_counts_match_emission() {
        let kernel = Kernel::from_rows(vec![vec![1.0, -2.0, 0.0], vec![0.0, 3.0, -4.0]]).unwrap();
        let plan = ConvolutionPlan::new(GridDimensions::new(9, 7).unwrap(), &kernel, 2, 3).unwrap();
        let streamed: Vec<_> = plan.iter().collect();
        let compiled = plan.compile();
        assert_eq!(plan.excitatory_count(), compiled.connections.excitatory().len());
        assert_eq!(plan.inhibitory_count(), compiled.connections.inhibitory().len());
        assert_eq!(streamed.len(), compiled.connections.len());
    }
}
