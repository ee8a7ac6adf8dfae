// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeconv
//!
//! Compiles the synaptic wiring of a convolutional spiking network: dense
//! 2-D kernels (oriented edge filters, pooling windows, class templates) in,
//! sparse excitatory/inhibitory connection lists between neuron grids out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spikeconv::prelude::*;
//!
//! let kernel = generate_oriented_filter(17, 0.0, 3.0, 1.0)?;
//! let compiled = compile(128, 128, &kernel, 1, 1)?;
//! assert_eq!(compiled.output_width(), 112);
//! # Ok::<(), spikeconv::connectivity::ConnectivityError>(())
//! ```
//!
//! ## Whole network
//!
//! ```rust,no_run
//! use spikeconv::config::{load_config, SpikeconvConfig};
//! use spikeconv::network::build_network;
//!
//! let config = load_config(None, None).unwrap_or_else(|_| SpikeconvConfig::default());
//! let network = build_network(&config, None)?;
//! println!("{} connections", network.total_connections());
//! # Ok::<(), spikeconv::network::NetworkError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`parallel`** (default): rayon-parallel orientation banks and template classes
//! - **`file-logging`**: per-run log folders for the command-line tools
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  spikeconv-config                                       │
//! │  (spikeconv.toml + env/CLI overrides, validation)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  spikeconv::network                                     │
//! │  (retina → orientation → pooling → recognition)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  spikeconv-connectivity                                 │
//! │  (kernels, grid geometry, connectivity rules, export)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub mod network;

pub use spikeconv_config as config;
pub use spikeconv_connectivity as connectivity;
pub use spikeconv_observability as observability;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::connectivity::{
        compile, compile_on_grid, compile_pooling, compile_templates, generate_oriented_filter,
        oriented_filter_bank, project_one_to_one, CompiledConnectivity, ConnectionSet,
        GridDimensions, Kernel, ProjectionDescriptor, SynapseType, TemplateBank, TemplateStore,
    };
    pub use crate::network::{build_network, CompiledNetwork, LayerProjection};
}
