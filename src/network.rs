// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Gesture network assembly.

Compiles every projection of the layered recognition network described by a
[`SpikeconvConfig`]:

```text
retina ──1:1──▶ input ──oriented filter i──▶ orientation_i ──pool──▶ pool_i
pool_i ──1:1──▶ pool_integrate ──template k──▶ recognition_k
```

Projections that repeat per orientation share one compiled connectivity.
*/

use std::collections::BTreeMap;
use std::sync::Arc;

use spikeconv_config::{validate_config, ConfigError, SpikeconvConfig};
use spikeconv_connectivity::{
    compile, compile_pooling, oriented_filter_bank, project_one_to_one, CompiledConnectivity,
    ConnectivityError, GridDimensions, OrientedFilterParams, ProjectionDescriptor, TemplateBank,
    TemplateStore,
};
use tracing::{debug, info};

/// Errors raised while assembling a network
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// One projection between two named populations
#[derive(Debug, Clone)]
pub struct LayerProjection {
    pub pre: String,
    pub post: String,
    pub connectivity: Arc<CompiledConnectivity>,
}

impl LayerProjection {
    fn new(pre: impl Into<String>, post: impl Into<String>, connectivity: Arc<CompiledConnectivity>) -> Self {
        Self {
            pre: pre.into(),
            post: post.into(),
            connectivity,
        }
    }
}

/// Every projection of a compiled network, in layer order
#[derive(Debug, Clone, Default)]
pub struct CompiledNetwork {
    pub projections: Vec<LayerProjection>,
}

impl CompiledNetwork {
    /// Projections ending at `post`
    pub fn projections_into(&self, post: &str) -> impl Iterator<Item = &LayerProjection> + '_ {
        let post = post.to_string();
        self.projections.iter().filter(move |p| p.post == post)
    }

    pub fn total_connections(&self) -> usize {
        self.projections
            .iter()
            .map(|p| p.connectivity.connections.len())
            .sum()
    }

    /// Grid of every population named by a projection, keyed by label.
    ///
    /// Includes targets whose projections compiled to no connections.
    pub fn populations(&self) -> BTreeMap<String, GridDimensions> {
        let mut populations = BTreeMap::new();
        for p in &self.projections {
            populations.insert(p.pre.clone(), p.connectivity.source);
            populations.insert(p.post.clone(), p.connectivity.output);
        }
        populations
    }

    /// Runtime descriptors for every projection
    pub fn descriptors(&self, delay: u32, chunk_size: usize) -> Vec<ProjectionDescriptor> {
        self.projections
            .iter()
            .flat_map(|p| {
                ProjectionDescriptor::from_compiled(&p.connectivity, &p.pre, &p.post, delay, chunk_size)
            })
            .collect()
    }
}

pub const RETINA: &str = "retina";
pub const INPUT: &str = "input";
pub const INTEGRATE: &str = "pool_integrate";

pub fn orientation_label(index: usize) -> String {
    format!("orientation_{}", index)
}

pub fn pool_label(index: usize) -> String {
    format!("pool_{}", index)
}

pub fn recognition_label(class_name: &str) -> String {
    format!("recognition_{}", class_name)
}

/// Compile the network described by `config`
///
/// Recognition projections are compiled only when `templates` is given.
///
/// # Errors
/// Configuration problems are reported as a whole before anything is
/// compiled; otherwise the first connectivity error aborts the build.
pub fn build_network(
    config: &SpikeconvConfig,
    templates: Option<&dyn TemplateStore>,
) -> NetworkResult<CompiledNetwork> {
    validate_config(config)?;
    let mut network = CompiledNetwork::default();

    let relay = project_one_to_one(config.input.width, config.input.height, config.input.relay_weight)?;
    let input_grid = relay.output;
    network
        .projections
        .push(LayerProjection::new(RETINA, INPUT, Arc::new(relay)));

    let orientation = &config.orientation;
    let params = OrientedFilterParams {
        size: orientation.kernel_size,
        scale: orientation.scale,
        frequency: orientation.frequency,
    };
    let bank = oriented_filter_bank(params, orientation.count, orientation.weight_scale)?;

    let mut orientation_grid: Option<GridDimensions> = None;
    for (idx, kernel) in bank.iter().enumerate() {
        let compiled = compile(
            input_grid.width(),
            input_grid.height(),
            kernel,
            orientation.stride,
            orientation.stride,
        )?;
        orientation_grid = Some(compiled.output);
        network
            .projections
            .push(LayerProjection::new(INPUT, orientation_label(idx), Arc::new(compiled)));
    }
    let orientation_grid = orientation_grid.ok_or_else(|| {
        ConnectivityError::InvalidGeometry("orientation bank is empty".to_string())
    })?;

    let pooling = &config.pooling;
    let pooled = Arc::new(compile_pooling(
        orientation_grid.width(),
        orientation_grid.height(),
        pooling.size,
        pooling.shift,
        pooling.weight,
    )?);
    let integration_grid = pooled.output;
    let integrate = Arc::new(project_one_to_one(
        integration_grid.width(),
        integration_grid.height(),
        pooling.integrate_weight,
    )?);
    for idx in 0..bank.len() {
        network.projections.push(LayerProjection::new(
            orientation_label(idx),
            pool_label(idx),
            Arc::clone(&pooled),
        ));
        network.projections.push(LayerProjection::new(
            pool_label(idx),
            INTEGRATE,
            Arc::clone(&integrate),
        ));
    }
    debug!(
        target: "spikeconv::network",
        "Feature layers: input {} -> orientation {} -> integration {}",
        input_grid, orientation_grid, integration_grid
    );

    if let Some(store) = templates {
        let recognition = &config.recognition;
        let bank = TemplateBank::load(&recognition.class_names, &recognition.scales, store)?;
        for class in bank.compile(integration_grid)? {
            network.projections.push(LayerProjection::new(
                INTEGRATE,
                recognition_label(&class.class_name),
                Arc::new(class.compiled),
            ));
        }
    }

    info!(
        target: "spikeconv::network",
        "Compiled {} projections, {} connections",
        network.projections.len(),
        network.total_connections()
    );
    Ok(network)
}
