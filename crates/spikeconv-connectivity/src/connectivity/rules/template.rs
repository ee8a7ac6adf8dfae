// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Template connectivity - one detector grid per recognition class.

Each class template is scaled by its own factor and compiled with stride 1
from the shared integration grid. Classes never share connections and are
compiled independently (in parallel with the `parallel` feature).
*/

use super::convolution::compile_on_grid;
use crate::connectivity::connection::CompiledConnectivity;
use crate::kernel::{load_template, Kernel, TemplateStore};
use crate::spatial::GridDimensions;
use crate::types::{ConnectivityError, ConnectivityResult};
use tracing::info;

/// Template kernel of one recognition class and its weight scale
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTemplate {
    pub name: String,
    pub kernel: Kernel,
    pub scale: f64,
}

impl ClassTemplate {
    pub fn new(name: impl Into<String>, kernel: Kernel, scale: f64) -> Self {
        Self {
            name: name.into(),
            kernel,
            scale,
        }
    }
}

/// Compiled connectivity from the integration grid to one class's detector grid
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConnectivity {
    pub class_index: usize,
    pub class_name: String,
    pub compiled: CompiledConnectivity,
}

/// Ordered set of recognition templates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateBank {
    templates: Vec<ClassTemplate>,
}

impl TemplateBank {
    pub fn new(templates: Vec<ClassTemplate>) -> Self {
        Self { templates }
    }

    /// Load every class in `names` from `store`, pairing each with the scale
    /// at the same index.
    ///
    /// # Errors
    /// `MalformedData` if `names` and `scales` differ in length, plus any
    /// error from [`load_template`].
    pub fn load<S, T>(names: &[S], scales: &[f64], store: &T) -> ConnectivityResult<Self>
    where
        S: AsRef<str>,
        T: TemplateStore + ?Sized,
    {
        if names.len() != scales.len() {
            return Err(ConnectivityError::MalformedData(format!(
                "{} template classes but {} scale factors",
                names.len(),
                scales.len()
            )));
        }
        let templates = names
            .iter()
            .zip(scales)
            .enumerate()
            .map(|(idx, (name, &scale))| {
                let name: &str = name.as_ref();
                let kernel = load_template(idx, names, store)?;
                Ok(ClassTemplate::new(name, kernel, scale))
            })
            .collect::<ConnectivityResult<Vec<_>>>()?;
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &[ClassTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Compile every class against the integration grid
    pub fn compile(&self, integration: GridDimensions) -> ConnectivityResult<Vec<TemplateConnectivity>> {
        compile_templates(integration.width(), integration.height(), &self.templates)
    }
}

fn compile_class(
    integration: GridDimensions,
    class_index: usize,
    template: &ClassTemplate,
) -> ConnectivityResult<TemplateConnectivity> {
    let scaled = template.kernel.scaled(template.scale)?;
    let compiled = compile_on_grid(integration, &scaled, 1, 1)?;
    Ok(TemplateConnectivity {
        class_index,
        class_name: template.name.clone(),
        compiled,
    })
}

/// Compile each class template from an `integration_width x integration_height`
/// grid to its own detector grid.
///
/// Either every class compiles or an error is returned; there is no partial
/// result.
pub fn compile_templates(
    integration_width: usize,
    integration_height: usize,
    templates: &[ClassTemplate],
) -> ConnectivityResult<Vec<TemplateConnectivity>> {
    let integration = GridDimensions::new(integration_width, integration_height)?;

    #[cfg(feature = "parallel")]
    let compiled = {
        use rayon::prelude::*;
        templates
            .par_iter()
            .enumerate()
            .map(|(idx, t)| compile_class(integration, idx, t))
            .collect::<ConnectivityResult<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let compiled = templates
        .iter()
        .enumerate()
        .map(|(idx, t)| compile_class(integration, idx, t))
        .collect::<ConnectivityResult<Vec<_>>>()?;

    for class in &compiled {
        info!(
            target: "spikeconv-connectivity",
            "Template '{}': {} -> {}, {} excitatory, {} inhibitory",
            class.class_name,
            integration,
            class.compiled.output,
            class.compiled.connections.excitatory().len(),
            class.compiled.connections.inhibitory().len()
        );
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::InMemoryTemplateStore;

    fn store() -> InMemoryTemplateStore {
        [
            ("fist", vec![vec![1.0, -1.0], vec![-1.0, 1.0]]),
            ("hand", vec![vec![0.0, 2.0], vec![0.0, 0.0]]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_each_class_scaled_independently() {
        let bank = TemplateBank::load(&["fist", "hand"], &[0.5, 0.25], &store()).unwrap();
        let compiled = bank.compile(GridDimensions::square(4).unwrap()).unwrap();
        assert_eq!(compiled.len(), 2);

        let fist = &compiled[0];
        assert_eq!(fist.class_index, 0);
        assert_eq!(fist.class_name, "fist");
        assert_eq!(fist.compiled.output, GridDimensions::square(3).unwrap());
        assert_eq!(fist.compiled.connections.excitatory().len(), 18);
        assert_eq!(fist.compiled.connections.inhibitory().len(), 18);
        assert!(fist
            .compiled
            .connections
            .iter()
            .all(|(_, c)| c.weight.get() == 0.5));

        let hand = &compiled[1];
        assert_eq!(hand.compiled.connections.excitatory().len(), 9);
        assert!(hand.compiled.connections.inhibitory().is_empty());
        assert!(hand
            .compiled
            .connections
            .excitatory()
            .iter()
            .all(|c| c.weight.get() == 0.5));
    }

    #[test]
    fn test_scale_count_mismatch() {
        let err = TemplateBank::load(&["fist", "hand"], &[0.5], &store()).unwrap_err();
        assert!(matches!(err, ConnectivityError::MalformedData(_)));
    }

    #[test]
    fn test_one_bad_class_fails_whole_compile() {
        let templates = vec![
            ClassTemplate::new("small", Kernel::uniform(2, 2, 1.0).unwrap(), 1.0),
            ClassTemplate::new("huge", Kernel::uniform(9, 9, 1.0).unwrap(), 1.0),
        ];
        let err = compile_templates(4, 4, &templates).unwrap_err();
        assert!(matches!(err, ConnectivityError::InvalidGeometry(_)));
    }

    #[test]
    fn test_negative_scale_flips_polarity() {
        let templates = vec![ClassTemplate::new(
            "inverted",
            Kernel::uniform(1, 1, 2.0).unwrap(),
            -0.5,
        )];
        let compiled = compile_templates(2, 2, &templates).unwrap();
        let set = &compiled[0].compiled.connections;
        assert!(set.excitatory().is_empty());
        assert_eq!(set.inhibitory().len(), 4);
        assert_eq!(set.inhibitory()[0].weight.get(), 1.0);
    }
}
