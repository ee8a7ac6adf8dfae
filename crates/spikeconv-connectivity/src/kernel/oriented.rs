// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Oriented, frequency-modulated edge filters.

Each cell `(r, c)` is sampled at `x = c - mid`, `y = r - mid`, rotated by the
orientation angle, and evaluated as a Gaussian envelope times a cosine
carrier along the rotated x axis:

```text
x' =  x cos(theta) + y sin(theta)
y' = -x sin(theta) + y cos(theta)
k  = exp(-(x'^2 + y'^2) / (2 scale^2)) * cos(frequency * x')
```
*/

use super::Kernel;
use crate::types::{ConnectivityError, ConnectivityResult};
use ndarray::Array2;
use std::f64::consts::PI;
use tracing::info;

/// Shape parameters shared by every filter of an orientation bank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedFilterParams {
    /// Side length (odd)
    pub size: usize,
    /// Envelope standard deviation in cells
    pub scale: f64,
    /// Carrier angular frequency (radians per cell)
    pub frequency: f64,
}

impl OrientedFilterParams {
    pub fn validate(&self) -> ConnectivityResult<()> {
        if self.size == 0 || self.size % 2 == 0 {
            return Err(ConnectivityError::InvalidGeometry(format!(
                "oriented filter size must be odd, got {}",
                self.size
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConnectivityError::InvalidGeometry(format!(
                "oriented filter scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.frequency.is_finite() {
            return Err(ConnectivityError::InvalidGeometry(format!(
                "oriented filter frequency must be finite, got {}",
                self.frequency
            )));
        }
        Ok(())
    }
}

/// Generate a `size x size` oriented filter centred on the middle cell.
///
/// Identical parameters always produce an identical kernel.
///
/// # Errors
/// `InvalidGeometry` for an even or zero `size`, a non-positive `scale`, or
/// a non-finite `orientation`/`frequency`.
pub fn generate_oriented_filter(
    size: usize,
    orientation: f64,
    scale: f64,
    frequency: f64,
) -> ConnectivityResult<Kernel> {
    let params = OrientedFilterParams {
        size,
        scale,
        frequency,
    };
    params.validate()?;
    if !orientation.is_finite() {
        return Err(ConnectivityError::InvalidGeometry(format!(
            "orientation must be finite, got {}",
            orientation
        )));
    }

    let mid = (size / 2) as f64;
    let (sin_t, cos_t) = orientation.sin_cos();
    let two_sigma_sq = 2.0 * scale * scale;

    let weights = Array2::from_shape_fn((size, size), |(r, c)| {
        let x = c as f64 - mid;
        let y = r as f64 - mid;
        let xr = x * cos_t + y * sin_t;
        let yr = -x * sin_t + y * cos_t;
        (-(xr * xr + yr * yr) / two_sigma_sq).exp() * (frequency * xr).cos()
    });

    Kernel::from_array(weights)
}

/// `count` filters at orientations `i / count * pi`, each multiplied by
/// `weight_scale`.
pub fn oriented_filter_bank(
    params: OrientedFilterParams,
    count: usize,
    weight_scale: f64,
) -> ConnectivityResult<Vec<Kernel>> {
    params.validate()?;
    if count == 0 {
        return Err(ConnectivityError::InvalidGeometry(
            "orientation bank needs at least one orientation".to_string(),
        ));
    }

    let build = |i: usize| -> ConnectivityResult<Kernel> {
        let orientation = i as f64 / count as f64 * PI;
        generate_oriented_filter(params.size, orientation, params.scale, params.frequency)?
            .scaled(weight_scale)
    };

    #[cfg(feature = "parallel")]
    let bank = {
        use rayon::prelude::*;
        (0..count)
            .into_par_iter()
            .map(build)
            .collect::<ConnectivityResult<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let bank = (0..count)
        .map(build)
        .collect::<ConnectivityResult<Vec<_>>>()?;

    info!(
        target: "spikeconv-connectivity",
        "Generated orientation bank: {} filters of {}x{}",
        count, params.size, params.size
    );
    Ok(bank)
}
