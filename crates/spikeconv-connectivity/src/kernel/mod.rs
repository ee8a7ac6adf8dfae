// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Dense 2-D kernels.

A [`Kernel`] is an immutable `height x width` matrix of finite weights,
addressed `[row][col]` with row 0 at the top. Kernels come from the oriented
filter generator, from uniform pooling windows, or from a template store.
*/

pub mod oriented;
pub mod template;

pub use oriented::{generate_oriented_filter, oriented_filter_bank, OrientedFilterParams};
pub use template::{load_template, InMemoryTemplateStore, JsonTemplateStore, TemplateStore};

use crate::types::{ConnectivityError, ConnectivityResult};
use ndarray::Array2;

/// Immutable, rectangular, finite-valued weight matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    /// Build a kernel from nested rows.
    ///
    /// # Errors
    /// `MalformedData` if there are no rows, a row is empty, rows differ in
    /// length, or any entry is NaN/infinite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ConnectivityResult<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(ConnectivityError::MalformedData(
                "kernel has no entries".to_string(),
            ));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ConnectivityError::MalformedData(format!(
                "ragged kernel: row {} has {} entries, expected {}",
                idx,
                row.len(),
                width
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| ConnectivityError::MalformedData(e.to_string()))?;
        Self::from_array(weights)
    }

    /// Wrap an existing matrix after checking it is non-empty and finite
    pub fn from_array(weights: Array2<f64>) -> ConnectivityResult<Self> {
        let (height, width) = weights.dim();
        if height == 0 || width == 0 {
            return Err(ConnectivityError::MalformedData(
                "kernel has no entries".to_string(),
            ));
        }
        if let Some(((r, c), v)) = weights.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConnectivityError::MalformedData(format!(
                "non-finite weight {} at [{}][{}]",
                v, r, c
            )));
        }
        Ok(Self { weights })
    }

    /// `height x width` kernel with every entry equal to `value`
    pub fn uniform(height: usize, width: usize, value: f64) -> ConnectivityResult<Self> {
        Self::from_array(Array2::from_elem((height, width), value))
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.weights.nrows()
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.weights.get((row, col)).copied()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.weights
    }

    /// New kernel with every entry multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> ConnectivityResult<Self> {
        Self::from_array(self.weights.mapv(|w| w * factor))
    }

    /// Nonzero entries as `(row, col, value)`, row-major
    pub fn nonzero_entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.weights
            .indexed_iter()
            .filter(|&(_, &v)| v != 0.0)
            .map(|((r, c), &v)| (r, c, v))
    }

    pub fn nonzero_count(&self) -> usize {
        self.weights.iter().filter(|&&v| v != 0.0).count()
    }

    /// Count of strictly positive entries
    pub fn positive_count(&self) -> usize {
        self.weights.iter().filter(|&&v| v > 0.0).count()
    }

    /// Count of strictly negative entries
    pub fn negative_count(&self) -> usize {
        self.weights.iter().filter(|&&v| v < 0.0).count()
    }

    pub fn is_all_zero(&self) -> bool {
        self.weights.iter().all(|&v| v == 0.0)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.weights.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}
