// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Rectangular neuron grids and their linear id layout.
*/

use crate::types::{ConnectivityError, ConnectivityResult, NeuronId};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Flatten `(row, col)` into a linear id for a grid of the given width.
#[inline]
pub fn to_linear(row: usize, col: usize, width: usize) -> usize {
    debug_assert!(col < width, "column {} outside width {}", col, width);
    row * width + col
}

/// Inverse of [`to_linear`]: `(row, col)` for a linear id.
#[inline]
pub fn from_linear(id: usize, width: usize) -> (usize, usize) {
    debug_assert!(width > 0);
    (id / width, id % width)
}

/// Width and height of a 2-D neuron grid.
///
/// Both axes are non-zero and `width * height` fits in a [`NeuronId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct GridDimensions {
    width: usize,
    height: usize,
}

/// Unchecked wire form, validated through [`GridDimensions::new`]
#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
}

impl TryFrom<RawGrid> for GridDimensions {
    type Error = ConnectivityError;

    fn try_from(raw: RawGrid) -> ConnectivityResult<Self> {
        Self::new(raw.width, raw.height)
    }
}

impl GridDimensions {
    pub fn new(width: usize, height: usize) -> ConnectivityResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConnectivityError::InvalidGeometry(format!(
                "grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        match width.checked_mul(height) {
            Some(count) if count <= u32::MAX as usize => Ok(Self { width, height }),
            _ => Err(ConnectivityError::InvalidGeometry(format!(
                "grid {}x{} exceeds the neuron id range",
                width, height
            ))),
        }
    }

    /// Square grid, the shape every retina-derived layer uses
    pub fn square(side: usize) -> ConnectivityResult<Self> {
        Self::new(side, side)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of neurons in the grid
    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Id of the neuron at `(row, col)`. Caller guarantees the position is in bounds.
    #[inline]
    pub fn neuron_id(&self, row: usize, col: usize) -> NeuronId {
        debug_assert!(self.contains(row, col));
        NeuronId(to_linear(row, col, self.width) as u32)
    }

    /// `(row, col)` of a neuron id, or `None` if the id is outside the grid
    pub fn position_of(&self, id: NeuronId) -> Option<(usize, usize)> {
        let id = id.0 as usize;
        if id < self.neuron_count() {
            Some(from_linear(id, self.width))
        } else {
            None
        }
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_checks_invariant() {
        let grid: GridDimensions = serde_json::from_str(r#"{"width":12,"height":7}"#).unwrap();
        assert_eq!(grid, GridDimensions::new(12, 7).unwrap());
        assert_eq!(serde_json::to_string(&grid).unwrap(), r#"{"width":12,"height":7}"#);

        let err = serde_json::from_str::<GridDimensions>(r#"{"width":0,"height":7}"#).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
        assert!(serde_json::from_str::<GridDimensions>(r#"{"width":65536,"height":65537}"#).is_err());
    }

    #[test]
    fn test_linear_layout_is_row_major() {
        assert_eq!(to_linear(0, 0, 5), 0);
        assert_eq!(to_linear(0, 4, 5), 4);
        assert_eq!(to_linear(1, 0, 5), 5);
        assert_eq!(to_linear(3, 2, 5), 17);
        assert_eq!(from_linear(17, 5), (3, 2));
    }

    #[test]
    fn test_linear_is_bijective_for_fixed_width() {
        let grid = GridDimensions::new(7, 4).unwrap();
        let mut seen = vec![false; grid.neuron_count()];
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let id = grid.neuron_id(row, col);
                assert!(!seen[id.0 as usize], "id {} produced twice", id);
                seen[id.0 as usize] = true;
                assert_eq!(grid.position_of(id), Some((row, col)));
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            GridDimensions::new(0, 3),
            Err(ConnectivityError::InvalidGeometry(_))
        ));
        assert!(GridDimensions::new(3, 0).is_err());
    }

    #[test]
    fn test_position_of_out_of_range() {
        let grid = GridDimensions::square(3).unwrap();
        assert_eq!(grid.position_of(NeuronId(9)), None);
        assert_eq!(grid.position_of(NeuronId(8)), Some((2, 2)));
    }
}
