// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Window placement arithmetic.

Windows are only placed where they fit entirely inside the source grid.
There is no padding mode, so no clipping is ever needed.
*/

use super::grid::GridDimensions;
use crate::types::{ConnectivityError, ConnectivityResult};

/// Number of valid window placements along one axis:
/// `floor((input - window) / stride) + 1`.
///
/// # Errors
/// `InvalidGeometry` when the window is empty, the stride is zero, or the
/// window is larger than the input.
pub fn output_size(input: usize, window: usize, stride: usize) -> ConnectivityResult<usize> {
    if window == 0 {
        return Err(ConnectivityError::InvalidGeometry(
            "window size must be at least 1".to_string(),
        ));
    }
    if stride == 0 {
        return Err(ConnectivityError::InvalidGeometry(
            "stride must be at least 1".to_string(),
        ));
    }
    if window > input {
        return Err(ConnectivityError::InvalidGeometry(format!(
            "window {} larger than input {}",
            window, input
        )));
    }
    Ok((input - window) / stride + 1)
}

/// Offset of the window that produces output coordinate `output_index`
#[inline(always)]
pub fn window_origin(output_index: usize, stride: usize) -> usize {
    output_index * stride
}

/// Validated placement of a `window_height x window_width` window over a
/// source grid with independent row/column strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    source: GridDimensions,
    output: GridDimensions,
    window_height: usize,
    window_width: usize,
    stride_row: usize,
    stride_col: usize,
}

impl WindowGeometry {
    pub fn new(
        source: GridDimensions,
        window_height: usize,
        window_width: usize,
        stride_row: usize,
        stride_col: usize,
    ) -> ConnectivityResult<Self> {
        let out_height = output_size(source.height(), window_height, stride_row)?;
        let out_width = output_size(source.width(), window_width, stride_col)?;
        let output = GridDimensions::new(out_width, out_height)?;
        Ok(Self {
            source,
            output,
            window_height,
            window_width,
            stride_row,
            stride_col,
        })
    }

    #[inline(always)]
    pub fn source(&self) -> GridDimensions {
        self.source
    }

    #[inline(always)]
    pub fn output(&self) -> GridDimensions {
        self.output
    }

    #[inline(always)]
    pub fn window(&self) -> (usize, usize) {
        (self.window_height, self.window_width)
    }

    #[inline(always)]
    pub fn strides(&self) -> (usize, usize) {
        (self.stride_row, self.stride_col)
    }

    /// Top-left source position of the window for output `(out_row, out_col)`
    #[inline]
    pub fn origin(&self, out_row: usize, out_col: usize) -> (usize, usize) {
        (
            window_origin(out_row, self.stride_row),
            window_origin(out_col, self.stride_col),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size_formula() {
        assert_eq!(output_size(5, 3, 1).unwrap(), 3);
        assert_eq!(output_size(128, 17, 1).unwrap(), 112);
        assert_eq!(output_size(112, 5, 3).unwrap(), 36);
        assert_eq!(output_size(36, 21, 1).unwrap(), 16);
        assert_eq!(output_size(4, 2, 2).unwrap(), 2);
        assert_eq!(output_size(5, 5, 7).unwrap(), 1);
    }

    #[test]
    fn test_output_size_rejects_bad_geometry() {
        assert!(matches!(
            output_size(4, 5, 1),
            Err(ConnectivityError::InvalidGeometry(_))
        ));
        assert!(output_size(4, 2, 0).is_err());
        assert!(output_size(4, 0, 1).is_err());
    }

    #[test]
    fn test_window_never_leaves_source() {
        let source = GridDimensions::new(11, 9).unwrap();
        let geo = WindowGeometry::new(source, 4, 3, 2, 3).unwrap();
        let (wh, ww) = geo.window();
        for r in 0..geo.output().height() {
            for c in 0..geo.output().width() {
                let (or, oc) = geo.origin(r, c);
                assert!(or + wh <= source.height());
                assert!(oc + ww <= source.width());
            }
        }
        assert_eq!(geo.output(), GridDimensions::new(3, 3).unwrap());
    }
}
