// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Grid geometry shared by every compiler.

- Linear neuron ids (`row * width + col`) and their inverse
- Output grid sizing from input size, window size and stride
- Window origins ("valid" placement only, no padding)
*/

pub mod geometry;
pub mod grid;

pub use geometry::{output_size, window_origin, WindowGeometry};
pub use grid::{from_linear, to_linear, GridDimensions};
