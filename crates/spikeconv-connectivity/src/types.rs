// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for connectivity compilation.

Neuron ids are linear indices within one grid. Weights are positive
magnitudes; the sign of the originating kernel entry is carried by
[`SynapseType`] and by which list of a `ConnectionSet` a connection lands in.
*/

use core::fmt;
use serde::{Deserialize, Serialize};

/// Linear neuron id within a single grid (`row * width + col`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeuronId(pub u32);

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neuron({})", self.0)
    }
}

/// Synapse polarity (which receptor the runtime routes the spike to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynapseType {
    Excitatory = 0,
    Inhibitory = 1,
}

impl SynapseType {
    /// Polarity of a signed kernel entry. Zero has no polarity.
    #[inline]
    pub fn of(value: f64) -> Option<Self> {
        if value > 0.0 {
            Some(SynapseType::Excitatory)
        } else if value < 0.0 {
            Some(SynapseType::Inhibitory)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SynapseType::Excitatory => "excitatory",
            SynapseType::Inhibitory => "inhibitory",
        }
    }
}

impl fmt::Display for SynapseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synaptic weight magnitude.
///
/// Always finite and strictly positive. The only way to obtain one is
/// [`SynapticWeight::new`] or [`SynapticWeight::magnitude_of`], both of which
/// refuse zero, negative-zero and non-finite input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SynapticWeight(f64);

impl SynapticWeight {
    /// Wrap a positive, finite value
    #[inline]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Magnitude of a signed kernel entry (`None` for zero)
    #[inline]
    pub fn magnitude_of(value: f64) -> Option<Self> {
        Self::new(value.abs())
    }

    #[inline(always)]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for SynapticWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result type for connectivity operations
pub type ConnectivityResult<T> = Result<T, ConnectivityError>;

/// Errors raised while building kernels or compiling connectivity.
///
/// Every variant is a configuration mistake, detected before any connection
/// is emitted. None of them are retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectivityError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Invalid weight {0}: uniform weights must be finite and positive")]
    InvalidWeight(f64),

    #[error("Template storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for ConnectivityError {
    fn from(err: std::io::Error) -> Self {
        ConnectivityError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectivityError {
    fn from(err: serde_json::Error) -> Self {
        ConnectivityError::Storage(err.to_string())
    }
}
