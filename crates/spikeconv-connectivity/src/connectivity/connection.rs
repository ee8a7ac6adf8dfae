// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Compiled connection lists.

A [`ConnectionSet`] keeps excitatory and inhibitory connections in two
separate lists. Weights are positive magnitudes; polarity is list membership.
*/

use crate::spatial::GridDimensions;
use crate::types::{NeuronId, SynapseType, SynapticWeight};
use serde::Serialize;

/// One point-to-point synapse between a source grid and a target grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connection {
    pub source: NeuronId,
    pub target: NeuronId,
    pub weight: SynapticWeight,
}

impl Connection {
    #[inline(always)]
    pub fn new(source: NeuronId, target: NeuronId, weight: SynapticWeight) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// `(pre, post, weight, delay)` row in the list format simulation runtimes
/// accept for list-based projections
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectionRow {
    pub pre: u32,
    pub post: u32,
    pub weight: f64,
    pub delay: u32,
}

impl ConnectionRow {
    #[inline]
    pub fn from_connection(connection: &Connection, delay: u32) -> Self {
        Self {
            pre: connection.source.0,
            post: connection.target.0,
            weight: connection.weight.get(),
            delay,
        }
    }
}

/// Excitatory and inhibitory connections produced by one compile call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionSet {
    excitatory: Vec<Connection>,
    inhibitory: Vec<Connection>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with room for the given number of connections per polarity
    pub fn with_capacity(excitatory: usize, inhibitory: usize) -> Self {
        Self {
            excitatory: Vec::with_capacity(excitatory),
            inhibitory: Vec::with_capacity(inhibitory),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, synapse_type: SynapseType, connection: Connection) {
        match synapse_type {
            SynapseType::Excitatory => self.excitatory.push(connection),
            SynapseType::Inhibitory => self.inhibitory.push(connection),
        }
    }

    pub fn excitatory(&self) -> &[Connection] {
        &self.excitatory
    }

    pub fn inhibitory(&self) -> &[Connection] {
        &self.inhibitory
    }

    /// List for one polarity
    pub fn by_type(&self, synapse_type: SynapseType) -> &[Connection] {
        match synapse_type {
            SynapseType::Excitatory => &self.excitatory,
            SynapseType::Inhibitory => &self.inhibitory,
        }
    }

    /// Total connection count across both polarities
    pub fn len(&self) -> usize {
        self.excitatory.len() + self.inhibitory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excitatory.is_empty() && self.inhibitory.is_empty()
    }

    /// Every connection tagged with its polarity, excitatory first
    pub fn iter(&self) -> impl Iterator<Item = (SynapseType, &Connection)> {
        self.excitatory
            .iter()
            .map(|c| (SynapseType::Excitatory, c))
            .chain(self.inhibitory.iter().map(|c| (SynapseType::Inhibitory, c)))
    }

    /// Split one polarity into slices of at most `max_len` connections.
    ///
    /// A `max_len` of zero is treated as "no limit".
    pub fn chunks(
        &self,
        synapse_type: SynapseType,
        max_len: usize,
    ) -> impl Iterator<Item = &[Connection]> {
        let list = self.by_type(synapse_type);
        let size = if max_len == 0 { list.len().max(1) } else { max_len };
        list.chunks(size)
    }

    /// One polarity as runtime list rows with a uniform delay
    pub fn rows(&self, synapse_type: SynapseType, delay: u32) -> Vec<ConnectionRow> {
        self.by_type(synapse_type)
            .iter()
            .map(|c| ConnectionRow::from_connection(c, delay))
            .collect()
    }

    pub fn into_parts(self) -> (Vec<Connection>, Vec<Connection>) {
        (self.excitatory, self.inhibitory)
    }
}

/// A [`ConnectionSet`] together with the grids it connects.
///
/// `output` is the size the caller must give the target population.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledConnectivity {
    pub connections: ConnectionSet,
    pub source: GridDimensions,
    pub output: GridDimensions,
}

impl CompiledConnectivity {
    #[inline]
    pub fn output_width(&self) -> usize {
        self.output.width()
    }

    #[inline]
    pub fn output_height(&self) -> usize {
        self.output.height()
    }

    /// Number of targets each source neuron feeds, indexed by source id.
    ///
    /// Connections whose source lies outside `source` are not counted.
    pub fn source_fan_out(&self) -> Vec<u32> {
        tally(self.source.neuron_count(), self.connections.iter().map(|(_, c)| c.source))
    }

    /// Number of incoming connections per target neuron, indexed by target id.
    ///
    /// Connections whose target lies outside `output` are not counted.
    pub fn target_fan_in(&self) -> Vec<u32> {
        tally(self.output.neuron_count(), self.connections.iter().map(|(_, c)| c.target))
    }

    /// Source neurons that feed no target at all
    pub fn uncovered_sources(&self) -> Vec<NeuronId> {
        self.source_fan_out()
            .into_iter()
            .enumerate()
            .filter(|&(_, n)| n == 0)
            .map(|(id, _)| NeuronId(id as u32))
            .collect()
    }

    /// All connections arriving at `target`, either polarity
    pub fn incoming(&self, target: NeuronId) -> impl Iterator<Item = (SynapseType, &Connection)> {
        self.connections
            .iter()
            .filter(move |(_, c)| c.target == target)
    }
}

fn tally(len: usize, ids: impl Iterator<Item = NeuronId>) -> Vec<u32> {
    let mut counts = vec![0u32; len];
    for id in ids {
        if let Some(n) = counts.get_mut(id.0 as usize) {
            *n += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(s: u32, t: u32, w: f64) -> Connection {
        Connection::new(NeuronId(s), NeuronId(t), SynapticWeight::new(w).unwrap())
    }

    fn sample() -> ConnectionSet {
        let mut set = ConnectionSet::with_capacity(3, 1);
        set.push(SynapseType::Excitatory, conn(0, 0, 1.0));
        set.push(SynapseType::Excitatory, conn(1, 0, 2.0));
        set.push(SynapseType::Excitatory, conn(2, 1, 3.0));
        set.push(SynapseType::Inhibitory, conn(3, 1, 0.5));
        set
    }

    #[test]
    fn test_push_routes_by_polarity() {
        let set = sample();
        assert_eq!(set.excitatory().len(), 3);
        assert_eq!(set.inhibitory().len(), 1);
        assert_eq!(set.len(), 4);
        assert!(!set.is_empty());
        assert!(ConnectionSet::new().is_empty());
    }

    #[test]
    fn test_chunks_bound_length() {
        let set = sample();
        let sizes: Vec<usize> = set.chunks(SynapseType::Excitatory, 2).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        let unbounded: Vec<usize> =
            set.chunks(SynapseType::Excitatory, 0).map(|c| c.len()).collect();
        assert_eq!(unbounded, vec![3]);
        assert_eq!(ConnectionSet::new().chunks(SynapseType::Inhibitory, 0).count(), 0);
    }

    #[test]
    fn test_rows_carry_delay() {
        let rows = sample().rows(SynapseType::Inhibitory, 1);
        assert_eq!(
            rows,
            vec![ConnectionRow {
                pre: 3,
                post: 1,
                weight: 0.5,
                delay: 1
            }]
        );
    }

    #[test]
    fn test_fan_out_and_uncovered() {
        let compiled = CompiledConnectivity {
            connections: sample(),
            source: GridDimensions::new(5, 1).unwrap(),
            output: GridDimensions::new(2, 1).unwrap(),
        };
        assert_eq!(compiled.source_fan_out(), vec![1, 1, 1, 1, 0]);
        assert_eq!(compiled.target_fan_in(), vec![2, 2]);
        assert_eq!(compiled.uncovered_sources(), vec![NeuronId(4)]);
        assert_eq!(compiled.incoming(NeuronId(1)).count(), 2);
    }

    #[test]
    fn test_fan_counts_ignore_ids_outside_grids() {
        // sample() reaches source 3 and target 1, both past these grids
        let compiled = CompiledConnectivity {
            connections: sample(),
            source: GridDimensions::new(2, 1).unwrap(),
            output: GridDimensions::new(1, 1).unwrap(),
        };
        assert_eq!(compiled.source_fan_out(), vec![1, 1]);
        assert_eq!(compiled.target_fan_in(), vec![2]);
        assert!(compiled.uncovered_sources().is_empty());
    }
}
