// Dualsim: Simulating Diffusing-Update Route Convergence
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Shortest path utility
//!
//! Single-source shortest paths over a static, undirected, non-negatively weighted graph. This is
//! independent of the simulator: the graph does not change, and the computation is a plain
//! min-priority relaxation with parent pointers for path reconstruction. Stale heap entries
//! (whose recorded distance exceeds the distance already settled) are skipped.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use thiserror::Error;

/// The static weighted graph the utility operates on.
pub type SpfGraph = UnGraph<(), u32>;

/// Errors raised while building a graph from an edge list.
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    /// An edge references a vertex number outside of `1..=n`.
    #[error("vertex {0} is outside the range 1..={1}")]
    VertexOutOfRange(usize, usize),
}

/// Map a 1-based vertex number to its index in the graph.
pub fn vertex(v: usize) -> NodeIndex {
    NodeIndex::new(v - 1)
}

/// Build an undirected graph with vertices numbered `1..=n` from a list of `(u, v, w)` edges.
pub fn graph_from_edges(n: usize, edges: &[(usize, usize, u32)]) -> Result<SpfGraph, GraphError> {
    let mut graph = SpfGraph::new_undirected();
    for _ in 0..n {
        graph.add_node(());
    }
    for &(u, v, w) in edges {
        if u == 0 || u > n {
            return Err(GraphError::VertexOutOfRange(u, n));
        }
        if v == 0 || v > n {
            return Err(GraphError::VertexOutOfRange(v, n));
        }
        graph.add_edge(vertex(u), vertex(v), w);
    }
    Ok(graph)
}

/// The result of a single-source shortest-path computation: the minimum total weight for every
/// reachable vertex, and parent pointers to reconstruct one shortest path each.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    source: NodeIndex,
    dist: HashMap<NodeIndex, u32>,
    parent: HashMap<NodeIndex, NodeIndex>,
}

/// Compute shortest paths from the source to every reachable vertex. The source must be a vertex
/// of the graph.
pub fn shortest_paths(graph: &SpfGraph, source: NodeIndex) -> ShortestPaths {
    let mut dist: HashMap<NodeIndex, u32> = HashMap::new();
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u32, NodeIndex)>> = BinaryHeap::new();

    dist.insert(source, 0);
    heap.push(Reverse((0, source)));

    while let Some(Reverse((d, u))) = heap.pop() {
        if d > dist.get(&u).copied().unwrap_or(u32::MAX) {
            // a better path to u was settled after this entry was pushed
            continue;
        }
        for edge in graph.edges(u) {
            let v = edge.target();
            let next = d.saturating_add(*edge.weight());
            if next < dist.get(&v).copied().unwrap_or(u32::MAX) {
                dist.insert(v, next);
                parent.insert(v, u);
                heap.push(Reverse((next, v)));
            }
        }
    }

    ShortestPaths { source, dist, parent }
}

impl ShortestPaths {
    /// The minimum total weight to reach the vertex, or `None` if it is unreachable.
    pub fn distance(&self, target: NodeIndex) -> Option<u32> {
        self.dist.get(&target).copied()
    }

    /// One shortest path from the source to the target, as the sequence of visited vertices, or
    /// `None` if the target is unreachable.
    pub fn path(&self, target: NodeIndex) -> Option<Vec<NodeIndex>> {
        self.dist.get(&target)?;
        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = *self.parent.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}
