//! Memory-efficient undirected graph representation

use std::mem;
use serde::{Serialize, Deserialize};
use crate::graph::GraphView;

/// Compressed sparse representation of an undirected graph.
///
/// Every edge is stored in both endpoint lists; each list is sorted and free
/// of duplicates so adjacency tests are a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated, sorted neighbor lists
    pub edges: Vec<u32>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(2 * edge_count),
        }
    }

    /// Build a graph from an undirected edge list
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut builder = crate::graph::builder::GraphBuilder::new(node_count);
        for &(u, v) in edges {
            builder.add_edge(u, v);
        }
        builder.build()
    }

    /// Get the neighbor list of a node
    pub fn neighbors_of(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Sort all adjacency lists (improves binary search performance)
    pub fn sort_adjacency_lists(&mut self) {
        for node in 0..self.node_count {
            let start = self.offsets[node] as usize;
            let end = self.offsets[node + 1] as usize;
            if start < end {
                self.edges[start..end].sort_unstable();
            }
        }
    }

    /// Iterate every undirected edge once, smaller endpoint first
    pub fn edge_iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count).flat_map(move |u| {
            self.neighbors_of(u)
                .iter()
                .map(|&v| v as usize)
                .filter(move |&v| u < v)
                .map(move |v| (u, v))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();

        base + offsets + edges
    }
}

impl GraphView for CompressedGraph {
    fn vertex_count(&self) -> usize {
        self.node_count
    }

    fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    fn degree(&self, v: usize) -> usize {
        let start = self.offsets[v] as usize;
        let end = self.offsets[v + 1] as usize;
        end - start
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors_of(v).iter().map(|&u| u as usize)
    }

    fn has_edge(&self, v: usize, u: usize) -> bool {
        if v >= self.node_count || u >= self.node_count {
            return false;
        }
        self.neighbors_of(v).binary_search(&(u as u32)).is_ok()
    }
}
