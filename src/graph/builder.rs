//! Graph construction module

use crate::graph::CompressedGraph;

/// Builder for incrementally constructing an undirected CompressedGraph
pub struct GraphBuilder {
    /// Number of nodes
    node_count: usize,

    /// Adjacency lists for each node, both directions recorded
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a builder for a graph with a fixed number of nodes
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            adjacency_lists: vec![Vec::new(); node_count],
        }
    }

    /// Number of nodes the built graph will have
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Append an isolated node and return its index
    pub fn add_node(&mut self) -> usize {
        self.adjacency_lists.push(Vec::new());
        self.node_count += 1;
        self.node_count - 1
    }

    /// Add an undirected edge. Self loops are ignored; duplicates are
    /// collapsed when the graph is built.
    ///
    /// Panics if either endpoint is not a node of the builder.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        assert!(
            u < self.node_count && v < self.node_count,
            "edge ({}, {}) out of range for {} nodes",
            u,
            v,
            self.node_count
        );
        if u == v {
            return;
        }

        self.adjacency_lists[u].push(v as u32);
        self.adjacency_lists[v].push(u as u32);
    }

    /// Build the compressed graph
    pub fn build(mut self) -> CompressedGraph {
        for list in &mut self.adjacency_lists {
            // Sort for binary search efficiency, drop parallel edges
            list.sort_unstable();
            list.dedup();
        }

        let edge_count: usize = self.adjacency_lists.iter()
            .map(|list| list.len())
            .sum();

        // Create offsets array
        let mut offsets = Vec::with_capacity(self.node_count + 1);
        offsets.push(0);

        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            offsets.push(offset);
        }

        let mut edges = Vec::with_capacity(edge_count);
        for list in &self.adjacency_lists {
            edges.extend_from_slice(list);
        }

        CompressedGraph {
            node_count: self.node_count,
            offsets,
            edges,
        }
    }
}
