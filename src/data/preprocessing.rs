//! Data preprocessing module for graph analysis

use std::collections::HashSet;

use crate::graph::{normalize, CompressedGraph, Edge, GraphView};

/// Subgraph induced by a vertex subset, renumbered contiguously
#[derive(Debug, Clone, Default)]
pub struct InducedSubgraph {
    /// The induced graph over `0..to_original.len()`
    pub graph: CompressedGraph,

    /// to_original[i] = vertex of the source graph that became vertex i
    pub to_original: Vec<usize>,
}

impl InducedSubgraph {
    /// Map a subgraph vertex back to the source graph
    pub fn original(&self, v: usize) -> usize {
        self.to_original[v]
    }
}

/// Extract the subgraph induced by `vertices`.
///
/// Subgraph vertex `i` is `vertices[i]`; only edges with both endpoints in
/// `vertices` are kept. Duplicate entries in `vertices` are ignored.
pub fn induced_subgraph<G: GraphView>(graph: &G, vertices: &[usize]) -> InducedSubgraph {
    induced_subgraph_without(graph, vertices, &HashSet::new())
}

/// Like [`induced_subgraph`], but the edges in `removed` (normalized, smaller
/// endpoint first) are left out even when both endpoints are selected.
pub fn induced_subgraph_without<G: GraphView>(
    graph: &G,
    vertices: &[usize],
    removed: &HashSet<Edge>,
) -> InducedSubgraph {
    // Create mapping from original to subgraph indices
    let mut orig_to_sub = vec![u32::MAX; graph.vertex_count()];
    let mut to_original = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if orig_to_sub[v] == u32::MAX {
            orig_to_sub[v] = to_original.len() as u32;
            to_original.push(v);
        }
    }
    let subgraph_size = to_original.len();

    let kept = |v: usize, u: usize| orig_to_sub[u] != u32::MAX && !removed.contains(&normalize((v, u)));

    // Count edges in the subgraph
    let edge_count: usize = to_original
        .iter()
        .map(|&v| graph.neighbors(v).filter(|&u| kept(v, u)).count())
        .sum();

    let mut subgraph = CompressedGraph::with_capacity(subgraph_size, edge_count / 2);

    // Fill offsets and edges
    subgraph.offsets.push(0);
    let mut offset = 0u32;

    for &v in &to_original {
        for u in graph.neighbors(v) {
            // Only include edges where both endpoints are in the subgraph
            if kept(v, u) {
                subgraph.edges.push(orig_to_sub[u]);
                offset += 1;
            }
        }
        subgraph.offsets.push(offset);
    }

    subgraph.node_count = subgraph_size;

    // Renumbering need not preserve order within a list
    subgraph.sort_adjacency_lists();

    InducedSubgraph {
        graph: subgraph,
        to_original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_inner_edges() {
        // triangle 1-2-3 with pendant 0 on 1 and 4 on 3
        let g = CompressedGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 1), (3, 4)]);
        let sub = induced_subgraph(&g, &[3, 1, 2]);

        assert_eq!(sub.to_original, vec![3, 1, 2]);
        assert_eq!(sub.graph.vertex_count(), 3);
        assert_eq!(sub.graph.edge_count(), 3);
        assert_eq!(sub.graph.neighbors_of(0), &[1, 2]);
        assert_eq!(sub.original(1), 1);
        assert_eq!(sub.original(0), 3);
    }

    #[test]
    fn duplicate_and_empty_selections() {
        let g = CompressedGraph::from_edges(3, &[(0, 1), (1, 2)]);
        let sub = induced_subgraph(&g, &[0, 0, 1]);
        assert_eq!(sub.to_original, vec![0, 1]);
        assert_eq!(sub.graph.edge_count(), 1);

        let empty = induced_subgraph(&g, &[]);
        assert_eq!(empty.graph.vertex_count(), 0);
        assert_eq!(empty.graph.edge_count(), 0);
    }

    #[test]
    fn removed_edges_are_left_out_in_both_lists() {
        // triangles 0-1-2 and 3-4-5 joined by 2-3
        let g = CompressedGraph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)]);
        let removed: HashSet<Edge> = [(2, 3)].into_iter().collect();
        let sub = induced_subgraph_without(&g, &[0, 1, 2, 3, 4, 5], &removed);

        assert_eq!(sub.graph.edge_count(), 6);
        assert_eq!(sub.graph.neighbors_of(2), &[0, 1]);
        assert_eq!(sub.graph.neighbors_of(3), &[4, 5]);
        assert!(!sub.graph.has_edge(3, 2));
    }
}
