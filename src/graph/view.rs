//! Read-only adjacency access consumed by the detection core

use petgraph::graph::{IndexType, NodeIndex, UnGraph};

/// Undirected edge as a pair of vertex indices
pub type Edge = (usize, usize);

/// Read-only view of a simple undirected graph with dense vertex ids `0..N`
pub trait GraphView {
    /// Number of vertices
    fn vertex_count(&self) -> usize;

    /// Number of undirected edges
    fn edge_count(&self) -> usize;

    /// Degree of `v` in the full graph
    fn degree(&self, v: usize) -> usize;

    /// Neighbors of `v`. Restartable, stable for the lifetime of the graph.
    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_;

    /// Whether `v` and `u` are adjacent
    fn has_edge(&self, v: usize, u: usize) -> bool;

    /// Sum of the degrees of `vertices`
    fn volume<I: IntoIterator<Item = usize>>(&self, vertices: I) -> usize {
        vertices.into_iter().map(|v| self.degree(v)).sum()
    }
}

impl<N, E, Ix: IndexType> GraphView for UnGraph<N, E, Ix> {
    fn vertex_count(&self) -> usize {
        self.node_count()
    }

    fn edge_count(&self) -> usize {
        petgraph::graph::Graph::edge_count(self)
    }

    fn degree(&self, v: usize) -> usize {
        self.neighbors(NodeIndex::new(v)).count()
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        petgraph::graph::Graph::neighbors(self, NodeIndex::new(v)).map(|n| n.index())
    }

    fn has_edge(&self, v: usize, u: usize) -> bool {
        self.find_edge(NodeIndex::new(v), NodeIndex::new(u)).is_some()
    }
}

/// Normalized form of an undirected edge, smaller endpoint first
pub fn normalize(edge: Edge) -> Edge {
    if edge.0 <= edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn petgraph_view_matches_structure() {
        let mut g = UnGraph::<(), ()>::new_undirected();
        let nodes: Vec<_> = (0..4).map(|_| g.add_node(())).collect();
        g.add_edge(nodes[0], nodes[1], ());
        g.add_edge(nodes[1], nodes[2], ());
        g.add_edge(nodes[2], nodes[0], ());

        assert_eq!(GraphView::vertex_count(&g), 4);
        assert_eq!(GraphView::edge_count(&g), 3);
        assert_eq!(GraphView::degree(&g, 1), 2);
        assert_eq!(GraphView::degree(&g, 3), 0);
        assert!(GraphView::has_edge(&g, 2, 1));
        assert!(!GraphView::has_edge(&g, 3, 1));

        let mut adj: Vec<usize> = GraphView::neighbors(&g, 0).collect();
        adj.sort_unstable();
        assert_eq!(adj, vec![1, 2]);
        assert_eq!(g.volume([0, 1, 2]), 6);
    }

    #[test]
    fn normalize_orders_endpoints() {
        assert_eq!(normalize((3, 1)), (1, 3));
        assert_eq!(normalize((1, 3)), (1, 3));
    }
}
