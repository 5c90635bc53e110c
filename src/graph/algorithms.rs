//! Graph algorithms used by the filtering phase
//!
//! Biconnected components follow Hopcroft and Tarjan, "Algorithm 447: efficient
//! algorithms for graph manipulation" (CACM 16(6), 1973), driven by an explicit
//! frame stack so deep graphs cannot exhaust the call stack.

use std::collections::HashSet;
use crate::graph::{Edge, GraphView, normalize};

const UNVISITED: usize = usize::MAX;
const NO_PARENT: usize = usize::MAX;

/// Union-Find structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<usize>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<usize>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Union the sets containing x and y. Returns false if they already were one set.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return false;
        }

        // attach smaller tree under root of larger tree
        if self.size[root_x] >= self.size[root_y] {
            self.parent[root_y] = root_x;
            self.size[root_x] += self.size[root_y];
        } else {
            self.parent[root_x] = root_y;
            self.size[root_y] += self.size[root_x];
        }
        true
    }
}

/// Edge groups produced by the biconnected decomposition
#[derive(Debug, Clone, Default)]
pub struct BiconnectedComponents {
    components: Vec<Vec<Edge>>,
}

impl BiconnectedComponents {
    /// All components, each one a list of edges in pop order
    pub fn components(&self) -> &[Vec<Edge>] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when the graph had no edges
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components consisting of a single edge, normalized
    pub fn bridges(&self) -> Vec<Edge> {
        self.components
            .iter()
            .filter(|component| component.len() == 1)
            .map(|component| normalize(component[0]))
            .collect()
    }
}

struct Frame<I> {
    vertex: usize,
    neighbors: I,
    children: usize,
}

/// Pop edges until `last` (inclusive) and return them as one component
fn pop_component(stack: &mut Vec<Edge>, last: Edge) -> Vec<Edge> {
    let mut edges = Vec::new();
    while let Some(edge) = stack.pop() {
        edges.push(edge);
        if edge == last {
            break;
        }
    }
    edges
}

/// Find all biconnected components of an undirected graph.
///
/// Every edge of the graph ends up in exactly one component; components with a
/// single edge are the bridges.
pub fn biconnected_components<G: GraphView>(graph: &G) -> BiconnectedComponents {
    let n = graph.vertex_count();
    let mut discovered = vec![UNVISITED; n];
    let mut low = vec![UNVISITED; n];
    let mut parent = vec![NO_PARENT; n];
    let mut edge_stack: Vec<Edge> = Vec::new();
    let mut components = Vec::new();
    let mut time = 0;

    for root in 0..n {
        if discovered[root] != UNVISITED {
            continue;
        }

        discovered[root] = time;
        low[root] = time;
        time += 1;

        let mut frames = vec![Frame {
            vertex: root,
            neighbors: graph.neighbors(root),
            children: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;

            let Some(w) = frame.neighbors.next() else {
                // v is finished, report back to its DFS parent
                frames.pop();
                if let Some(up) = frames.last() {
                    let p = up.vertex;
                    low[p] = low[p].min(low[v]);
                    let is_root = parent[p] == NO_PARENT;
                    if (is_root && up.children > 1) || (!is_root && low[v] >= discovered[p]) {
                        components.push(pop_component(&mut edge_stack, (p, v)));
                    }
                }
                continue;
            };

            if discovered[w] == UNVISITED {
                frame.children += 1;
                parent[w] = v;
                edge_stack.push((v, w));
                discovered[w] = time;
                low[w] = time;
                time += 1;
                frames.push(Frame {
                    vertex: w,
                    neighbors: graph.neighbors(w),
                    children: 0,
                });
            } else if parent[v] != w && discovered[w] < discovered[v] {
                // back edge towards an ancestor
                low[v] = low[v].min(discovered[w]);
                edge_stack.push((v, w));
            }
        }

        if !edge_stack.is_empty() {
            components.push(edge_stack.drain(..).rev().collect());
        }
    }

    log::debug!("Found {} biconnected components", components.len());

    BiconnectedComponents { components }
}

/// Connected components of the graph once `removed` edges are ignored.
///
/// Components are ordered by their smallest vertex and list their vertices in
/// increasing order. `removed` must hold normalized edges.
pub fn connected_components_without<G: GraphView>(
    graph: &G,
    removed: &HashSet<Edge>,
) -> Vec<Vec<usize>> {
    let n = graph.vertex_count();
    let mut sets = DisjointSets::new(n);

    for u in 0..n {
        for v in graph.neighbors(u) {
            if u < v && !removed.contains(&(u, v)) {
                sets.union(u, v);
            }
        }
    }

    // Group nodes by component, numbering components on first encounter
    let mut component_of_root = vec![usize::MAX; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for v in 0..n {
        let root = sets.find(v);
        if component_of_root[root] == usize::MAX {
            component_of_root[root] = components.len();
            components.push(Vec::new());
        }
        components[component_of_root[root]].push(v);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompressedGraph;
    use proptest::prelude::*;

    fn sorted_component(component: &[Edge]) -> Vec<Edge> {
        let mut edges: Vec<Edge> = component.iter().map(|&e| normalize(e)).collect();
        edges.sort_unstable();
        edges
    }

    #[test]
    fn path_graph_is_all_bridges() {
        let g = CompressedGraph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let bcc = biconnected_components(&g);
        assert_eq!(bcc.len(), 5);
        let mut bridges = bcc.bridges();
        bridges.sort_unstable();
        assert_eq!(bridges, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    }

    #[test]
    fn bowtie_splits_at_cut_vertex() {
        // two triangles sharing vertex 2, plus a pendant edge 4-5
        let g = CompressedGraph::from_edges(
            6,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2), (4, 5)],
        );
        let bcc = biconnected_components(&g);
        let mut groups: Vec<Vec<Edge>> = bcc.components().iter().map(|c| sorted_component(c)).collect();
        groups.sort();

        assert_eq!(
            groups,
            vec![
                vec![(0, 1), (0, 2), (1, 2)],
                vec![(2, 3), (2, 4), (3, 4)],
                vec![(4, 5)],
            ]
        );
        assert_eq!(bcc.bridges(), vec![(4, 5)]);
    }

    #[test]
    fn root_with_two_children_closes_both_components() {
        // vertex 0 is the DFS root and a cut vertex between two cycles
        let g = CompressedGraph::from_edges(
            5,
            &[(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)],
        );
        let bcc = biconnected_components(&g);
        assert_eq!(bcc.len(), 2);
        assert!(bcc.bridges().is_empty());
        assert!(bcc.components().iter().all(|c| c.len() == 3));
    }

    #[test]
    fn deep_path_does_not_overflow() {
        let n = 200_000;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let g = CompressedGraph::from_edges(n, &edges);
        assert_eq!(biconnected_components(&g).bridges().len(), n - 1);
    }

    #[test]
    fn components_ignore_removed_edges() {
        let g = CompressedGraph::from_edges(5, &[(0, 1), (1, 2), (3, 4)]);
        assert_eq!(
            connected_components_without(&g, &HashSet::new()),
            vec![vec![0, 1, 2], vec![3, 4]]
        );

        let removed: HashSet<Edge> = [(1, 2)].into_iter().collect();
        assert_eq!(
            connected_components_without(&g, &removed),
            vec![vec![0, 1], vec![2], vec![3, 4]]
        );
    }

    #[test]
    fn disjoint_sets_union_and_find() {
        let mut sets = DisjointSets::new(4);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(!sets.union(1, 0));
        assert_eq!(sets.find(0), sets.find(1));
        assert_ne!(sets.find(1), sets.find(2));
    }

    proptest! {
        #[test]
        fn biconnected_components_partition_edges(
            n in 1usize..14,
            raw_edges in prop::collection::vec((0usize..14, 0usize..14), 0..40),
        ) {
            let edges: Vec<_> = raw_edges.into_iter()
                .map(|(u, v)| (u % n, v % n))
                .collect();
            let g = CompressedGraph::from_edges(n, &edges);

            let bcc = biconnected_components(&g);
            let mut seen: Vec<Edge> = bcc.components()
                .iter()
                .flat_map(|c| c.iter().map(|&e| normalize(e)))
                .collect();
            seen.sort_unstable();

            let expected: Vec<Edge> = g.edge_iter().collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
