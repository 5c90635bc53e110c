//! Seeding phase: spread hubs
//!
//! Walks the vertices from highest to lowest degree. Each unmarked vertex
//! opens an independent set among the unmarked vertices of the same degree;
//! every vertex of that set becomes a seed and is marked together with its
//! neighbors, so seeds end up far apart and on the hubs of the graph.

use std::cmp::Reverse;
use rayon::prelude::*;

use crate::graph::GraphView;

/// Select up to `count` seeds of `graph` by spread hubs
pub fn spread_hubs<G: GraphView + Sync>(graph: &G, count: usize) -> Vec<usize> {
    let n = graph.vertex_count();

    let mut order: Vec<usize> = (0..n).collect();
    order.par_sort_unstable_by_key(|&v| (Reverse(graph.degree(v)), v));

    let mut marked = vec![false; n];
    let mut seeds = Vec::with_capacity(count);

    let mut i = 0;
    while seeds.len() < count && i < n {
        if !marked[order[i]] {
            for v in independent_set_from(graph, &order, &marked, i) {
                if seeds.len() == count {
                    break;
                }
                seeds.push(v);
                mark_neighborhood(graph, v, &mut marked);
            }
        }
        i += 1;
    }

    if seeds.len() < count {
        log::warn!(
            "Could only find {} of {} requested seeds",
            seeds.len(),
            count
        );
    } else {
        log::info!("Selected {} seeds", seeds.len());
    }

    seeds
}

/// Greedy independent set among the unmarked vertices with the degree of
/// `order[start]`, scanned in order
fn independent_set_from<G: GraphView>(
    graph: &G,
    order: &[usize],
    marked: &[bool],
    start: usize,
) -> Vec<usize> {
    let degree = graph.degree(order[start]);
    let mut set: Vec<usize> = Vec::new();

    for &v in order[start..].iter().take_while(|&&v| graph.degree(v) == degree) {
        if marked[v] {
            continue;
        }
        if set.iter().all(|&u| !graph.has_edge(v, u)) {
            set.push(v);
        }
    }

    set
}

fn mark_neighborhood<G: GraphView>(graph: &G, v: usize, marked: &mut [bool]) {
    marked[v] = true;
    for u in graph.neighbors(v) {
        marked[u] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompressedGraph;
    use proptest::prelude::*;

    #[test]
    fn picks_hubs_first() {
        // star centered at 2 plus a separate edge 5-6
        let g = CompressedGraph::from_edges(7, &[(2, 0), (2, 1), (2, 3), (2, 4), (5, 6)]);
        assert_eq!(spread_hubs(&g, 1), vec![2]);
        assert_eq!(spread_hubs(&g, 2), vec![2, 5]);
    }

    #[test]
    fn same_degree_vertices_form_an_independent_set() {
        // two disjoint triangles: all degrees equal, the set takes 0 and 3
        let g = CompressedGraph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
        assert_eq!(spread_hubs(&g, 2), vec![0, 3]);
        // the set is cut at the requested count
        assert_eq!(spread_hubs(&g, 1), vec![0]);
    }

    #[test]
    fn exhaustion_returns_fewer_seeds() {
        let g = CompressedGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (2, 3), (1, 3)]);
        // K4: the first seed marks everything
        assert_eq!(spread_hubs(&g, 5), vec![0]);

        let empty = CompressedGraph::from_edges(0, &[]);
        assert!(spread_hubs(&empty, 3).is_empty());
    }

    proptest! {
        #[test]
        fn seeds_are_pairwise_non_adjacent(
            n in 1usize..20,
            raw_edges in prop::collection::vec((0usize..20, 0usize..20), 0..50),
            count in 1usize..10,
        ) {
            let edges: Vec<_> = raw_edges.into_iter().map(|(u, v)| (u % n, v % n)).collect();
            let g = CompressedGraph::from_edges(n, &edges);
            let seeds = spread_hubs(&g, count);

            prop_assert!(seeds.len() <= count);
            for (i, &a) in seeds.iter().enumerate() {
                for &b in &seeds[i + 1..] {
                    prop_assert_ne!(a, b);
                    prop_assert!(!g.has_edge(a, b));
                }
            }
        }
    }
}
