//! Filtering phase: isolate the biconnected core of the graph
//!
//! Every bridge is removed from a working view of the graph; the largest
//! remaining connected components are the core, and the core subgraph keeps
//! no bridge even when a bridge joins two tied components. Bridges with
//! exactly one endpoint in the core hang "whiskers" off it that are reattached
//! to the clusters by the propagation phase.

use std::collections::HashSet;

use crate::data::preprocessing::{induced_subgraph_without, InducedSubgraph};
use crate::graph::algorithms::{biconnected_components, connected_components_without};
use crate::graph::{Edge, GraphView};

/// Result of the filtering phase
#[derive(Debug, Clone, Default)]
pub struct Filtering {
    /// Core vertices, ascending original ids
    pub core_vertices: Vec<usize>,

    /// in_core[v] is true iff `v` is a core vertex
    pub in_core: Vec<bool>,

    /// Bridges with exactly one endpoint in the core, as (core vertex, whisker vertex)
    pub bridges: Vec<Edge>,

    /// Bridge-free core subgraph with contiguous ids mapped back to original ones
    pub core: InducedSubgraph,
}

impl Filtering {
    /// True when no component survived with at least one edge
    pub fn is_empty(&self) -> bool {
        self.core_vertices.is_empty()
    }
}

/// Run the filtering phase over `graph`
pub fn filter<G: GraphView>(graph: &G) -> Filtering {
    let n = graph.vertex_count();

    let bcc = biconnected_components(graph);
    let all_bridges = bcc.bridges();
    log::info!(
        "Found {} biconnected components, {} of them bridges",
        bcc.len(),
        all_bridges.len()
    );

    let removed: HashSet<Edge> = all_bridges.iter().copied().collect();
    let components = connected_components_without(graph, &removed);

    let core_vertices = core_of(&components);
    let mut in_core = vec![false; n];
    for &v in &core_vertices {
        in_core[v] = true;
    }

    let bridges: Vec<Edge> = all_bridges
        .into_iter()
        .filter(|&(u, v)| in_core[u] != in_core[v])
        .map(|(u, v)| if in_core[u] { (u, v) } else { (v, u) })
        .collect();

    if core_vertices.is_empty() {
        log::warn!("Biconnected core is empty; no cluster can be found");
    } else {
        log::info!(
            "Biconnected core has {} of {} vertices, {} bridges to propagate over",
            core_vertices.len(),
            n,
            bridges.len()
        );
    }

    let core = induced_subgraph_without(graph, &core_vertices, &removed);

    Filtering {
        core_vertices,
        in_core,
        bridges,
        core,
    }
}

/// Vertices of the largest components that still hold an edge once bridges
/// are gone. Components tied for the largest size are all kept.
fn core_of(components: &[Vec<usize>]) -> Vec<usize> {
    // a connected component of two or more vertices has an edge
    let candidates: Vec<&Vec<usize>> = components
        .iter()
        .filter(|component| component.len() > 1)
        .collect();

    let Some(largest) = candidates.iter().map(|component| component.len()).max() else {
        return Vec::new();
    };

    let mut core: Vec<usize> = candidates
        .into_iter()
        .filter(|component| component.len() == largest)
        .flat_map(|component| component.iter().copied())
        .collect();
    core.sort_unstable();
    core
}
