//! Propagation phase: reattach whiskers to the clusters of their core vertices

use std::collections::{BTreeSet, VecDeque};

use crate::cluster::{ClusterId, Clustering};
use crate::error::Result;
use crate::graph::{Edge, GraphView};

const NO_REGION: usize = usize::MAX;

/// For every `(core vertex, whisker vertex)` bridge, walk breadth-first from
/// the whisker over vertices outside the core. Each region reached this way is
/// inserted into every cluster holding a core vertex of some bridge into it,
/// so a whisker region hanging between several core vertices joins the
/// clusters of all of them. Visited vertices are flagged in `in_core`.
///
/// Returns the number of vertex insertions performed.
pub fn propagate<'g, G: GraphView>(
    graph: &'g G,
    bridges: &[Edge],
    in_core: &mut [bool],
    clustering: &mut Clustering<'g, G>,
) -> Result<usize> {
    let mut region_of = vec![NO_REGION; graph.vertex_count()];
    let mut regions: Vec<Vec<usize>> = Vec::new();
    let mut targets: Vec<BTreeSet<ClusterId>> = Vec::new();
    let mut queue = VecDeque::new();

    for &(core_vertex, whisker) in bridges {
        if region_of[whisker] == NO_REGION {
            if in_core[whisker] {
                continue;
            }

            let region = regions.len();
            let mut members = Vec::new();
            in_core[whisker] = true;
            region_of[whisker] = region;
            queue.push_back(whisker);
            while let Some(w) = queue.pop_front() {
                members.push(w);
                for u in graph.neighbors(w) {
                    if !in_core[u] {
                        in_core[u] = true;
                        region_of[u] = region;
                        queue.push_back(u);
                    }
                }
            }
            regions.push(members);
            targets.push(BTreeSet::new());
        }

        let region = region_of[whisker];
        targets[region].extend(clustering.membership_of(core_vertex)?.iter().copied());
    }

    let mut insertions = 0;
    for (members, ids) in regions.iter().zip(&targets) {
        for &w in members {
            for &id in ids {
                if clustering.insert_vertex_in_cluster(w, id)? {
                    insertions += 1;
                }
            }
        }
    }

    log::info!(
        "Propagated {} whisker regions over {} bridges with {} vertex insertions",
        regions.len(),
        bridges.len(),
        insertions
    );

    Ok(insertions)
}
