//! Collection of possibly overlapping clusters

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Write};
use itertools::Itertools;

use crate::cluster::{Cluster, ClusterId};
use crate::error::{NiseError, Result};
use crate::graph::GraphView;

/// Clusters of one graph keyed by id, with a vertex → clusters index and
/// the number of vertices shared by every overlapping pair of clusters.
#[derive(Debug)]
pub struct Clustering<'g, G> {
    /// Number of vertices of the graph the clusters belong to
    vertex_count: usize,

    /// Next id to hand out; ids are never reused
    next_id: usize,

    /// Clusters in insertion order
    clusters: BTreeMap<ClusterId, Cluster<'g, G>>,

    /// membership[v] = ids of the clusters containing v
    membership: Vec<BTreeSet<ClusterId>>,

    /// overlaps[a][b] = |a ∩ b|, only for pairs sharing at least one vertex
    overlaps: HashMap<ClusterId, HashMap<ClusterId, usize>>,
}

impl<'g, G: GraphView> Clustering<'g, G> {
    /// Create an empty clustering for a graph with `vertex_count` vertices
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            next_id: 0,
            clusters: BTreeMap::new(),
            membership: vec![BTreeSet::new(); vertex_count],
            overlaps: HashMap::new(),
        }
    }

    /// Number of vertices of the underlying graph
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when there are no clusters
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        if v >= self.vertex_count {
            return Err(NiseError::vertex_out_of_range(v, self.vertex_count));
        }
        Ok(())
    }

    /// Cluster with the given id
    pub fn get(&self, id: ClusterId) -> Result<&Cluster<'g, G>> {
        self.clusters.get(&id).ok_or(NiseError::UnknownCluster(id))
    }

    /// Clusters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &Cluster<'g, G>)> + '_ {
        self.clusters.iter().map(|(&id, cluster)| (id, cluster))
    }

    /// Ids of all clusters in insertion order
    pub fn ids(&self) -> Vec<ClusterId> {
        self.clusters.keys().copied().collect()
    }

    /// Insert a cluster and return its id
    pub fn insert(&mut self, cluster: Cluster<'g, G>) -> Result<ClusterId> {
        let cluster_vertices = cluster.graph().vertex_count();
        if cluster_vertices != self.vertex_count {
            return Err(NiseError::InvariantViolation(format!(
                "cluster graph has {} vertices, clustering expects {}",
                cluster_vertices, self.vertex_count
            )));
        }

        let id = ClusterId(self.next_id);
        self.next_id += 1;
        self.overlaps.insert(id, HashMap::new());

        for v in cluster.iter() {
            let others: Vec<ClusterId> = self.membership[v].iter().copied().collect();
            for other in others {
                self.link_overlap(id, other)?;
            }
            self.membership[v].insert(id);
        }
        self.clusters.insert(id, cluster);

        Ok(id)
    }

    /// Insert a cluster unless an equal one is already present.
    /// Returns `None` when the cluster was a duplicate.
    pub fn insert_without_duplicate(&mut self, cluster: Cluster<'g, G>) -> Result<Option<ClusterId>> {
        if let Some((id, _)) = self.clusters.iter().find(|(_, c)| **c == cluster) {
            log::warn!("Skipping cluster of size {} duplicating cluster {}", cluster.len(), id);
            return Ok(None);
        }
        self.insert(cluster).map(Some)
    }

    /// Insert vertex `v` into cluster `id`. Returns `Ok(false)` if it already was a member.
    pub fn insert_vertex_in_cluster(&mut self, v: usize, id: ClusterId) -> Result<bool> {
        self.check_vertex(v)?;
        let cluster = self.clusters.get_mut(&id).ok_or(NiseError::UnknownCluster(id))?;
        if !cluster.insert(v)? {
            return Ok(false);
        }

        let others: Vec<ClusterId> = self.membership[v].iter().copied().collect();
        for other in others {
            self.link_overlap(id, other)?;
        }
        self.membership[v].insert(id);

        Ok(true)
    }

    /// Remove vertex `v` from cluster `id`. Returns `Ok(false)` if it was not a member.
    pub fn remove_vertex_from_cluster(&mut self, v: usize, id: ClusterId) -> Result<bool> {
        self.check_vertex(v)?;
        let cluster = self.clusters.get_mut(&id).ok_or(NiseError::UnknownCluster(id))?;
        if !cluster.remove(v)? {
            return Ok(false);
        }

        self.membership[v].remove(&id);
        let others: Vec<ClusterId> = self.membership[v].iter().copied().collect();
        for other in others {
            self.unlink_overlap(id, other)?;
        }

        Ok(true)
    }

    /// Remove vertex `v` from cluster `id` and return the next member of the
    /// cluster after `v`, if any.
    pub fn remove_vertex_and_next(&mut self, v: usize, id: ClusterId) -> Result<Option<usize>> {
        if !self.remove_vertex_from_cluster(v, id)? {
            return Ok(None);
        }
        let cluster = self.get(id)?;
        Ok(cluster.iter().find(|&u| u > v))
    }

    /// Remove a whole cluster, returning it
    pub fn remove_cluster(&mut self, id: ClusterId) -> Result<Cluster<'g, G>> {
        let cluster = self.clusters.remove(&id).ok_or(NiseError::UnknownCluster(id))?;

        for v in cluster.iter() {
            self.membership[v].remove(&id);
        }

        let partners = self.overlaps.remove(&id).unwrap_or_default();
        for other in partners.keys() {
            let removed = self
                .overlaps
                .get_mut(other)
                .and_then(|shared| shared.remove(&id));
            if removed.is_none() {
                return Err(NiseError::ConsistencyViolation(format!(
                    "cluster {} overlaps {} but not the other way round",
                    id, other
                )));
            }
        }

        Ok(cluster)
    }

    /// Number of vertices shared by clusters `a` and `b`
    pub fn overlap_size(&self, a: ClusterId, b: ClusterId) -> Result<usize> {
        let from_a = self.overlaps.get(&a).ok_or(NiseError::UnknownCluster(a))?;
        let from_b = self.overlaps.get(&b).ok_or(NiseError::UnknownCluster(b))?;

        let ab = from_a.get(&b).copied().unwrap_or(0);
        let ba = from_b.get(&a).copied().unwrap_or(0);
        if ab != ba {
            return Err(NiseError::ConsistencyViolation(format!(
                "overlap of {} with {} is {} but {} the other way round",
                a, b, ab, ba
            )));
        }
        Ok(ab)
    }

    /// Ids of the clusters containing `v`
    pub fn membership_of(&self, v: usize) -> Result<&BTreeSet<ClusterId>> {
        self.check_vertex(v)?;
        Ok(&self.membership[v])
    }

    /// Ids of the clusters sharing at least one vertex with `id`, ascending
    pub fn neighboring_clusters(&self, id: ClusterId) -> Result<Vec<ClusterId>> {
        let shared = self.overlaps.get(&id).ok_or(NiseError::UnknownCluster(id))?;
        let mut ids: Vec<ClusterId> = shared.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of clusters sharing at least one vertex with `id`
    pub fn overlapping_count(&self, id: ClusterId) -> Result<usize> {
        self.overlaps
            .get(&id)
            .map(|shared| shared.len())
            .ok_or(NiseError::UnknownCluster(id))
    }

    /// True iff every vertex belongs to at least one cluster
    pub fn all_vertices_clustered(&self) -> bool {
        self.membership.iter().all(|ids| !ids.is_empty())
    }

    /// Recompute the membership index and overlap counts from the clusters and
    /// compare them with the incrementally maintained ones.
    pub fn verify_consistency(&self) -> Result<()> {
        let mut membership = vec![BTreeSet::new(); self.vertex_count];
        for (&id, cluster) in &self.clusters {
            for v in cluster.iter() {
                membership[v].insert(id);
            }
        }
        if membership != self.membership {
            return Err(NiseError::ConsistencyViolation(
                "membership index does not match cluster contents".to_string(),
            ));
        }

        let mut expected: HashMap<(ClusterId, ClusterId), usize> = HashMap::new();
        for ids in &membership {
            for (&a, &b) in ids.iter().tuple_combinations() {
                *expected.entry((a, b)).or_insert(0) += 1;
            }
        }

        let mut recorded = 0;
        for (&a, shared) in &self.overlaps {
            for (&b, &count) in shared {
                let key = if a < b { (a, b) } else { (b, a) };
                if expected.get(&key) != Some(&count) {
                    return Err(NiseError::ConsistencyViolation(format!(
                        "overlap of {} with {} recorded as {}, actual {}",
                        a,
                        b,
                        count,
                        expected.get(&key).copied().unwrap_or(0)
                    )));
                }
                recorded += 1;
            }
        }
        if recorded != 2 * expected.len() {
            return Err(NiseError::ConsistencyViolation(format!(
                "{} overlap entries recorded, {} expected",
                recorded,
                2 * expected.len()
            )));
        }

        Ok(())
    }

    /// Write one line per cluster in insertion order, members ascending and
    /// separated by a single space
    pub fn write_listing<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for cluster in self.clusters.values() {
            writeln!(writer, "{}", cluster.iter().join(" "))?;
        }
        Ok(())
    }

    /// Listing as a string, see [`Clustering::write_listing`]
    pub fn to_listing(&self) -> String {
        let mut buffer = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_listing(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Increment the shared count of a pair, creating it at 1
    fn link_overlap(&mut self, a: ClusterId, b: ClusterId) -> Result<()> {
        let ab = self.bump(a, b)?;
        let ba = self.bump(b, a)?;
        if ab != ba {
            return Err(NiseError::ConsistencyViolation(format!(
                "overlap of {} with {} became {} but {} the other way round",
                a, b, ab, ba
            )));
        }
        Ok(())
    }

    fn bump(&mut self, a: ClusterId, b: ClusterId) -> Result<usize> {
        let shared = self.overlaps.get_mut(&a).ok_or(NiseError::UnknownCluster(a))?;
        let count = shared.entry(b).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Decrement the shared count of a pair, dropping it from both sides at zero
    fn unlink_overlap(&mut self, a: ClusterId, b: ClusterId) -> Result<()> {
        let ab = self.drop_one(a, b)?;
        let ba = self.drop_one(b, a)?;
        if ab != ba {
            return Err(NiseError::ConsistencyViolation(format!(
                "overlap of {} with {} became {} but {} the other way round",
                a, b, ab, ba
            )));
        }
        Ok(())
    }

    fn drop_one(&mut self, a: ClusterId, b: ClusterId) -> Result<usize> {
        let shared = self.overlaps.get_mut(&a).ok_or(NiseError::UnknownCluster(a))?;
        let Some(count) = shared.get_mut(&b) else {
            return Err(NiseError::ConsistencyViolation(format!(
                "cluster {} shares a vertex with {} but has no overlap entry",
                a, b
            )));
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            shared.remove(&b);
        }
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompressedGraph;
    use proptest::prelude::*;

    fn graph() -> CompressedGraph {
        CompressedGraph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)])
    }

    fn cluster<'g>(g: &'g CompressedGraph, vertices: &[usize]) -> Cluster<'g, CompressedGraph> {
        Cluster::from_vertices(g, vertices.iter().copied()).unwrap()
    }

    #[test]
    fn insert_records_membership_and_overlap() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        let a = clustering.insert(cluster(&g, &[0, 1, 2])).unwrap();
        let b = clustering.insert(cluster(&g, &[2, 3, 4])).unwrap();
        let c = clustering.insert(cluster(&g, &[5])).unwrap();

        assert_eq!((a, b, c), (ClusterId(0), ClusterId(1), ClusterId(2)));
        assert_eq!(clustering.overlap_size(a, b).unwrap(), 1);
        assert_eq!(clustering.overlap_size(b, a).unwrap(), 1);
        assert_eq!(clustering.overlap_size(a, c).unwrap(), 0);
        assert_eq!(clustering.membership_of(2).unwrap().len(), 2);
        assert_eq!(clustering.neighboring_clusters(b).unwrap(), vec![a]);
        assert_eq!(clustering.overlapping_count(c).unwrap(), 0);
        assert!(clustering.all_vertices_clustered());
        clustering.verify_consistency().unwrap();
    }

    #[test]
    fn vertex_moves_keep_overlaps_exact() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        let a = clustering.insert(cluster(&g, &[0, 1, 2])).unwrap();
        let b = clustering.insert(cluster(&g, &[3, 4])).unwrap();

        assert!(clustering.insert_vertex_in_cluster(1, b).unwrap());
        assert!(clustering.insert_vertex_in_cluster(2, b).unwrap());
        assert!(!clustering.insert_vertex_in_cluster(2, b).unwrap());
        assert_eq!(clustering.overlap_size(a, b).unwrap(), 2);

        assert!(clustering.remove_vertex_from_cluster(1, a).unwrap());
        assert_eq!(clustering.overlap_size(a, b).unwrap(), 1);
        assert!(clustering.remove_vertex_from_cluster(2, b).unwrap());
        assert_eq!(clustering.overlap_size(a, b).unwrap(), 0);
        assert!(clustering.neighboring_clusters(a).unwrap().is_empty());

        assert!(!clustering.remove_vertex_from_cluster(5, a).unwrap());
        clustering.verify_consistency().unwrap();
    }

    #[test]
    fn remove_cluster_clears_every_trace() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        let a = clustering.insert(cluster(&g, &[0, 1, 2, 3])).unwrap();
        let b = clustering.insert(cluster(&g, &[2, 3, 4])).unwrap();

        let removed = clustering.remove_cluster(a).unwrap();
        assert_eq!(removed.to_vec(), vec![0, 1, 2, 3]);
        assert!(clustering.membership_of(0).unwrap().is_empty());
        assert!(clustering.neighboring_clusters(b).unwrap().is_empty());
        assert!(matches!(clustering.overlap_size(a, b), Err(NiseError::UnknownCluster(_))));
        assert!(matches!(clustering.remove_cluster(a), Err(NiseError::UnknownCluster(_))));

        // ids are not reused
        let c = clustering.insert(cluster(&g, &[0])).unwrap();
        assert_eq!(c, ClusterId(2));
        clustering.verify_consistency().unwrap();
    }

    #[test]
    fn duplicates_are_rejected_without_mutation() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        assert!(clustering.insert_without_duplicate(cluster(&g, &[0, 1])).unwrap().is_some());
        assert!(clustering.insert_without_duplicate(cluster(&g, &[1, 0])).unwrap().is_none());
        assert_eq!(clustering.len(), 1);
        assert_eq!(clustering.membership_of(0).unwrap().len(), 1);
    }

    #[test]
    fn unknown_ids_and_vertices_are_errors() {
        let g = graph();
        let other = CompressedGraph::from_edges(3, &[(0, 1)]);
        let mut clustering = Clustering::new(g.vertex_count());
        assert!(matches!(
            clustering.insert_vertex_in_cluster(0, ClusterId(7)),
            Err(NiseError::UnknownCluster(ClusterId(7)))
        ));
        let a = clustering.insert(cluster(&g, &[0])).unwrap();
        assert!(matches!(
            clustering.insert_vertex_in_cluster(6, a),
            Err(NiseError::InvariantViolation(_))
        ));
        assert!(matches!(clustering.membership_of(6), Err(NiseError::InvariantViolation(_))));

        assert!(matches!(
            clustering.insert(Cluster::new(&other)),
            Err(NiseError::InvariantViolation(_))
        ));
    }

    #[test]
    fn listing_follows_insertion_order() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        clustering.insert(cluster(&g, &[5, 3, 4])).unwrap();
        clustering.insert(cluster(&g, &[2, 0])).unwrap();
        assert_eq!(clustering.to_listing(), "3 4 5\n0 2\n");
        assert!(!clustering.all_vertices_clustered());
    }

    #[test]
    fn remove_vertex_and_next_resumes_after_deletion() {
        let g = graph();
        let mut clustering = Clustering::new(g.vertex_count());
        let a = clustering.insert(cluster(&g, &[0, 2, 4])).unwrap();
        clustering.insert(cluster(&g, &[2, 4])).unwrap();

        let mut next = Some(0);
        while let Some(v) = next {
            next = clustering.remove_vertex_and_next(v, a).unwrap();
        }
        assert!(clustering.get(a).unwrap().is_empty());
        assert!(clustering.neighboring_clusters(a).unwrap().is_empty());
        clustering.verify_consistency().unwrap();
    }

    #[derive(Debug, Clone)]
    enum Op {
        InsertCluster(Vec<usize>),
        InsertVertex(usize, usize),
        RemoveVertex(usize, usize),
        RemoveCluster(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::collection::vec(0usize..8, 0..6).prop_map(Op::InsertCluster),
            (0usize..8, 0usize..6).prop_map(|(v, c)| Op::InsertVertex(v, c)),
            (0usize..8, 0usize..6).prop_map(|(v, c)| Op::RemoveVertex(v, c)),
            (0usize..6).prop_map(Op::RemoveCluster),
        ]
    }

    proptest! {
        #[test]
        fn overlap_counts_match_intersections(ops in prop::collection::vec(op_strategy(), 0..50)) {
            let g = CompressedGraph::from_edges(8, &[(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (6, 7), (2, 6)]);
            let mut clustering = Clustering::new(g.vertex_count());

            for op in ops {
                // ops addressing missing clusters are expected to fail and change nothing
                let _ = match op {
                    Op::InsertCluster(vs) => clustering.insert(cluster(&g, &vs)).map(|_| ()),
                    Op::InsertVertex(v, c) => clustering.insert_vertex_in_cluster(v, ClusterId(c)).map(|_| ()),
                    Op::RemoveVertex(v, c) => clustering.remove_vertex_from_cluster(v, ClusterId(c)).map(|_| ()),
                    Op::RemoveCluster(c) => clustering.remove_cluster(ClusterId(c)).map(|_| ()),
                };

                prop_assert!(clustering.verify_consistency().is_ok());
                let ids = clustering.ids();
                for &a in &ids {
                    for &b in &ids {
                        if a == b {
                            continue;
                        }
                        let shared = clustering.get(a).unwrap().iter()
                            .filter(|&v| clustering.get(b).unwrap().contains(v))
                            .count();
                        prop_assert_eq!(clustering.overlap_size(a, b).unwrap(), shared);
                        prop_assert_eq!(clustering.overlap_size(b, a).unwrap(), shared);
                    }
                }
            }
        }
    }
}
