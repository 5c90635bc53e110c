//! Cluster bookkeeping module
//!
//! A [`Cluster`] is a vertex set bound to one graph that keeps its internal
//! degree, external degree and external frontier exact under single-vertex
//! insertions and removals. A [`Clustering`] owns many clusters and keeps the
//! reverse membership index and the pairwise overlap counts between them.

pub mod clustering;
pub mod metrics;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use itertools::Itertools;
use serde::{Serialize, Deserialize};

use crate::error::{NiseError, Result};
use crate::graph::GraphView;

pub use clustering::Clustering;

/// Identifier of a cluster inside a [`Clustering`]; assigned in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of vertices of one graph with incrementally maintained degrees
pub struct Cluster<'g, G> {
    /// Graph the cluster lives in
    graph: &'g G,

    /// Member vertices, ordered
    members: BTreeSet<usize>,

    /// Twice the number of edges with both endpoints inside
    internal_degree: usize,

    /// Number of edges with exactly one endpoint inside
    external_degree: usize,

    /// Non-members adjacent to the cluster, with their number of member neighbors
    frontier: HashMap<usize, usize>,
}

impl<'g, G: GraphView> Cluster<'g, G> {
    /// Create an empty cluster of `graph`
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            members: BTreeSet::new(),
            internal_degree: 0,
            external_degree: 0,
            frontier: HashMap::new(),
        }
    }

    /// Create a cluster holding `vertices`
    pub fn from_vertices<I: IntoIterator<Item = usize>>(graph: &'g G, vertices: I) -> Result<Self> {
        let mut cluster = Self::new(graph);
        for v in vertices {
            cluster.insert(v)?;
        }
        Ok(cluster)
    }

    /// Graph this cluster belongs to
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        let n = self.graph.vertex_count();
        if v >= n {
            return Err(NiseError::vertex_out_of_range(v, n));
        }
        Ok(())
    }

    /// Insert `v`. Returns `Ok(false)` if it already was a member.
    pub fn insert(&mut self, v: usize) -> Result<bool> {
        self.check_vertex(v)?;
        if !self.members.insert(v) {
            return Ok(false);
        }

        let graph = self.graph;
        for u in graph.neighbors(v) {
            if self.members.contains(&u) {
                // the edge was counted as external from u's side
                self.internal_degree += 2;
                self.external_degree -= 1;
            } else {
                self.external_degree += 1;
                *self.frontier.entry(u).or_insert(0) += 1;
            }
        }
        self.frontier.remove(&v);

        Ok(true)
    }

    /// Remove `v`. Returns `Ok(false)` if it was not a member.
    pub fn remove(&mut self, v: usize) -> Result<bool> {
        self.check_vertex(v)?;
        if !self.members.remove(&v) {
            return Ok(false);
        }

        let graph = self.graph;
        let mut member_links = 0;
        for u in graph.neighbors(v) {
            if self.members.contains(&u) {
                self.internal_degree -= 2;
                self.external_degree += 1;
                member_links += 1;
            } else {
                self.external_degree -= 1;
                if let Some(links) = self.frontier.get_mut(&u) {
                    *links -= 1;
                    if *links == 0 {
                        self.frontier.remove(&u);
                    }
                }
            }
        }
        if member_links > 0 {
            self.frontier.insert(v, member_links);
        }

        Ok(true)
    }

    /// Remove `v` and return the smallest member greater than `v`, so a caller
    /// walking the members in order can resume after a deletion.
    /// Returns `Ok(None)` when `v` was not a member or was the last one.
    pub fn remove_and_next(&mut self, v: usize) -> Result<Option<usize>> {
        if !self.remove(v)? {
            return Ok(None);
        }
        Ok(self.members.range(v + 1..).next().copied())
    }

    /// Whether `v` is a member
    pub fn contains(&self, v: usize) -> bool {
        self.members.contains(&v)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Twice the number of intra-cluster edges
    pub fn internal_degree(&self) -> usize {
        self.internal_degree
    }

    /// Number of edges leaving the cluster
    pub fn external_degree(&self) -> usize {
        self.external_degree
    }

    /// Sum of the degrees of the members
    pub fn volume(&self) -> usize {
        self.internal_degree + self.external_degree
    }

    /// Conductance of the cluster in its graph; 1 when either side has no volume
    pub fn conductance(&self) -> f64 {
        conductance(self.graph.edge_count(), self.volume(), self.external_degree)
    }

    /// Non-members adjacent to at least one member
    pub fn frontier(&self) -> impl Iterator<Item = usize> + '_ {
        self.frontier.keys().copied()
    }

    /// Whether `v` is outside the cluster but adjacent to it
    pub fn is_frontier(&self, v: usize) -> bool {
        self.frontier.contains_key(&v)
    }

    /// Members in increasing order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    /// Members in increasing order, collected
    pub fn to_vec(&self) -> Vec<usize> {
        self.members.iter().copied().collect()
    }

    /// Whether both clusters are bound to the same graph instance
    pub fn same_graph(&self, other: &Cluster<'_, G>) -> bool {
        std::ptr::eq(self.graph, other.graph)
    }

    /// Add every member of `other` to this cluster
    pub fn merge(&mut self, other: &Cluster<'_, G>) -> Result<()> {
        if !self.same_graph(other) {
            return Err(NiseError::InvariantViolation(
                "cannot merge clusters of different graphs".to_string(),
            ));
        }
        for v in other.iter() {
            self.insert(v)?;
        }
        Ok(())
    }

    /// New cluster holding the members of both clusters
    pub fn union(&self, other: &Cluster<'_, G>) -> Result<Self> {
        let mut result = self.clone();
        result.merge(other)?;
        Ok(result)
    }
}

/// Conductance of a vertex set given the graph edge count, the set volume and
/// its boundary edge count. Returns 1 if the set or its complement has zero volume.
pub fn conductance(edge_count: usize, volume: usize, boundary_edges: usize) -> f64 {
    let total = 2 * edge_count;
    debug_assert!(volume <= total);
    let complement = total.saturating_sub(volume);
    if volume == 0 || complement == 0 {
        return 1.0;
    }
    boundary_edges as f64 / volume.min(complement) as f64
}

impl<'g, G> Clone for Cluster<'g, G> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            members: self.members.clone(),
            internal_degree: self.internal_degree,
            external_degree: self.external_degree,
            frontier: self.frontier.clone(),
        }
    }
}

impl<'a, 'b, G> PartialEq<Cluster<'b, G>> for Cluster<'a, G> {
    fn eq(&self, other: &Cluster<'b, G>) -> bool {
        self.members == other.members
    }
}

impl<'g, G> Eq for Cluster<'g, G> {}

impl<'g, G> fmt::Debug for Cluster<'g, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("members", &self.members)
            .field("internal_degree", &self.internal_degree)
            .field("external_degree", &self.external_degree)
            .field("frontier_size", &self.frontier.len())
            .finish()
    }
}

impl<'g, G> fmt::Display for Cluster<'g, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.members.iter().join(", "))
    }
}
