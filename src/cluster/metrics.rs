//! Cluster statistics and metrics

use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::cluster::{Cluster, ClusterId, Clustering};
use crate::graph::GraphView;

/// Quality figures of a single cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Cluster identifier
    pub id: ClusterId,

    /// Number of members
    pub size: usize,

    /// Edges with both endpoints inside
    pub internal_edges: usize,

    /// Edges with exactly one endpoint inside
    pub boundary_edges: usize,

    /// Conductance in the full graph
    pub conductance: f64,

    /// Density: internal edges / potential edges
    pub density: f64,

    /// Number of other clusters sharing a vertex with this one
    pub overlapping_clusters: usize,
}

/// Aggregate figures of a whole clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringSummary {
    pub cluster_count: usize,
    pub clustered_vertices: usize,
    pub unclustered_vertices: usize,
    pub largest_cluster_size: usize,
    pub smallest_cluster_size: usize,
    pub avg_cluster_size: f64,
    pub avg_conductance: f64,
    pub avg_density: f64,
    /// Mean number of clusters a clustered vertex belongs to
    pub avg_memberships: f64,
}

/// Calculate density (actual edges / potential edges) of an undirected cluster
pub fn calculate_density<G: GraphView>(cluster: &Cluster<'_, G>) -> f64 {
    let n = cluster.len();
    if n <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    let potential_edges = n * (n - 1) / 2;
    let actual_edges = cluster.internal_degree() / 2;

    actual_edges as f64 / potential_edges as f64
}

/// Calculate statistics for every cluster, in insertion order
pub fn calculate_cluster_metrics<G: GraphView + Sync>(clustering: &Clustering<'_, G>) -> Vec<ClusterStats> {
    let clusters: Vec<(ClusterId, &Cluster<'_, G>)> = clustering.iter().collect();

    clusters
        .par_iter()
        .map(|&(id, cluster)| ClusterStats {
            id,
            size: cluster.len(),
            internal_edges: cluster.internal_degree() / 2,
            boundary_edges: cluster.external_degree(),
            conductance: cluster.conductance(),
            density: calculate_density(cluster),
            overlapping_clusters: clustering.overlapping_count(id).unwrap_or(0),
        })
        .collect()
}

/// Summarize a clustering
pub fn summarize<G: GraphView + Sync>(clustering: &Clustering<'_, G>) -> ClusteringSummary {
    let stats = calculate_cluster_metrics(clustering);
    let count = stats.len();
    let divisor = if count == 0 { 1.0 } else { count as f64 };

    let memberships: Vec<usize> = (0..clustering.vertex_count())
        .into_par_iter()
        .map(|v| clustering.membership_of(v).map(|ids| ids.len()).unwrap_or(0))
        .collect();
    let clustered = memberships.iter().filter(|&&m| m > 0).count();
    let total_memberships: usize = memberships.iter().sum();

    ClusteringSummary {
        cluster_count: count,
        clustered_vertices: clustered,
        unclustered_vertices: clustering.vertex_count() - clustered,
        largest_cluster_size: stats.iter().map(|s| s.size).max().unwrap_or(0),
        smallest_cluster_size: stats.iter().map(|s| s.size).min().unwrap_or(0),
        avg_cluster_size: stats.iter().map(|s| s.size).sum::<usize>() as f64 / divisor,
        avg_conductance: stats.iter().map(|s| s.conductance).sum::<f64>() / divisor,
        avg_density: stats.iter().map(|s| s.density).sum::<f64>() / divisor,
        avg_memberships: if clustered == 0 {
            0.0
        } else {
            total_memberships as f64 / clustered as f64
        },
    }
}
