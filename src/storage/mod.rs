//! Results persistence module

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use serde_json::{json, to_string_pretty};

use crate::cluster::metrics::{calculate_cluster_metrics, summarize};
use crate::cluster::{Cluster, Clustering};
use crate::config::Config;
use crate::graph::{CompressedGraph, GraphView};

/// File name of the cluster listing inside the output directory
pub const CLUSTERING_FILE: &str = "clustering.dat";

/// File name of the JSON summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// Save analysis results to the specified directory
pub fn save_results<G: GraphView + Sync, P: AsRef<Path>>(
    graph: &G,
    clustering: &Clustering<'_, G>,
    seeds: &[usize],
    config: &Config,
    output_dir: P,
) -> Result<()> {
    let output_dir = output_dir.as_ref();
    log::info!("Saving {} clusters to {}", clustering.len(), output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    save_clustering(clustering, output_dir.join(CLUSTERING_FILE))?;
    save_summary(graph, clustering, seeds, config, output_dir.join(SUMMARY_FILE))?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Write the cluster listing: one line per cluster, members ascending
pub fn save_clustering<G: GraphView, P: AsRef<Path>>(clustering: &Clustering<'_, G>, path: P) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing clustering to {}", path.display());

    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    clustering.write_listing(&mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Save summary information
fn save_summary<G: GraphView + Sync>(
    graph: &G,
    clustering: &Clustering<'_, G>,
    seeds: &[usize],
    config: &Config,
    path: impl AsRef<Path>,
) -> Result<()> {
    log::info!("Saving summary information");

    let vertex_count = graph.vertex_count();
    let edge_count = graph.edge_count();
    let avg_degree = if vertex_count == 0 {
        0.0
    } else {
        2.0 * edge_count as f64 / vertex_count as f64
    };

    let summary = json!({
        "graph_stats": {
            "vertex_count": vertex_count,
            "edge_count": edge_count,
            "avg_degree": avg_degree,
        },
        "parameters": config,
        "seeds": seeds,
        "cluster_stats": summarize(clustering),
        "clusters": calculate_cluster_metrics(clustering),
    });

    let mut file = File::create(path.as_ref())
        .with_context(|| format!("Cannot create {}", path.as_ref().display()))?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Write `graph` as a binary cache that [`load_graph`] reads back without parsing text
pub fn save_graph<P: AsRef<Path>>(graph: &CompressedGraph, path: P) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving binary graph to {}", path.display());

    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, graph)?;
    writer.flush()?;

    Ok(())
}

/// Read a graph written by [`save_graph`]
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Loading binary graph from {}", path.display());

    let file = File::open(path).with_context(|| format!("File not found: {}", path.display()))?;
    let graph: CompressedGraph = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Corrupt graph file {}", path.display()))?;

    check_adjacency(&graph).with_context(|| format!("Corrupt graph file {}", path.display()))?;

    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count,
        graph.edges.len() / 2
    );

    Ok(graph)
}

/// Reject graphs whose lists are not sorted, duplicate free, loop free and
/// symmetric; adjacency tests and cluster degrees rely on all of it.
fn check_adjacency(graph: &CompressedGraph) -> Result<()> {
    let n = graph.node_count;
    if graph.offsets.len() != n + 1
        || graph.offsets.first() != Some(&0)
        || graph.offsets.last().map(|&end| end as usize) != Some(graph.edges.len())
    {
        anyhow::bail!("offsets do not cover the edge array");
    }
    if graph.offsets.windows(2).any(|pair| pair[0] > pair[1]) {
        anyhow::bail!("offsets are not monotone");
    }

    for v in 0..n {
        let neighbors = graph.neighbors_of(v);
        if let Some(&u) = neighbors.iter().find(|&&u| u as usize >= n) {
            anyhow::bail!("vertex {} has neighbor {} out of range", v, u);
        }
        if neighbors.windows(2).any(|pair| pair[0] >= pair[1]) {
            anyhow::bail!("neighbors of {} are not strictly ascending", v);
        }
        for &u in neighbors {
            let u = u as usize;
            if u == v {
                anyhow::bail!("self loop at {}", v);
            }
            if !graph.has_edge(u, v) {
                anyhow::bail!("edge {} {} is stored in one direction only", v, u);
            }
        }
    }

    Ok(())
}

/// Read a cluster listing written by [`save_clustering`] back into a
/// clustering of `graph`. Blank lines are skipped.
pub fn load_clustering<'g, G: GraphView, P: AsRef<Path>>(graph: &'g G, path: P) -> Result<Clustering<'g, G>> {
    let path = path.as_ref();
    log::info!("Reading clustering from {}", path.display());

    let file = File::open(path).with_context(|| format!("File not found: {}", path.display()))?;
    let mut clustering = Clustering::new(graph.vertex_count());

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let members = line
            .split_whitespace()
            .map(|field| field.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("{}: line {}: invalid vertex id", path.display(), index + 1))?;

        let cluster = Cluster::from_vertices(graph, members)
            .with_context(|| format!("{}: line {}", path.display(), index + 1))?;
        clustering.insert(cluster)?;
    }

    log::info!("Read {} clusters", clustering.len());

    Ok(clustering)
}
