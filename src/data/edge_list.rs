//! Plain-text edge list handling for graph data
//!
//! The first non-blank line holds the number of vertices `N`; every following
//! non-blank line holds one undirected edge as two vertex ids in `0..N`
//! separated by whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};

use crate::graph::builder::GraphBuilder;
use crate::graph::CompressedGraph;

/// Load an undirected graph from an edge list file
pub fn load_edge_list<P: AsRef<Path>>(path: P) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading edge list: {}", path.display());

    let file = File::open(path).with_context(|| format!("File not found: {}", path.display()))?;
    let graph = read_edge_list(file).with_context(|| format!("Malformed edge list {}", path.display()))?;

    log::info!(
        "Loaded graph with {} nodes and {} edges ({} bytes)",
        graph.node_count,
        graph.edges.len() / 2,
        graph.memory_usage()
    );

    Ok(graph)
}

/// Parse an edge list from any reader
pub fn read_edge_list<R: Read>(reader: R) -> Result<CompressedGraph> {
    let reader = BufReader::new(reader);
    let mut builder: Option<GraphBuilder> = None;
    let mut self_loops = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("line {}: read error", line_number))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(builder) = builder.as_mut() else {
            let node_count: usize = line
                .parse()
                .with_context(|| format!("line {}: expected vertex count, found '{}'", line_number, line))?;
            builder = Some(GraphBuilder::new(node_count));
            continue;
        };

        let mut fields = line.split_whitespace();
        let (u, v) = match (fields.next(), fields.next(), fields.next()) {
            (Some(u), Some(v), None) => (parse_vertex(u, line_number)?, parse_vertex(v, line_number)?),
            _ => bail!("line {}: expected two vertex ids, found '{}'", line_number, line),
        };

        let n = builder.node_count();
        if u >= n || v >= n {
            bail!("line {}: edge ({}, {}) out of range for {} vertices", line_number, u, v, n);
        }
        if u == v {
            self_loops += 1;
        }
        builder.add_edge(u, v);
    }

    if self_loops > 0 {
        log::warn!("Ignored {} self loops", self_loops);
    }

    builder
        .map(GraphBuilder::build)
        .ok_or_else(|| anyhow!("missing vertex count header"))
}

fn parse_vertex(field: &str, line_number: usize) -> Result<usize> {
    field
        .parse()
        .with_context(|| format!("line {}: invalid vertex id '{}'", line_number, field))
}
