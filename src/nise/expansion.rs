//! Seed expansion phase
//!
//! Each seed is grown into one cluster: an approximate personalized PageRank
//! vector is pushed out from the seed over the core subgraph, the touched
//! vertices are ranked by probability per degree, and the prefix of that
//! ranking with the lowest conductance becomes the cluster. Seeds are spread
//! over a fixed set of scoped worker threads; the shared clustering is only
//! locked to insert a finished cluster.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::cluster::{conductance, Cluster, Clustering};
use crate::config::Config;
use crate::data::preprocessing::InducedSubgraph;
use crate::error::{NiseError, Result};
use crate::graph::GraphView;
use crate::nise::progress::ProgressObserver;

/// Approximate personalized PageRank of `seed` by residual pushing.
///
/// Returns the probability mass of every vertex that received some. The seed
/// and its neighbors always have an entry, possibly zero.
pub fn personalized_pagerank<G: GraphView>(
    graph: &G,
    seed: usize,
    alpha: f64,
    epsilon: f64,
) -> HashMap<usize, f64> {
    let qualifies = |v: usize, residual: f64| {
        let degree = graph.degree(v);
        degree > 0 && residual > degree as f64 * epsilon
    };

    let mut x: HashMap<usize, f64> = HashMap::new();
    let mut r: HashMap<usize, f64> = HashMap::new();

    let initial = 1.0 / (graph.degree(seed) + 1) as f64;
    x.insert(seed, 0.0);
    r.insert(seed, initial);
    for u in graph.neighbors(seed) {
        x.insert(u, 0.0);
        r.insert(u, initial);
    }

    let mut queue = VecDeque::new();
    let mut queued = HashSet::new();
    for v in std::iter::once(seed).chain(graph.neighbors(seed)) {
        if qualifies(v, initial) && queued.insert(v) {
            queue.push_back(v);
        }
    }

    while let Some(&v) = queue.front() {
        let residual = r.get(&v).copied().unwrap_or(0.0);
        let degree = graph.degree(v);

        *x.entry(v).or_insert(0.0) += (1.0 - alpha) * residual;

        let share = alpha * residual / (2 * degree) as f64;
        for u in graph.neighbors(v) {
            let ru = r.entry(u).or_insert(0.0);
            *ru += share;
            if qualifies(u, *ru) && queued.insert(u) {
                queue.push_back(u);
            }
        }

        let remaining = alpha * residual / 2.0;
        r.insert(v, remaining);
        if !qualifies(v, remaining) {
            queue.pop_front();
            queued.remove(&v);
        }
    }

    x
}

/// Vertices of `x` by decreasing probability per degree, ties by ascending id
pub fn sort_by_probability_per_degree<G: GraphView>(graph: &G, x: &HashMap<usize, f64>) -> Vec<usize> {
    let ppd = |v: usize| {
        let degree = graph.degree(v);
        if degree == 0 {
            0.0
        } else {
            x[&v] / degree as f64
        }
    };

    let mut order: Vec<(usize, f64)> = x.keys().map(|&v| (v, ppd(v))).collect();
    order.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    order.into_iter().map(|(v, _)| v).collect()
}

/// Length of the prefix of `order` with minimum conductance in `graph`.
/// Later prefixes win ties; an empty order gives 0.
pub fn min_conductance_prefix<G: GraphView>(graph: &G, order: &[usize]) -> usize {
    let mut sweep_set = HashSet::with_capacity(order.len());
    let mut volume = 0;
    let mut boundary_edges = 0;
    let mut best = f64::INFINITY;
    let mut best_len = 0;

    for (i, &v) in order.iter().enumerate() {
        sweep_set.insert(v);
        for u in graph.neighbors(v) {
            if sweep_set.contains(&u) {
                boundary_edges -= 1;
            } else {
                boundary_edges += 1;
            }
        }
        volume += graph.degree(v);

        let value = conductance(graph.edge_count(), volume, boundary_edges);
        if value <= best {
            best = value;
            best_len = i + 1;
        }
    }

    best_len
}

/// Grow `seed`, a vertex of the core subgraph, into a cluster of `graph`
pub fn expand_seed<'g, G: GraphView>(
    graph: &'g G,
    core: &InducedSubgraph,
    seed: usize,
    alpha: f64,
    epsilon: f64,
) -> Result<Cluster<'g, G>> {
    let x = personalized_pagerank(&core.graph, seed, alpha, epsilon);
    let order = sort_by_probability_per_degree(&core.graph, &x);
    let len = min_conductance_prefix(&core.graph, &order);

    log::debug!(
        "Seed {} reached {} vertices, best sweep keeps {}",
        core.original(seed),
        order.len(),
        len
    );

    Cluster::from_vertices(graph, order[..len].iter().map(|&v| core.original(v)))
}

/// Split `len` items into `parts` contiguous ranges whose sizes differ by at most one
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let base = len / parts;
    let extra = len % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// Expand every seed (core subgraph ids) and insert the clusters into `clustering`.
///
/// Returns the clustering once every worker has joined.
pub fn expand_seeds<'g, G: GraphView + Sync>(
    graph: &'g G,
    core: &InducedSubgraph,
    seeds: &[usize],
    config: &Config,
    clustering: Clustering<'g, G>,
    observer: &dyn ProgressObserver,
) -> Result<Clustering<'g, G>> {
    if seeds.is_empty() {
        return Ok(clustering);
    }

    let workers = config.resolved_threads().min(seeds.len());
    let total = seeds.len();
    log::info!("Expanding {} seeds on {} worker threads", total, workers);

    let shared = Mutex::new(clustering);
    let done = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let (alpha, epsilon) = (config.alpha, config.epsilon);
    let skip_duplicates = config.skip_duplicate_clusters;

    let joined = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = partition(total, workers)
            .into_iter()
            .map(|range| {
                let shared = &shared;
                let done = &done;
                let failed = &failed;
                scope.spawn(move |_| -> Result<()> {
                    for &seed in &seeds[range] {
                        if failed.load(Ordering::Relaxed) {
                            break;
                        }

                        let cluster = match expand_seed(graph, core, seed, alpha, epsilon) {
                            Ok(cluster) => cluster,
                            Err(e) => {
                                failed.store(true, Ordering::Relaxed);
                                return Err(e);
                            }
                        };

                        let inserted = {
                            let mut guard = shared.lock().map_err(|_| {
                                NiseError::WorkerFailed("shared clustering lock poisoned".to_string())
                            })?;
                            if skip_duplicates {
                                guard.insert_without_duplicate(cluster).map(|_| ())
                            } else {
                                guard.insert(cluster).map(|_| ())
                            }
                        };
                        if let Err(e) = inserted {
                            failed.store(true, Ordering::Relaxed);
                            return Err(e);
                        }

                        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                        observer.seed_expanded(finished, total);
                    }
                    Ok(())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| NiseError::WorkerFailed("expansion worker panicked".to_string()))
                    .and_then(|outcome| outcome)
            })
            .collect::<Result<()>>()
    });

    joined.map_err(|_| NiseError::WorkerFailed("expansion scope panicked".to_string()))??;

    shared
        .into_inner()
        .map_err(|_| NiseError::WorkerFailed("shared clustering lock poisoned".to_string()))
}
