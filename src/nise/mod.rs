//! Neighborhood-Inflated Seed Expansion
//!
//! Detection runs in four stages over a read-only graph:
//!
//! 1. filtering: drop bridges and keep the largest remaining component
//!    (the biconnected core), renumbered as its own graph
//! 2. seeding: pick seeds in the core by spread hubs
//! 3. expansion: grow each seed by personalized PageRank and a
//!    minimum-conductance sweep, concurrently
//! 4. propagation: hand the trees hanging off the core through bridges to the
//!    clusters of the core vertex they hang from
//!
//! Reference: J. J. Whang, D. F. Gleich, I. S. Dhillon, "Overlapping community
//! detection using neighborhood-inflated seed expansion", IEEE TKDE 28(5), 2016.

pub mod expansion;
pub mod filtering;
pub mod progress;
pub mod propagation;
pub mod seeding;

use crate::cluster::Clustering;
use crate::config::Config;
use crate::error::{NiseError, Result};
use crate::graph::GraphView;

pub use progress::{LogProgress, NoProgress, ProgressObserver, Stage};

/// One detection run over `graph`. Create a fresh value per run.
pub struct Nise<'g, G> {
    graph: &'g G,
    config: Config,
    observer: Box<dyn ProgressObserver>,
    stage: Stage,
    started: bool,
    seeds: Vec<usize>,
    clustering: Option<Clustering<'g, G>>,
}

impl<'g, G: GraphView + Sync> Nise<'g, G> {
    pub fn new(graph: &'g G, config: Config) -> Self {
        Self {
            graph,
            config,
            observer: Box::new(LogProgress::default()),
            stage: Stage::Filtering,
            started: false,
            seeds: Vec::new(),
            clustering: None,
        }
    }

    /// Replace the default logging observer
    pub fn with_observer<O: ProgressObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stage reached so far; `Done` after a successful run
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Seeds selected during the run, as vertices of the full graph
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Run all stages. A pipeline runs at most once, even if that run failed.
    pub fn execute(&mut self) -> Result<()> {
        if self.started {
            return Err(NiseError::AlreadyExecuted);
        }
        self.started = true;
        self.config.validate()?;

        let graph = self.graph;
        let observer = self.observer.as_ref();
        log::info!(
            "Running NISE on {} vertices and {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        self.stage = Stage::Filtering;
        observer.stage_started(Stage::Filtering);
        let mut filtering = filtering::filter(graph);
        observer.stage_finished(Stage::Filtering);

        self.stage = Stage::Seeding;
        observer.stage_started(Stage::Seeding);
        let seeds = seeding::spread_hubs(&filtering.core.graph, self.config.number_of_seeds);
        self.seeds = seeds.iter().map(|&v| filtering.core.original(v)).collect();
        observer.stage_finished(Stage::Seeding);

        self.stage = Stage::Expansion;
        observer.stage_started(Stage::Expansion);
        let mut clustering = expansion::expand_seeds(
            graph,
            &filtering.core,
            &seeds,
            &self.config,
            Clustering::new(graph.vertex_count()),
            observer,
        )?;
        observer.stage_finished(Stage::Expansion);

        self.stage = Stage::Propagation;
        observer.stage_started(Stage::Propagation);
        propagation::propagate(graph, &filtering.bridges, &mut filtering.in_core, &mut clustering)?;
        observer.stage_finished(Stage::Propagation);

        log::info!("Found {} clusters", clustering.len());
        self.clustering = Some(clustering);
        self.stage = Stage::Done;

        Ok(())
    }

    /// The clustering produced by [`Nise::execute`]
    pub fn clustering(&self) -> Result<&Clustering<'g, G>> {
        self.clustering.as_ref().ok_or(NiseError::NotExecuted)
    }

    /// Take the clustering produced by [`Nise::execute`]
    pub fn into_clustering(self) -> Result<Clustering<'g, G>> {
        self.clustering.ok_or(NiseError::NotExecuted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompressedGraph;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        stages: AtomicUsize,
        seeds: AtomicUsize,
    }

    impl ProgressObserver for Arc<Counting> {
        fn stage_finished(&self, _stage: Stage) {
            self.stages.fetch_add(1, Ordering::Relaxed);
        }

        fn seed_expanded(&self, _done: usize, _total: usize) {
            self.seeds.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn two_triangles() -> CompressedGraph {
        CompressedGraph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)])
    }

    #[test]
    fn result_requires_execution() {
        let g = two_triangles();
        let nise = Nise::new(&g, Config::new(2, 0.99, 1e-4));
        assert_eq!(nise.stage(), Stage::Filtering);
        assert!(matches!(nise.clustering(), Err(NiseError::NotExecuted)));
        assert!(matches!(nise.into_clustering(), Err(NiseError::NotExecuted)));
    }

    #[test]
    fn second_execution_is_rejected() {
        let g = two_triangles();
        let mut nise = Nise::new(&g, Config::new(2, 0.99, 1e-4));
        nise.execute().unwrap();
        assert_eq!(nise.stage(), Stage::Done);
        assert_eq!(nise.execute(), Err(NiseError::AlreadyExecuted));
        assert_eq!(nise.clustering().unwrap().len(), 2);
    }

    #[test]
    fn invalid_config_fails_before_any_stage() {
        let g = two_triangles();
        let mut nise = Nise::new(&g, Config::new(0, 0.99, 1e-4));
        assert!(matches!(nise.execute(), Err(NiseError::InvalidConfig { .. })));
        assert!(nise.clustering().is_err());
    }

    #[test]
    fn observer_sees_every_stage_and_seed() {
        let g = two_triangles();
        let counting = Arc::new(Counting::default());
        let mut nise = Nise::new(&g, Config::new(2, 0.99, 1e-4)).with_observer(Arc::clone(&counting));
        nise.execute().unwrap();

        assert_eq!(counting.stages.load(Ordering::Relaxed), 4);
        assert_eq!(counting.seeds.load(Ordering::Relaxed), 2);
        assert_eq!(nise.seeds(), &[0, 3]);
    }
}
