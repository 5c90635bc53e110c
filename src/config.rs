//! Configuration management for the NISE detector

use serde::{Serialize, Deserialize};
use crate::error::{NiseError, Result};

/// Parameters of one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of seeds to expand into clusters
    pub number_of_seeds: usize,

    /// PageRank teleportation parameter, in [0, 1)
    pub alpha: f64,

    /// PageRank push tolerance, in (0, 1]
    pub epsilon: f64,

    /// Number of expansion worker threads (0 = use all available cores)
    pub threads: usize,

    /// Drop expanded clusters equal to one already found
    pub skip_duplicate_clusters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_seeds: 1,
            alpha: 0.99,
            epsilon: 0.0001,
            threads: 0,
            skip_duplicate_clusters: false,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(number_of_seeds: usize, alpha: f64, epsilon: f64) -> Self {
        Self {
            number_of_seeds,
            alpha,
            epsilon,
            ..Self::default()
        }
    }

    /// Set the number of worker threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable duplicate cluster elimination
    pub fn with_skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicate_clusters = skip;
        self
    }

    /// Check every parameter against its domain
    pub fn validate(&self) -> Result<()> {
        if self.number_of_seeds == 0 {
            return Err(NiseError::InvalidConfig {
                name: "number_of_seeds",
                message: "at least one seed is required".to_string(),
            });
        }
        // at 1 no residual mass is ever absorbed and pushing need not stop
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(NiseError::InvalidConfig {
                name: "alpha",
                message: format!("{} is outside [0, 1)", self.alpha),
            });
        }
        if !(self.epsilon > 0.0 && self.epsilon <= 1.0) {
            return Err(NiseError::InvalidConfig {
                name: "epsilon",
                message: format!("{} is outside (0, 1]", self.epsilon),
            });
        }
        Ok(())
    }

    /// Worker thread count with 0 resolved to the number of cores
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}
