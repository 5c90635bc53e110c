//! Error types for the detection core

use crate::cluster::ClusterId;
use thiserror::Error;

/// Result alias used by the cluster bookkeeping and the pipeline
pub type Result<T> = std::result::Result<T, NiseError>;

/// Errors raised by clusters, clusterings and the NISE pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NiseError {
    /// A caller broke a precondition (vertex out of range, mismatched graphs, ...)
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A cluster id that is not present in the clustering
    #[error("unknown cluster id {0}")]
    UnknownCluster(ClusterId),

    /// Internal bookkeeping disagrees with itself
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Invalid configuration value
    #[error("invalid parameter '{name}': {message}")]
    InvalidConfig {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// The pipeline was executed twice
    #[error("pipeline has already been executed")]
    AlreadyExecuted,

    /// The clustering was requested before the pipeline ran
    #[error("pipeline has not been executed yet")]
    NotExecuted,

    /// An expansion worker panicked or the shared clustering lock was poisoned
    #[error("seed expansion worker failed: {0}")]
    WorkerFailed(String),
}

impl NiseError {
    pub(crate) fn vertex_out_of_range(v: usize, vertex_count: usize) -> Self {
        NiseError::InvariantViolation(format!(
            "vertex {} out of range (graph has {} vertices)",
            v, vertex_count
        ))
    }
}
