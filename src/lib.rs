//! Overlapping community detection by neighborhood-inflated seed expansion

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod nise;
pub mod storage;

pub use cluster::{Cluster, ClusterId, Clustering};
pub use config::Config;
pub use error::{NiseError, Result};
pub use graph::{CompressedGraph, GraphView};
pub use nise::Nise;
