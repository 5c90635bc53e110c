//! Graph representation and algorithms module

pub mod view;
pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use compressed::CompressedGraph;
pub use view::{Edge, GraphView, normalize};
