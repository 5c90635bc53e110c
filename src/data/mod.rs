//! Graph input and preprocessing

pub mod edge_list;
pub mod preprocessing;
