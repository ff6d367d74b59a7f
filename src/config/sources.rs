//! Configuration sources, applied in merge-policy order.

pub mod environment;
pub mod global_file;
pub mod workspace_file;
