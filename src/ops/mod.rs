//! High-level operations behind the CLI commands.

pub mod dist;

pub use dist::{dist, DistOptions};
