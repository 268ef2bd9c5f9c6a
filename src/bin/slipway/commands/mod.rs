//! Command implementations.

pub mod clean;
pub mod dist;
pub mod toolchain;
