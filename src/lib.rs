//! Slipway - build-and-package orchestrator for the levython runtime.
//!
//! Given the levython source tree and a set of target architectures,
//! slipway finds a C++ toolchain and libcurl, compiles and links the
//! runtime per architecture, stages the release files, and produces a
//! compressed archive plus an optional self-extracting installer.

pub mod builder;
pub mod core;
pub mod error;
pub mod ops;
pub mod package;
pub mod resolver;
pub mod util;

pub use crate::core::arch::{Arch, ArchSelect};
pub use crate::core::product::ProductManifest;
pub use crate::error::{Error, Result};
