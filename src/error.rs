//! Failure taxonomy for the distribution pipeline.
//!
//! Every stage reports one of these variants. Diagnostics carry the failing
//! tool's output verbatim plus a one-line stage context; callers add
//! nothing but the architecture they were working on.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::arch::Arch;

/// A stage-level failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "no usable C++ toolchain found\n\
         \n\
         slipway needs g++, clang++, or a Visual Studio installation\n\
         discoverable through vswhere. Set the CXX environment variable\n\
         or install a compiler."
    )]
    ToolchainNotFound,

    #[error(
        "libcurl not found for {arch}\n\
         \n\
         Searched CURL_ROOT, vcpkg trees, system prefixes, and the\n\
         toolchain root. Set CURL_ROOT to a directory containing\n\
         include/ and lib/ for this architecture."
    )]
    DependencyNotFound { arch: Arch },

    #[error("failed to compile `{unit}`\n{detail}")]
    CompileFailed { unit: PathBuf, detail: String },

    #[error("failed to link `{output}`\n{detail}")]
    LinkFailed { output: PathBuf, detail: String },

    #[error("linker exited cleanly but `{output}` is missing or empty")]
    BuildIncomplete { output: PathBuf },

    #[error("required package input missing: {path}")]
    PackageSourceMissing { path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether this failure must stop the remaining architectures too.
    ///
    /// A broken compile, link, or output verification sinks the whole
    /// multi-architecture run. Dependency resolution and packaging
    /// failures only sink the architecture they hit; the run moves on and
    /// exits non-zero at the end.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            Error::ToolchainNotFound
                | Error::CompileFailed { .. }
                | Error::LinkFailed { .. }
                | Error::BuildIncomplete { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
