//! Locating libcurl for a target architecture.
//!
//! The search is an ordered list of candidate roots, each probed with the
//! same layout check and answering found / not found: an explicit
//! `CURL_ROOT` override, vcpkg-style package trees keyed by triplet,
//! well-known system prefixes, and finally the toolchain's own install
//! root. The first satisfying candidate wins, and the orchestrator never
//! spawns a compiler until this resolves.
//!
//! Candidate layouts differ by packaging convention: vendor SDK trees
//! nest binaries per architecture (`lib/<arch>`), flat distributions put
//! everything in `lib/`. The nested layout is checked first for MSVC,
//! then the flat "any curl binary present" fallback.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::{Toolchain, ToolchainKind};
use crate::core::arch::Arch;
use crate::error::Error;

/// Where a usable libcurl installation lives.
#[derive(Debug, Clone)]
pub struct CurlLocation {
    pub include_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub arch: Arch,
}

/// Inputs to the search, injected so the candidate list stays a pure
/// function of its arguments.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    /// `CURL_ROOT` override; always the first candidate.
    pub override_root: Option<PathBuf>,
    /// Home directory holding user-local package trees.
    pub home: Option<PathBuf>,
    /// Well-known system install prefixes.
    pub system_roots: Vec<PathBuf>,
    /// Install root of the discovered toolchain.
    pub toolchain_root: Option<PathBuf>,
    /// Whether the vendor-SDK nested lib layout applies.
    pub nested_lib_layout: bool,
}

impl SearchContext {
    /// Capture the ambient search inputs for a discovered toolchain.
    pub fn from_env(toolchain: &Toolchain) -> Self {
        SearchContext {
            override_root: std::env::var_os("CURL_ROOT").map(PathBuf::from),
            home: directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()),
            system_roots: default_system_roots(),
            toolchain_root: toolchain.install_root(),
            nested_lib_layout: toolchain.kind == ToolchainKind::Msvc,
        }
    }
}

fn default_system_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from("C:\\vcpkg"),
            PathBuf::from("C:\\curl"),
            PathBuf::from("C:\\Program Files\\curl"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/local"),
            PathBuf::from("/usr"),
            PathBuf::from("/opt/homebrew/opt/curl"),
        ]
    }
}

/// Resolve libcurl for `arch`, or fail with `DependencyNotFound`.
pub fn resolve_curl(ctx: &SearchContext, arch: Arch) -> crate::error::Result<CurlLocation> {
    for root in candidate_roots(ctx, arch) {
        if let Some(location) = probe(&root, arch, ctx.nested_lib_layout) {
            tracing::debug!(
                "libcurl for {}: include={} lib={}",
                arch,
                location.include_dir.display(),
                location.lib_dir.display()
            );
            return Ok(location);
        }
        tracing::debug!("no usable libcurl at {}", root.display());
    }
    Err(Error::DependencyNotFound { arch })
}

/// The ranked candidate roots for one architecture.
fn candidate_roots(ctx: &SearchContext, arch: Arch) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(ref override_root) = ctx.override_root {
        roots.push(override_root.clone());
    }

    let triplet = arch.triplet();
    if let Some(ref home) = ctx.home {
        roots.push(home.join("vcpkg").join("installed").join(&triplet));
    }

    for root in &ctx.system_roots {
        // a vcpkg checkout is probed at its per-triplet tree
        if root.file_name().is_some_and(|n| n == "vcpkg") {
            roots.push(root.join("installed").join(&triplet));
        } else {
            roots.push(root.clone());
        }
    }

    if let Some(ref toolchain_root) = ctx.toolchain_root {
        roots.push(toolchain_root.clone());
    }

    roots
}

/// Check one candidate root for a usable include/lib layout.
fn probe(root: &Path, arch: Arch, nested_lib_layout: bool) -> Option<CurlLocation> {
    let include_dir = root.join("include");
    if !include_dir.is_dir() {
        return None;
    }

    let lib_root = root.join("lib");
    if !lib_root.is_dir() {
        return None;
    }

    if nested_lib_layout {
        let nested = lib_root.join(arch.as_str());
        if has_curl_binary(&nested) {
            return Some(CurlLocation {
                include_dir,
                lib_dir: nested,
                arch,
            });
        }
    }

    if has_curl_binary(&lib_root) {
        return Some(CurlLocation {
            include_dir,
            lib_dir: lib_root,
            arch,
        });
    }

    None
}

/// Whether a directory holds at least one curl binary artifact.
fn has_curl_binary(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .any(|name| is_curl_artifact(&name))
}

/// Recognize curl binaries across platform naming conventions.
fn is_curl_artifact(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    let curl_named =
        name.starts_with("libcurl") || name == "curl.lib" || name.starts_with("libcurl_imp");
    let binary = name.ends_with(".a")
        || name.ends_with(".lib")
        || name.ends_with(".so")
        || name.contains(".so.")
        || name.ends_with(".dylib")
        || name.ends_with(".dll.a");
    curl_named && binary
}
