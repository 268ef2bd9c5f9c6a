//! Toolchain discovery.
//!
//! Fixed preference order: `CXX` environment override, a GCC-family
//! driver on PATH, MSVC located through vswhere, then clang. Probing is
//! read-only: PATH lookups, directory listings, and `--version` checks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::arch::Arch;
use crate::error::Error;
use crate::util::process::{find_executable, ProcessBuilder};

use super::{Toolchain, ToolchainKind};

/// Locate the first available compiler in preference order.
pub fn locate_toolchain() -> crate::error::Result<Toolchain> {
    if let Some(tc) = try_env_override() {
        return Ok(tc);
    }
    if let Some(tc) = try_gcc() {
        return Ok(tc);
    }
    if let Some(tc) = try_msvc() {
        return Ok(tc);
    }
    if let Some(tc) = try_clang() {
        return Ok(tc);
    }
    Err(Error::ToolchainNotFound)
}

/// Honor an explicit `CXX`, resolving bare names through PATH.
fn try_env_override() -> Option<Toolchain> {
    let cxx = std::env::var("CXX").ok()?;
    let path = if Path::new(&cxx).is_absolute() {
        let p = PathBuf::from(&cxx);
        p.exists().then_some(p)?
    } else {
        find_executable(&cxx)?
    };

    let kind = classify(&path);
    tracing::info!("using CXX override: {} ({})", path.display(), kind.as_str());
    match kind {
        ToolchainKind::Msvc => Some(Toolchain {
            kind,
            cxx: path,
            arch_overrides: BTreeMap::new(),
            dual_target: false,
            lto: true,
        }),
        _ => Some(assemble(kind, path)),
    }
}

fn try_gcc() -> Option<Toolchain> {
    let cxx = find_executable("g++")?;
    // "g++" may be a clang shim (macOS); trust the classification
    Some(assemble(classify(&cxx), cxx))
}

fn try_clang() -> Option<Toolchain> {
    let cxx = find_executable("clang++").or_else(|| find_executable("c++"))?;
    Some(assemble(classify(&cxx), cxx))
}

/// Build the descriptor for a GCC- or Clang-family driver.
fn assemble(kind: ToolchainKind, cxx: PathBuf) -> Toolchain {
    let mut arch_overrides = BTreeMap::new();
    for name in ["i686-w64-mingw32-g++", "i686-linux-gnu-g++"] {
        if let Some(path) = find_executable(name) {
            tracing::debug!("dedicated 32-bit driver: {}", path.display());
            arch_overrides.insert(Arch::X86, path);
            break;
        }
    }

    // MinGW builds are not multilib; elsewhere an x86-family host can
    // retarget with -m32/-m64
    let dual_target = !cfg!(windows) && matches!(Arch::host(), Some(Arch::X86 | Arch::X64));

    Toolchain {
        kind,
        cxx,
        arch_overrides,
        dual_target,
        lto: true,
    }
}

/// Classify a compiler binary by name, falling back to `--version`.
fn classify(cxx: &Path) -> ToolchainKind {
    let name = cxx
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name == "cl" || name == "cl.exe" {
        return ToolchainKind::Msvc;
    }
    if name.contains("clang") {
        return ToolchainKind::Clang;
    }
    if name.contains("g++") || name.contains("gcc") {
        return ToolchainKind::Gcc;
    }

    if let Ok(run) = ProcessBuilder::new(cxx).arg("--version").run() {
        if run.stdout_string().to_lowercase().contains("clang") {
            return ToolchainKind::Clang;
        }
    }
    ToolchainKind::Gcc
}

/// MSVC via vswhere: resolve the newest toolset and its per-architecture
/// cl.exe binaries under `VC\Tools\MSVC\<ver>\bin\Host<arch>\<arch>`.
#[cfg(windows)]
fn try_msvc() -> Option<Toolchain> {
    let vswhere = find_vswhere()?;
    tracing::debug!("found vswhere at {}", vswhere.display());

    let run = ProcessBuilder::new(&vswhere)
        .args([
            "-latest",
            "-products",
            "*",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-property",
            "installationPath",
            "-format",
            "value",
        ])
        .run()
        .ok()?;
    if !run.success() {
        tracing::debug!("vswhere failed: {}", run.tool_output());
        return None;
    }

    let vs_root = PathBuf::from(run.stdout_string().trim());
    if vs_root.as_os_str().is_empty() || !vs_root.exists() {
        return None;
    }
    tracing::debug!("Visual Studio at {}", vs_root.display());

    let arch_overrides = find_cl_binaries(&vs_root)?;
    let cxx = arch_overrides
        .get(&Arch::X64)
        .or_else(|| arch_overrides.values().next())?
        .clone();

    if std::env::var_os("INCLUDE").is_none() {
        tracing::warn!(
            "cl.exe found but INCLUDE is not set; run from a developer \
             prompt if standard headers cannot be found"
        );
    }

    Some(Toolchain {
        kind: ToolchainKind::Msvc,
        cxx,
        arch_overrides,
        dual_target: false,
        lto: true,
    })
}

#[cfg(not(windows))]
fn try_msvc() -> Option<Toolchain> {
    None
}

#[cfg(windows)]
fn find_cl_binaries(vs_root: &Path) -> Option<BTreeMap<Arch, PathBuf>> {
    let tools = vs_root.join("VC").join("Tools").join("MSVC");
    let mut versions: Vec<PathBuf> = std::fs::read_dir(&tools)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    // toolset directory names sort as versions; newest wins
    versions.sort();
    let toolset = versions.pop()?;

    let host = match Arch::host() {
        Some(Arch::Arm64) => "Hostarm64",
        Some(Arch::X86) => "Hostx86",
        _ => "Hostx64",
    };
    let bin = toolset.join("bin").join(host);

    let mut map = BTreeMap::new();
    for arch in Arch::ALL {
        let cl = bin.join(arch.as_str()).join("cl.exe");
        if cl.exists() {
            map.insert(arch, cl);
        }
    }
    (!map.is_empty()).then_some(map)
}

/// Find vswhere.exe in its standard install location, then PATH.
#[cfg(windows)]
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard = PathBuf::from(program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");
    if standard.exists() {
        return Some(standard);
    }

    find_executable("vswhere")
}
