//! Toolchain discovery and per-family command construction.
//!
//! A [`Toolchain`] is discovered once per run and never mutated. Command
//! construction is split per compiler family (`gcc.rs`, `msvc.rs`); the
//! descriptor dispatches on its kind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::arch::Arch;
use crate::error::Error;
use crate::util::process::ProcessBuilder;

mod detect;
mod gcc;
mod msvc;

pub use detect::locate_toolchain;

/// Compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainKind {
    /// GNU-style driver (g++, MinGW)
    Gcc,
    /// Microsoft Visual C++ (cl.exe)
    Msvc,
    /// Clang/LLVM driver
    Clang,
}

impl ToolchainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::Gcc => "gcc",
            ToolchainKind::Msvc => "msvc",
            ToolchainKind::Clang => "clang",
        }
    }
}

/// A discovered compiler installation.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub kind: ToolchainKind,
    /// Default compiler driver.
    pub cxx: PathBuf,
    /// Architecture-specific drivers that replace `cxx` outright: MSVC
    /// ships one `cl.exe` per target, and a dedicated 32-bit g++ is used
    /// verbatim with no width flag.
    pub arch_overrides: BTreeMap<Arch, PathBuf>,
    /// Whether `cxx` can retarget between x86 and x64 via `-m32`/`-m64`.
    pub dual_target: bool,
    /// Whether whole-program link-time optimization is available.
    pub lto: bool,
}

/// The concrete driver for one architecture: which binary to run and the
/// width flag it needs (`None` when the binary itself fixes the target).
#[derive(Debug, Clone)]
pub struct ArchDriver {
    pub cxx: PathBuf,
    pub width_flag: Option<&'static str>,
}

impl Toolchain {
    /// Resolve the driver used for `arch`.
    pub fn driver_for(&self, arch: Arch) -> crate::error::Result<ArchDriver> {
        if let Some(path) = self.arch_overrides.get(&arch) {
            return Ok(ArchDriver {
                cxx: path.clone(),
                width_flag: None,
            });
        }

        match self.kind {
            ToolchainKind::Msvc => Err(Error::Other(anyhow::anyhow!(
                "this MSVC installation has no {} compiler",
                arch
            ))),
            ToolchainKind::Gcc | ToolchainKind::Clang => {
                if Arch::host() == Some(arch) {
                    return Ok(ArchDriver {
                        cxx: self.cxx.clone(),
                        width_flag: None,
                    });
                }
                if self.dual_target {
                    let flag = match arch {
                        Arch::X64 => Some("-m64"),
                        Arch::X86 => Some("-m32"),
                        Arch::Arm64 => None,
                    };
                    if let Some(flag) = flag {
                        return Ok(ArchDriver {
                            cxx: self.cxx.clone(),
                            width_flag: Some(flag),
                        });
                    }
                }
                Err(Error::Other(anyhow::anyhow!(
                    "`{}` cannot target {}; install a dedicated {} toolchain",
                    self.cxx.display(),
                    arch,
                    arch
                )))
            }
        }
    }

    /// Install root of the toolchain (`<root>/bin/g++` -> `<root>`),
    /// used as the last-resort libcurl search candidate.
    pub fn install_root(&self) -> Option<PathBuf> {
        self.cxx
            .parent()
            .and_then(|bin| bin.parent())
            .map(Path::to_path_buf)
    }

    /// Object file extension this family produces.
    pub fn object_extension(&self) -> &'static str {
        match self.kind {
            ToolchainKind::Msvc => "obj",
            _ => "o",
        }
    }

    /// Build the compile command for one translation unit.
    pub fn compile_command(&self, driver: &ArchDriver, input: &CompileInput) -> CommandSpec {
        match self.kind {
            ToolchainKind::Msvc => msvc::compile_command(driver, input),
            _ => gcc::compile_command(driver, input),
        }
    }

    /// Build the single link command over all objects.
    pub fn link_command(&self, driver: &ArchDriver, input: &LinkInput) -> CommandSpec {
        match self.kind {
            ToolchainKind::Msvc => msvc::link_command(driver, input, self.lto),
            _ => gcc::link_command(driver, input, self.lto),
        }
    }

    /// Human-readable summary for `slipway toolchain`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("kind:        {}\n", self.kind.as_str()));
        out.push_str(&format!("driver:      {}\n", self.cxx.display()));
        out.push_str(&format!(
            "dual-target: {}\n",
            if self.dual_target {
                "yes (-m32/-m64)"
            } else {
                "no"
            }
        ));
        out.push_str(&format!("lto:         {}\n", if self.lto { "yes" } else { "no" }));
        for (arch, path) in &self.arch_overrides {
            out.push_str(&format!("{:<11}  {}\n", format!("{}:", arch), path.display()));
        }
        out
    }
}

/// Input for one compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    pub source: PathBuf,
    pub object: PathBuf,
    /// libcurl header root.
    pub include_dir: PathBuf,
    /// Preprocessor defines (`NAME` or `NAME=VALUE`).
    pub defines: Vec<String>,
}

/// Input for the link step.
#[derive(Debug, Clone)]
pub struct LinkInput {
    pub objects: Vec<PathBuf>,
    pub output: PathBuf,
    /// libcurl binary directory.
    pub lib_dir: PathBuf,
}

/// A command to execute: program, arguments, environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Lower into a ready-to-run process.
    pub fn to_process(&self) -> ProcessBuilder {
        let mut pb = ProcessBuilder::new(&self.program).args(self.args.iter());
        for (key, value) in &self.env {
            pb = pb.env(key, value);
        }
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc_toolchain(dual: bool) -> Toolchain {
        Toolchain {
            kind: ToolchainKind::Gcc,
            cxx: PathBuf::from("/usr/bin/g++"),
            arch_overrides: BTreeMap::new(),
            dual_target: dual,
            lto: true,
        }
    }

    #[test]
    fn test_override_used_verbatim_without_width_flag() {
        let mut tc = gcc_toolchain(true);
        tc.arch_overrides
            .insert(Arch::X86, PathBuf::from("/usr/bin/i686-w64-mingw32-g++"));

        let driver = tc.driver_for(Arch::X86).unwrap();
        assert_eq!(driver.cxx, PathBuf::from("/usr/bin/i686-w64-mingw32-g++"));
        assert_eq!(driver.width_flag, None);
    }

    #[test]
    fn test_dual_target_maps_width_flags() {
        let tc = gcc_toolchain(true);

        let x86 = tc.driver_for(Arch::X86).unwrap();
        let x64 = tc.driver_for(Arch::X64).unwrap();
        if Arch::host() != Some(Arch::X86) {
            assert_eq!(x86.width_flag, Some("-m32"));
        }
        if Arch::host() != Some(Arch::X64) {
            assert_eq!(x64.width_flag, Some("-m64"));
        } else {
            // the host arch needs no retargeting flag
            assert_eq!(x64.width_flag, None);
        }
    }

    #[test]
    fn test_unreachable_arch_is_an_error() {
        let tc = gcc_toolchain(false);
        for arch in Arch::ALL {
            if Arch::host() == Some(arch) {
                continue;
            }
            assert!(tc.driver_for(arch).is_err());
        }
    }

    #[test]
    fn test_msvc_without_arch_compiler_is_an_error() {
        let tc = Toolchain {
            kind: ToolchainKind::Msvc,
            cxx: PathBuf::from("cl.exe"),
            arch_overrides: BTreeMap::new(),
            dual_target: false,
            lto: true,
        };
        assert!(tc.driver_for(Arch::Arm64).is_err());
    }

    #[test]
    fn test_install_root_strips_bin() {
        let tc = Toolchain {
            kind: ToolchainKind::Gcc,
            cxx: PathBuf::from("/opt/mingw64/bin/g++"),
            arch_overrides: BTreeMap::new(),
            dual_target: false,
            lto: true,
        };
        assert_eq!(tc.install_root(), Some(PathBuf::from("/opt/mingw64")));
    }

    #[test]
    fn test_object_extension_per_family() {
        assert_eq!(gcc_toolchain(true).object_extension(), "o");
        let msvc = Toolchain {
            kind: ToolchainKind::Msvc,
            cxx: PathBuf::from("cl.exe"),
            arch_overrides: BTreeMap::new(),
            dual_target: false,
            lto: true,
        };
        assert_eq!(msvc.object_extension(), "obj");
    }
}
