//! Target architecture types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CPU architecture a produced executable targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit x86 (i686)
    X86,
    /// 64-bit x86 (amd64)
    X64,
    /// 64-bit ARM (aarch64)
    Arm64,
}

impl Arch {
    /// Every architecture slipway knows how to target, in build order.
    pub const ALL: [Arch; 3] = [Arch::X86, Arch::X64, Arch::Arm64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// vcpkg-style triplet for this architecture on the host OS.
    pub fn triplet(&self) -> String {
        let os = match std::env::consts::OS {
            "windows" => "windows",
            "macos" => "osx",
            _ => "linux",
        };
        format!("{}-{}", self.as_str(), os)
    }

    /// The architecture slipway itself is running on, when supported.
    pub fn host() -> Option<Arch> {
        match std::env::consts::ARCH {
            "x86_64" => Some(Arch::X64),
            "x86" => Some(Arch::X86),
            "aarch64" => Some(Arch::Arm64),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i686" | "i386" => Ok(Arch::X86),
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            _ => Err(format!(
                "unknown architecture '{}'; expected x86, x64, or arm64",
                s
            )),
        }
    }
}

/// Architecture selection from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchSelect {
    /// One named architecture.
    One(Arch),
    /// Whatever the host is running on.
    Auto,
    /// Every supported architecture, in build order.
    All,
}

impl ArchSelect {
    /// Expand the selection into the concrete list of build targets.
    pub fn resolve(&self) -> anyhow::Result<Vec<Arch>> {
        match self {
            ArchSelect::One(arch) => Ok(vec![*arch]),
            ArchSelect::All => Ok(Arch::ALL.to_vec()),
            ArchSelect::Auto => Arch::host().map(|a| vec![a]).ok_or_else(|| {
                anyhow::anyhow!(
                    "cannot auto-detect a supported architecture on this host ({})",
                    std::env::consts::ARCH
                )
            }),
        }
    }
}

impl FromStr for ArchSelect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ArchSelect::Auto),
            "all" => Ok(ArchSelect::All),
            other => other.parse::<Arch>().map(ArchSelect::One),
        }
    }
}
