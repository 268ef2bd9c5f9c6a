//! Product manifest (`Slipway.toml`).
//!
//! Describes the product being distributed: what to compile, what to stage
//! next to the executable, and how release artifacts are named. Every
//! section has defaults describing the levython source tree, so the file
//! can be minimal or absent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::arch::Arch;

/// Manifest file name looked up in the product root.
pub const MANIFEST_NAME: &str = "Slipway.toml";

/// The whole `Slipway.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductManifest {
    pub product: ProductSection,
    pub build: BuildSection,
    pub package: PackageSection,
    pub installer: InstallerSection,
}

/// `[product]` — identity embedded in artifact names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSection {
    pub name: String,
    pub version: String,
}

impl Default for ProductSection {
    fn default() -> Self {
        ProductSection {
            name: "levython".to_string(),
            version: "0.4.1".to_string(),
        }
    }
}

/// `[build]` — compile inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Glob patterns for the translation units, compiled in sorted order.
    pub sources: Vec<String>,
    /// Extra preprocessor defines (`NAME` or `NAME=VALUE`).
    pub defines: Vec<String>,
    /// Scratch directory for objects, built executables, and staging.
    pub target_dir: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        BuildSection {
            sources: vec!["src/*.cpp".to_string()],
            defines: Vec::new(),
            target_dir: PathBuf::from("build"),
        }
    }
}

/// `[package]` — what lands next to the executable in the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSection {
    /// Installer re-launch scripts. Required: packaging fails when absent.
    pub scripts: Vec<PathBuf>,
    /// Documentation files, each included only if present.
    pub docs: Vec<PathBuf>,
    /// Examples directory, included only if present.
    pub examples: PathBuf,
    /// Editor extension bundle, included only if present.
    pub extension: PathBuf,
    /// Where finished archives and installers are written.
    pub release_dir: PathBuf,
}

impl Default for PackageSection {
    fn default() -> Self {
        PackageSection {
            scripts: vec![PathBuf::from("dist/install.bat"), PathBuf::from("dist/install.sh")],
            docs: vec![
                PathBuf::from("README.md"),
                PathBuf::from("LICENSE"),
                PathBuf::from("CHANGELOG.md"),
            ],
            examples: PathBuf::from("examples"),
            extension: PathBuf::from("editor/extension"),
            release_dir: PathBuf::from("release"),
        }
    }
}

/// `[installer]` — self-extracting installer directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSection {
    /// Relative path the launcher runs after extraction.
    pub run_program: String,
    /// Window title; defaults to "<name> <version> (<arch>)".
    pub title: Option<String>,
    /// Confirmation prompt; defaults to "Install <name> <version>?".
    pub prompt: Option<String>,
}

impl Default for InstallerSection {
    fn default() -> Self {
        InstallerSection {
            run_program: "install.bat".to_string(),
            title: None,
            prompt: None,
        }
    }
}

impl ProductManifest {
    /// Load a manifest file. Parse errors are hard failures.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Load `Slipway.toml` from the product root, or fall back to the
    /// built-in levython defaults when no file exists.
    pub fn load_or_default(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = root.join(MANIFEST_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("no {} in {}, using defaults", MANIFEST_NAME, root.display());
            Ok(Self::default())
        }
    }

    /// Canonical executable name inside the package.
    pub fn exe_name(&self) -> String {
        format!("{}{}", self.product.name, std::env::consts::EXE_SUFFIX)
    }

    /// Artifact base name: `<name>-<version>-<platform>-<arch>`.
    pub fn slug(&self, arch: Arch) -> String {
        format!(
            "{}-{}-{}-{}",
            self.product.name,
            self.product.version,
            std::env::consts::OS,
            arch
        )
    }

    /// Where the built executable for `arch` lives under the product root.
    pub fn executable_path(&self, root: &Path, arch: Arch) -> PathBuf {
        root.join(&self.build.target_dir)
            .join(arch.as_str())
            .join(self.exe_name())
    }
}
