//! Staging the package tree.
//!
//! The manifest is probed first: required inputs fail fast, optional ones
//! are recorded only if they exist on disk. Staging then copies exactly
//! what the manifest lists into a freshly rebuilt directory, so archiving
//! never sees a partial tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::core::product::ProductManifest;
use crate::error::Error;
use crate::util::fs::{copy_dir_all, ensure_dir, remove_dir_all_if_exists};
use crate::util::shell::{Shell, Status};

/// The set of files destined for one architecture's package.
#[derive(Debug)]
pub struct PackageManifest {
    /// Built executable to ship.
    pub executable: PathBuf,
    /// Canonical name the executable gets inside the package.
    pub exe_name: String,
    /// Installer re-launch scripts; required.
    pub scripts: Vec<PathBuf>,
    /// Documentation files that were present at probe time.
    pub docs: Vec<PathBuf>,
    /// Examples directory, when present.
    pub examples: Option<PathBuf>,
    /// Editor extension bundle, when present.
    pub extension: Option<PathBuf>,
}

/// Probe the product tree and build the package manifest.
///
/// Required inputs (the executable and every re-launch script) fail with
/// `PackageSourceMissing`; optional inputs are silently skipped when
/// absent.
pub fn collect_manifest(
    root: &Path,
    product: &ProductManifest,
    executable: &Path,
) -> crate::error::Result<PackageManifest> {
    if !executable.is_file() {
        return Err(Error::PackageSourceMissing {
            path: executable.to_path_buf(),
        });
    }

    let mut scripts = Vec::new();
    for script in &product.package.scripts {
        let path = root.join(script);
        if !path.is_file() {
            return Err(Error::PackageSourceMissing { path });
        }
        scripts.push(path);
    }

    let docs = product
        .package
        .docs
        .iter()
        .map(|doc| root.join(doc))
        .filter(|path| path.is_file())
        .collect();

    let examples = Some(root.join(&product.package.examples)).filter(|p| p.is_dir());
    let extension = Some(root.join(&product.package.extension)).filter(|p| p.is_dir());

    Ok(PackageManifest {
        executable: executable.to_path_buf(),
        exe_name: product.exe_name(),
        scripts,
        docs,
        examples,
        extension,
    })
}

/// Rebuild the staging directory from the manifest.
pub fn stage(
    shell: &Arc<Shell>,
    manifest: &PackageManifest,
    staging_dir: &Path,
) -> crate::error::Result<()> {
    shell.status(Status::Staging, staging_dir.display());

    remove_dir_all_if_exists(staging_dir)?;
    ensure_dir(staging_dir)?;

    let exe_dst = staging_dir.join(&manifest.exe_name);
    fs::copy(&manifest.executable, &exe_dst).with_context(|| {
        format!(
            "failed to copy {} to {}",
            manifest.executable.display(),
            exe_dst.display()
        )
    })?;

    for file in manifest.scripts.iter().chain(&manifest.docs) {
        let name = file
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("input has no file name: {}", file.display()))?;
        fs::copy(file, staging_dir.join(name))
            .with_context(|| format!("failed to copy {}", file.display()))?;
    }

    if let Some(ref examples) = manifest.examples {
        copy_dir_all(examples, &staging_dir.join("examples"))?;
    }
    if let Some(ref extension) = manifest.extension {
        copy_dir_all(extension, &staging_dir.join("extension"))?;
    }

    Ok(())
}
