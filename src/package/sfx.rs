//! Self-extracting installer assembly.
//!
//! The installer is three byte regions written back to back: the 7-Zip
//! SFX launcher stub, a textual install directive block, and a solid
//! `.7z` archive of the staging tree. The launcher locates the directive
//! and archive by scanning past its own image, so no framing or padding
//! may appear between the regions — the output length must equal the sum
//! of the three inputs exactly.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::core::arch::Arch;
use crate::core::product::ProductManifest;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// How the SFX stage ended. The two skip outcomes are expected states,
/// not errors: the plain archive already produced stands on its own.
#[derive(Debug)]
pub enum SfxOutcome {
    Built(PathBuf),
    /// No 7-Zip binary on this host.
    ArchiverUnavailable,
    /// 7-Zip present but no SFX launcher module shipped with it.
    StubMissing,
}

/// The textual directive block between stub and archive.
#[derive(Debug, Clone)]
pub struct InstallDirective {
    pub title: String,
    pub prompt: String,
    /// Relative path the launcher runs after extraction.
    pub run_program: String,
}

impl InstallDirective {
    pub fn for_product(product: &ProductManifest, arch: Arch) -> Self {
        let title = product.installer.title.clone().unwrap_or_else(|| {
            format!(
                "{} {} ({})",
                product.product.name, product.product.version, arch
            )
        });
        let prompt = product.installer.prompt.clone().unwrap_or_else(|| {
            format!(
                "Install {} {}?",
                product.product.name, product.product.version
            )
        });
        InstallDirective {
            title,
            prompt,
            run_program: product.installer.run_program.clone(),
        }
    }

    /// Render the block the launcher parses after its own image.
    pub fn render(&self) -> String {
        format!(
            ";!@Install@!UTF-8!\n\
             Title=\"{}\"\n\
             BeginPrompt=\"{}\"\n\
             RunProgram=\"{}\"\n\
             ;!@InstallEnd@!\n",
            self.title, self.prompt, self.run_program
        )
    }
}

/// Assemble the self-extracting installer for one staged tree.
pub fn assemble(
    shell: &Arc<Shell>,
    staging_dir: &Path,
    dest: &Path,
    directive: &InstallDirective,
    work_dir: &Path,
) -> crate::error::Result<SfxOutcome> {
    let Some(seven_zip) = find_seven_zip() else {
        return Ok(SfxOutcome::ArchiverUnavailable);
    };
    let Some(stub) = find_sfx_stub(&seven_zip) else {
        return Ok(SfxOutcome::StubMissing);
    };

    shell.status(Status::Assembling, dest.display());

    let sfx_dir = work_dir.join("sfx");
    ensure_dir(&sfx_dir)?;
    let archive = sfx_dir.join("payload.7z");
    if archive.exists() {
        fs::remove_file(&archive)
            .with_context(|| format!("failed to remove stale {}", archive.display()))?;
    }

    // solid archive at maximum ratio; 7z expands the wildcard itself
    let run = ProcessBuilder::new(&seven_zip)
        .cwd(staging_dir)
        .args(["a", "-t7z", "-mx=9", "-ms=on"])
        .arg(&archive)
        .arg("*")
        .run()?;
    if !run.success() {
        return Err(anyhow::anyhow!(
            "7z failed to create {}\n{}",
            archive.display(),
            run.tool_output()
        )
        .into());
    }

    let total = concat_blob(&stub, directive.render().as_bytes(), &archive, dest)?;
    tracing::debug!("installer {} ({} bytes)", dest.display(), total);

    Ok(SfxOutcome::Built(dest.to_path_buf()))
}

/// Write `stub ‖ directive ‖ archive` to `dest`, unmodified, returning
/// the byte count (always the exact sum of the three inputs).
pub fn concat_blob(
    stub: &Path,
    directive: &[u8],
    archive: &Path,
    dest: &Path,
) -> crate::error::Result<u64> {
    let stub_bytes =
        fs::read(stub).with_context(|| format!("failed to read stub: {}", stub.display()))?;
    let archive_bytes = fs::read(archive)
        .with_context(|| format!("failed to read archive: {}", archive.display()))?;

    let mut blob = Vec::with_capacity(stub_bytes.len() + directive.len() + archive_bytes.len());
    blob.extend_from_slice(&stub_bytes);
    blob.extend_from_slice(directive);
    blob.extend_from_slice(&archive_bytes);

    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    fs::write(dest, &blob).with_context(|| format!("failed to write {}", dest.display()))?;

    Ok(blob.len() as u64)
}

/// Locate a 7-Zip binary on PATH.
fn find_seven_zip() -> Option<PathBuf> {
    ["7z", "7za", "7zz"]
        .iter()
        .find_map(|name| find_executable(name))
}

/// Locate the SFX launcher module shipped with the archiver.
fn find_sfx_stub(seven_zip: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(dir) = seven_zip.parent() {
        dirs.push(dir.to_path_buf());
    }
    if cfg!(windows) {
        dirs.push(PathBuf::from("C:\\Program Files\\7-Zip"));
    } else {
        dirs.push(PathBuf::from("/usr/lib/p7zip"));
        dirs.push(PathBuf::from("/usr/local/lib/p7zip"));
        dirs.push(PathBuf::from("/usr/libexec/p7zip"));
    }

    // the installer-flavored stub first, then the generic one
    for dir in &dirs {
        for name in ["7zSD.sfx", "7zS2.sfx", "7z.sfx"] {
            let path = dir.join(name);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}
