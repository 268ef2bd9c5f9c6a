//! The distribution pipeline.
//!
//! One architecture at a time, in request order: resolve libcurl, build,
//! stage, archive, and optionally assemble the installer. Build-class
//! failures stop the whole run; resolution and packaging failures sink
//! only their architecture, and the run exits non-zero at the end either
//! way. Nothing already written is rolled back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::build_executable;
use crate::builder::plan::{effective_defines, plan_target};
use crate::builder::toolchain::{locate_toolchain, Toolchain};
use crate::core::arch::{Arch, ArchSelect};
use crate::core::product::ProductManifest;
use crate::error::Error;
use crate::package::sfx;
use crate::package::{
    collect_manifest, create_tar_gz, stage, write_checksum, InstallDirective, SfxOutcome,
};
use crate::resolver::{resolve_curl, SearchContext};
use crate::util::shell::{Shell, Status};

/// Options for one `slipway dist` run.
#[derive(Debug)]
pub struct DistOptions {
    /// Product root (where `Slipway.toml` and the sources live).
    pub root: PathBuf,
    pub archs: ArchSelect,
    /// Package a previously built executable instead of compiling.
    pub skip_build: bool,
    /// Also assemble a self-extracting installer.
    pub sfx: bool,
    pub manifest_path: Option<PathBuf>,
}

/// How the executable for each architecture is produced.
enum BuildMode<'a> {
    /// Reuse whatever a previous run left at the output path.
    Reuse,
    /// Resolve libcurl and compile.
    Compile {
        toolchain: &'a Toolchain,
        search: &'a SearchContext,
    },
}

/// Per-architecture outcome for the summary.
struct ArchReport {
    arch: Arch,
    artifacts: Vec<PathBuf>,
    error: Option<Error>,
}

/// Run the full pipeline over every requested architecture.
pub fn dist(shell: &Arc<Shell>, opts: &DistOptions) -> Result<()> {
    let product = ProductManifest::load_or_default(&opts.root, opts.manifest_path.as_deref())?;
    let archs = opts.archs.resolve()?;

    // the toolchain is located once, before any per-architecture work;
    // --skip-build needs no toolchain at all
    let located: Option<(Toolchain, SearchContext)> = if opts.skip_build {
        None
    } else {
        let toolchain = locate_toolchain()?;
        let search = SearchContext::from_env(&toolchain);
        Some((toolchain, search))
    };
    let mode = match &located {
        None => BuildMode::Reuse,
        Some((toolchain, search)) => BuildMode::Compile { toolchain, search },
    };

    let work_dir = opts.root.join(&product.build.target_dir);
    let release_dir = opts.root.join(&product.package.release_dir);

    let mut reports: Vec<ArchReport> = Vec::new();
    let mut aborted = false;
    for &arch in &archs {
        let report = run_arch(shell, opts, &product, &mode, arch, &work_dir, &release_dir);
        let fatal = report.error.as_ref().is_some_and(Error::aborts_run);
        if let Some(err) = &report.error {
            shell.error(format!("{}: {}", arch, err));
        }
        reports.push(report);
        if fatal {
            aborted = true;
            break;
        }
    }

    for report in &reports {
        if report.error.is_none() {
            for artifact in &report.artifacts {
                shell.status(
                    Status::Finished,
                    format!("{}: {}", report.arch, artifact.display()),
                );
            }
        }
    }

    if aborted {
        let arch = reports.last().map(|r| r.arch);
        anyhow::bail!(
            "build failed{}; remaining architectures were not attempted",
            arch.map(|a| format!(" for {}", a)).unwrap_or_default()
        );
    }

    let failed: Vec<String> = reports
        .iter()
        .filter(|r| r.error.is_some())
        .map(|r| r.arch.to_string())
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("distribution failed for {}", failed.join(", "));
    }

    Ok(())
}

fn run_arch(
    shell: &Arc<Shell>,
    opts: &DistOptions,
    product: &ProductManifest,
    mode: &BuildMode<'_>,
    arch: Arch,
    work_dir: &Path,
    release_dir: &Path,
) -> ArchReport {
    match run_arch_inner(shell, opts, product, mode, arch, work_dir, release_dir) {
        Ok(artifacts) => ArchReport {
            arch,
            artifacts,
            error: None,
        },
        Err(error) => ArchReport {
            arch,
            artifacts: Vec::new(),
            error: Some(error),
        },
    }
}

fn run_arch_inner(
    shell: &Arc<Shell>,
    opts: &DistOptions,
    product: &ProductManifest,
    mode: &BuildMode<'_>,
    arch: Arch,
    work_dir: &Path,
    release_dir: &Path,
) -> crate::error::Result<Vec<PathBuf>> {
    let executable = match mode {
        BuildMode::Reuse => {
            let path = product.executable_path(&opts.root, arch);
            shell.status(Status::Skipped, format!("build ({} reused)", path.display()));
            path
        }
        BuildMode::Compile { toolchain, search } => {
            shell.status(Status::Resolving, format!("libcurl ({})", arch));
            let curl = resolve_curl(search, arch)?;
            let target = plan_target(&opts.root, product, arch)?;
            let defines = effective_defines(product);
            build_executable(shell, toolchain, &curl, &target, work_dir, &defines)?
        }
    };

    let manifest = collect_manifest(&opts.root, product, &executable)?;
    let slug = product.slug(arch);
    let staging_dir = work_dir.join("stage").join(&slug);
    stage(shell, &manifest, &staging_dir)?;

    shell.status(Status::Packaging, format!("{}.tar.gz", slug));
    let archive = create_tar_gz(&staging_dir, &release_dir.join(format!("{}.tar.gz", slug)))?;
    let checksum = write_checksum(&archive)?;
    let mut artifacts = vec![archive, checksum];

    if opts.sfx {
        let directive = InstallDirective::for_product(product, arch);
        let installer = release_dir.join(format!("{}-setup.exe", slug));
        match sfx::assemble(shell, &staging_dir, &installer, &directive, work_dir)? {
            SfxOutcome::Built(path) => artifacts.push(path),
            SfxOutcome::ArchiverUnavailable => {
                shell.warn("7-Zip not found; skipping self-extracting installer");
            }
            SfxOutcome::StubMissing => {
                shell.warn("7-Zip SFX module not found; skipping self-extracting installer");
            }
        }
    }

    Ok(artifacts)
}
