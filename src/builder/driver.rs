//! Sequential compile-and-link driver.
//!
//! Units compile one at a time, in plan order, each reported with its
//! elapsed time; the first failure aborts the target and later units are
//! never invoked. The link then runs once over every object with static
//! and LTO flags. The executable must exist and be non-empty afterwards;
//! a clean exit code alone is not trusted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::plan::{object_path, BuildTarget};
use crate::builder::toolchain::{CompileInput, LinkInput, Toolchain};
use crate::error::Error;
use crate::resolver::CurlLocation;
use crate::util::fs::ensure_dir;
use crate::util::shell::{format_duration, Shell, Status};

/// Compile and link one build target, returning the executable path.
pub fn build_executable(
    shell: &Arc<Shell>,
    toolchain: &Toolchain,
    curl: &CurlLocation,
    target: &BuildTarget,
    work_dir: &Path,
    defines: &[String],
) -> crate::error::Result<PathBuf> {
    let driver = toolchain.driver_for(target.arch)?;
    let object_dir = work_dir.join("obj").join(target.arch.as_str());
    ensure_dir(&object_dir)?;

    let total = target.sources.len();
    let mut progress = shell.progress(total as u64, format!("compiling ({})", target.arch));
    let mut objects = Vec::with_capacity(total);

    for (index, unit) in target.sources.iter().enumerate() {
        let object = object_path(&object_dir, unit, toolchain.object_extension());
        let input = CompileInput {
            source: unit.clone(),
            object: object.clone(),
            include_dir: curl.include_dir.clone(),
            defines: defines.to_vec(),
        };

        let process = toolchain.compile_command(&driver, &input).to_process();
        tracing::debug!("{}", process.display_command());
        let run = process.run()?;
        if !run.success() {
            progress.finish();
            return Err(Error::CompileFailed {
                unit: unit.clone(),
                detail: run.tool_output(),
            });
        }

        shell.status(
            Status::Compiling,
            format!(
                "{} [{}/{}] in {}",
                unit.display(),
                index + 1,
                total,
                format_duration(run.elapsed)
            ),
        );
        objects.push(object);
        progress.inc(1);
    }
    progress.finish();

    if let Some(parent) = target.output.parent() {
        ensure_dir(parent)?;
    }

    shell.status(Status::Linking, target.output.display());
    let input = LinkInput {
        objects,
        output: target.output.clone(),
        lib_dir: curl.lib_dir.clone(),
    };
    let process = toolchain.link_command(&driver, &input).to_process();
    tracing::debug!("{}", process.display_command());
    let run = process.run()?;
    if !run.success() {
        return Err(Error::LinkFailed {
            output: target.output.clone(),
            detail: run.tool_output(),
        });
    }

    let size = std::fs::metadata(&target.output)
        .map(|m| m.len())
        .unwrap_or(0);
    if size == 0 {
        return Err(Error::BuildIncomplete {
            output: target.output.clone(),
        });
    }

    Ok(target.output.clone())
}

// The driver is exercised with a stub "compiler" script so the contract
// (sequential units, first-failure abort, output verification) is tested
// without a real toolchain.
#[cfg(all(test, unix))]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use crate::builder::toolchain::ToolchainKind;
    use crate::core::arch::Arch;
    use crate::util::shell::{ColorChoice, Shell};

    use super::*;

    /// A fake g++: compiles (`-c`) by creating the `-o` target, links by
    /// writing a non-empty output. Fails on any argument containing
    /// "bad"; with `link_empty` the link step produces an empty file.
    fn stub_compiler(dir: &Path, link_empty: bool) -> PathBuf {
        let path = dir.join("fake-g++");
        let body = format!(
            "#!/bin/sh\n\
             out=\"\"; compile=0; next_is_out=0\n\
             for a in \"$@\"; do\n\
             \x20 if [ \"$next_is_out\" = 1 ]; then out=\"$a\"; next_is_out=0; fi\n\
             \x20 case \"$a\" in\n\
             \x20   -c) compile=1 ;;\n\
             \x20   -o) next_is_out=1 ;;\n\
             \x20   *bad*) echo \"error in $a\" >&2; exit 1 ;;\n\
             \x20 esac\n\
             done\n\
             if [ \"$compile\" = 1 ]; then : > \"$out\"; else {} \"$out\"; fi\n",
            if link_empty {
                ": >"
            } else {
                "echo linked >"
            }
        );
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn fixture(link_empty: bool) -> (TempDir, Toolchain, CurlLocation, Arc<Shell>) {
        let tmp = TempDir::new().unwrap();
        let cxx = stub_compiler(tmp.path(), link_empty);
        let toolchain = Toolchain {
            kind: ToolchainKind::Gcc,
            cxx,
            arch_overrides: BTreeMap::new(),
            dual_target: false,
            lto: true,
        };
        let include_dir = tmp.path().join("include");
        let lib_dir = tmp.path().join("lib");
        fs::create_dir_all(&include_dir).unwrap();
        fs::create_dir_all(&lib_dir).unwrap();
        let curl = CurlLocation {
            include_dir,
            lib_dir,
            arch: Arch::host().unwrap(),
        };
        let shell = Arc::new(Shell::from_flags(true, false, ColorChoice::Never, false));
        (tmp, toolchain, curl, shell)
    }

    fn target_with_sources(tmp: &TempDir, names: &[&str]) -> BuildTarget {
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let sources: Vec<PathBuf> = names
            .iter()
            .map(|n| {
                let p = src.join(n);
                fs::write(&p, "").unwrap();
                p
            })
            .collect();
        BuildTarget {
            arch: Arch::host().unwrap(),
            output: tmp.path().join("out").join("levython"),
            sources,
        }
    }

    #[test]
    fn test_build_compiles_all_units_and_links() {
        let (tmp, toolchain, curl, shell) = fixture(false);
        let target = target_with_sources(&tmp, &["a.cpp", "b.cpp", "c.cpp"]);
        let work = tmp.path().join("work");

        let exe = build_executable(&shell, &toolchain, &curl, &target, &work, &[]).unwrap();
        assert!(exe.is_file());

        let obj_dir = work.join("obj").join(target.arch.as_str());
        assert!(obj_dir.join("a.o").exists());
        assert!(obj_dir.join("b.o").exists());
        assert!(obj_dir.join("c.o").exists());
    }

    #[test]
    fn test_first_failure_stops_later_units() {
        let (tmp, toolchain, curl, shell) = fixture(false);
        let target = target_with_sources(&tmp, &["a.cpp", "bad_b.cpp", "c.cpp"]);
        let work = tmp.path().join("work");

        let err = build_executable(&shell, &toolchain, &curl, &target, &work, &[]).unwrap_err();
        match err {
            Error::CompileFailed { unit, detail } => {
                assert!(unit.ends_with("bad_b.cpp"));
                assert!(detail.contains("error in"));
            }
            other => panic!("expected CompileFailed, got {:?}", other),
        }

        // earlier units produced objects, later ones were never invoked
        let obj_dir = work.join("obj").join(target.arch.as_str());
        assert!(obj_dir.join("a.o").exists());
        assert!(!obj_dir.join("bad_b.o").exists());
        assert!(!obj_dir.join("c.o").exists());
    }

    #[test]
    fn test_empty_output_is_build_incomplete() {
        let (tmp, toolchain, curl, shell) = fixture(true);
        let target = target_with_sources(&tmp, &["a.cpp"]);
        let work = tmp.path().join("work");

        let err = build_executable(&shell, &toolchain, &curl, &target, &work, &[]).unwrap_err();
        assert!(matches!(err, Error::BuildIncomplete { .. }));
    }
}
