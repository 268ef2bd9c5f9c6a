//! Build targets and object planning.

use std::path::{Path, PathBuf};

use crate::core::arch::Arch;
use crate::core::product::ProductManifest;
use crate::util::fs::glob_files;

/// One architecture's build: where the executable lands and which
/// translation units feed it, in compile order.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    pub arch: Arch,
    pub output: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Plan one architecture's build from the manifest.
pub fn plan_target(
    root: &Path,
    manifest: &ProductManifest,
    arch: Arch,
) -> crate::error::Result<BuildTarget> {
    let sources = glob_files(root, &manifest.build.sources)?;
    if sources.is_empty() {
        return Err(anyhow::anyhow!(
            "no source files matched {:?} under {}",
            manifest.build.sources,
            root.display()
        )
        .into());
    }

    Ok(BuildTarget {
        arch,
        output: manifest.executable_path(root, arch),
        sources,
    })
}

/// Object file path for one translation unit.
pub fn object_path(object_dir: &Path, unit: &Path, extension: &str) -> PathBuf {
    let stem = unit
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unit");
    object_dir.join(format!("{}.{}", stem, extension))
}

/// Preprocessor defines for a build: the manifest's own plus the static
/// curl marker on Windows.
pub fn effective_defines(manifest: &ProductManifest) -> Vec<String> {
    let mut defines = manifest.build.defines.clone();
    if cfg!(windows) {
        defines.push("CURL_STATICLIB".to_string());
    }
    defines
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_plan_orders_sources_and_sets_output() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("levython.cpp"), "").unwrap();
        fs::write(src.join("http_client.cpp"), "").unwrap();
        fs::write(src.join("http_bindings.cpp"), "").unwrap();

        let manifest = ProductManifest::default();
        let target = plan_target(tmp.path(), &manifest, Arch::X64).unwrap();

        assert_eq!(target.sources.len(), 3);
        assert!(target.sources[0].ends_with("http_bindings.cpp"));
        assert!(target.sources[2].ends_with("levython.cpp"));
        assert!(target.output.ends_with(
            Path::new("build").join("x64").join(manifest.exe_name())
        ));
    }

    #[test]
    fn test_plan_fails_on_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let manifest = ProductManifest::default();
        assert!(plan_target(tmp.path(), &manifest, Arch::X64).is_err());
    }

    #[test]
    fn test_object_path_maps_stem_and_extension() {
        let obj = object_path(
            Path::new("build/obj/x64"),
            Path::new("src/http_client.cpp"),
            "o",
        );
        assert_eq!(obj, PathBuf::from("build/obj/x64/http_client.o"));

        let obj = object_path(
            Path::new("build/obj/x64"),
            Path::new("src/levython.cpp"),
            "obj",
        );
        assert_eq!(obj, PathBuf::from("build/obj/x64/levython.obj"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_effective_defines_passthrough() {
        let mut manifest = ProductManifest::default();
        manifest.build.defines = vec!["NDEBUG".to_string()];
        assert_eq!(effective_defines(&manifest), vec!["NDEBUG".to_string()]);
    }
}
