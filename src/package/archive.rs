//! Release archive creation.
//!
//! One `.tar.gz` per architecture at maximum compression, entries rooted
//! at the staging directory's name. Entries are written in sorted walk
//! order so repeated runs of the same tree agree on file count and
//! uncompressed content; compressed bytes are not promised to match.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::util::fs::{ensure_dir, relative_path};

/// Compress the staging directory into `dest`.
///
/// An existing archive at `dest` is removed first, so a failed run never
/// leaves a half-overwritten file behind.
pub fn create_tar_gz(staging_dir: &Path, dest: &Path) -> crate::error::Result<PathBuf> {
    if dest.exists() {
        fs::remove_file(dest)
            .with_context(|| format!("failed to remove stale archive: {}", dest.display()))?;
    }
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    let file =
        File::create(dest).with_context(|| format!("failed to create {}", dest.display()))?;
    let encoder = GzEncoder::new(file, Compression::best());
    let mut builder = tar::Builder::new(encoder);

    let base = staging_dir.parent().unwrap_or(staging_dir);
    for entry in WalkDir::new(staging_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", staging_dir.display()))?;
        let rel = relative_path(base, entry.path());
        if entry.file_type().is_dir() {
            builder
                .append_dir(&rel, entry.path())
                .with_context(|| format!("failed to archive {}", entry.path().display()))?;
        } else {
            builder
                .append_path_with_name(entry.path(), &rel)
                .with_context(|| format!("failed to archive {}", entry.path().display()))?;
        }
    }

    let encoder = builder
        .into_inner()
        .with_context(|| format!("failed to finish {}", dest.display()))?;
    encoder
        .finish()
        .with_context(|| format!("failed to finish {}", dest.display()))?;

    Ok(dest.to_path_buf())
}

/// Write a `<archive>.sha256` sidecar in `sha256sum` format.
pub fn write_checksum(archive: &Path) -> crate::error::Result<PathBuf> {
    let bytes =
        fs::read(archive).with_context(|| format!("failed to read {}", archive.display()))?;
    let digest = Sha256::digest(&bytes);

    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive");
    let line = format!("{}  {}\n", hex::encode(digest), name);

    let dest = PathBuf::from(format!("{}.sha256", archive.display()));
    fs::write(&dest, line).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Read;

    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    use super::*;

    fn sample_staging(tmp: &TempDir) -> PathBuf {
        let staging = tmp.path().join("stage").join("levython-0.4.1-linux-x64");
        fs::create_dir_all(staging.join("examples")).unwrap();
        fs::write(staging.join("levython"), "binary").unwrap();
        fs::write(staging.join("install.sh"), "#!/bin/sh\n").unwrap();
        fs::write(staging.join("examples/hello.levy"), "say \"hi\"").unwrap();
        staging
    }

    /// Read back entry names and file contents.
    fn read_archive(path: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
        let mut entries = BTreeMap::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            entries.insert(name, contents);
        }
        entries
    }

    #[test]
    fn test_archive_rooted_at_staging_name() {
        let tmp = TempDir::new().unwrap();
        let staging = sample_staging(&tmp);
        let dest = tmp.path().join("release/levython-0.4.1-linux-x64.tar.gz");

        create_tar_gz(&staging, &dest).unwrap();
        let entries = read_archive(&dest);

        assert!(entries.contains_key("levython-0.4.1-linux-x64/levython"));
        assert!(entries.contains_key("levython-0.4.1-linux-x64/install.sh"));
        assert!(entries.contains_key("levython-0.4.1-linux-x64/examples/hello.levy"));
        assert_eq!(
            entries["levython-0.4.1-linux-x64/levython"],
            b"binary".to_vec()
        );
    }

    #[test]
    fn test_repeated_runs_agree_on_content() {
        let tmp = TempDir::new().unwrap();
        let staging = sample_staging(&tmp);
        let dest = tmp.path().join("release/pkg.tar.gz");

        create_tar_gz(&staging, &dest).unwrap();
        let first = read_archive(&dest);

        create_tar_gz(&staging, &dest).unwrap();
        let second = read_archive(&dest);

        // file count and uncompressed content match; compressed bytes
        // are deliberately not compared
        assert_eq!(first, second);
    }

    #[test]
    fn test_stale_archive_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let staging = sample_staging(&tmp);
        let dest = tmp.path().join("release/pkg.tar.gz");

        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "not an archive").unwrap();

        create_tar_gz(&staging, &dest).unwrap();
        let entries = read_archive(&dest);
        assert!(!entries.is_empty());
    }

    #[test]
    fn test_checksum_sidecar() {
        let tmp = TempDir::new().unwrap();
        let staging = sample_staging(&tmp);
        let dest = tmp.path().join("release/pkg.tar.gz");

        create_tar_gz(&staging, &dest).unwrap();
        let sidecar = write_checksum(&dest).unwrap();

        let line = fs::read_to_string(&sidecar).unwrap();
        let (hash, name) = line.trim().split_once("  ").unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(name, "pkg.tar.gz");
    }
}
