//! CLI integration tests for slipway.
//!
//! These tests exercise the CLI surface without assuming a compiler or
//! libcurl on the host: packaging flows use --skip-build against a
//! prepared product tree.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command.
fn slipway() -> Command {
    Command::cargo_bin("slipway").unwrap()
}

/// Create a temporary directory for test product trees.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Lay out a product tree that can be packaged with --skip-build: the
/// required re-launch scripts and a previously "built" executable.
fn prepared_tree(tmp: &TempDir) -> PathBuf {
    let root = tmp.path();
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::write(root.join("dist/install.bat"), "@echo off\r\n").unwrap();
    fs::write(root.join("dist/install.sh"), "#!/bin/sh\n").unwrap();
    fs::write(root.join("README.md"), "# levython\n").unwrap();

    let exe = root
        .join("build")
        .join("x64")
        .join(format!("levython{}", std::env::consts::EXE_SUFFIX));
    fs::create_dir_all(exe.parent().unwrap()).unwrap();
    fs::write(&exe, "fake executable bytes").unwrap();
    exe
}

fn slug() -> String {
    format!("levython-0.4.1-{}-x64", std::env::consts::OS)
}

// ============================================================================
// slipway --help
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    slipway()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dist"))
        .stdout(predicate::str::contains("toolchain"))
        .stdout(predicate::str::contains("clean"));
}

// ============================================================================
// slipway dist
// ============================================================================

#[test]
fn test_dist_rejects_unknown_arch() {
    slipway()
        .args(["dist", "--arch", "mips"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mips"));
}

#[test]
fn test_dist_fails_in_empty_tree() {
    let tmp = temp_dir();

    slipway()
        .arg("dist")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_skip_build_without_executable_is_missing_input() {
    let tmp = temp_dir();

    slipway()
        .args(["dist", "--skip-build", "--arch", "x64"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("required package input missing"));
}

#[test]
fn test_skip_build_packages_previous_executable() {
    let tmp = temp_dir();
    prepared_tree(&tmp);

    slipway()
        .args(["dist", "--skip-build", "--arch", "x64"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let archive = tmp
        .path()
        .join("release")
        .join(format!("{}.tar.gz", slug()));
    assert!(archive.is_file());
    assert!(Path::new(&format!("{}.sha256", archive.display())).is_file());
}

#[test]
fn test_archive_contains_canonical_name_and_present_optionals() {
    let tmp = temp_dir();
    prepared_tree(&tmp);
    // no examples directory on disk, so the archive must not have one

    slipway()
        .args(["dist", "--skip-build", "--arch", "x64"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let archive = tmp
        .path()
        .join("release")
        .join(format!("{}.tar.gz", slug()));

    let mut names = Vec::new();
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(
        fs::File::open(&archive).unwrap(),
    ));
    for entry in tar.entries().unwrap() {
        let mut entry = entry.unwrap();
        names.push(entry.path().unwrap().to_string_lossy().into_owned());
        let mut sink = Vec::new();
        entry.read_to_end(&mut sink).unwrap();
    }

    let exe_entry = format!(
        "{}/levython{}",
        slug(),
        std::env::consts::EXE_SUFFIX
    );
    assert!(names.contains(&exe_entry));
    assert!(names.contains(&format!("{}/install.sh", slug())));
    assert!(names.contains(&format!("{}/README.md", slug())));
    assert!(!names.iter().any(|n| n.contains("examples")));
}

#[test]
fn test_json_mode_suppresses_human_output() {
    let tmp = temp_dir();
    prepared_tree(&tmp);

    slipway()
        .args([
            "dist",
            "--skip-build",
            "--arch",
            "x64",
            "--message-format",
            "json",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Staging").not());
}

#[test]
fn test_rerun_overwrites_archive_in_place() {
    let tmp = temp_dir();
    prepared_tree(&tmp);

    for _ in 0..2 {
        slipway()
            .args(["dist", "--skip-build", "--arch", "x64"])
            .current_dir(tmp.path())
            .assert()
            .success();
    }

    let release = tmp.path().join("release");
    let archives: Vec<_> = fs::read_dir(&release)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tar.gz"))
        .collect();
    assert_eq!(archives.len(), 1);
}

// ============================================================================
// slipway clean
// ============================================================================

#[test]
fn test_clean_removes_work_and_release_dirs() {
    let tmp = temp_dir();
    prepared_tree(&tmp);
    fs::create_dir_all(tmp.path().join("release")).unwrap();

    slipway()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(!tmp.path().join("build").exists());
    assert!(!tmp.path().join("release").exists());
}

#[test]
fn test_clean_is_quiet_on_missing_dirs() {
    let tmp = temp_dir();

    slipway()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();
}

// ============================================================================
// slipway toolchain
// ============================================================================

#[test]
fn test_toolchain_reports_discovery_or_absence() {
    // the host may or may not have a compiler; both outcomes have a
    // stable surface
    let output = slipway().arg("toolchain").output().unwrap();
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("kind:"));
        assert!(stdout.contains("driver:"));
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no usable C++ toolchain"));
    }
}
