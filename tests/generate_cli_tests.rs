//! Header generation through the visgen binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests
//!
//! Generated headers must match the reference rtlsdr headers byte for byte.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_generate_manifest_matches_reference_headers() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .arg("--manifest")
        .arg(fixture("visgen.toml"))
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"))
        .stdout(predicate::str::contains("rtlsdr_export.h"))
        .stdout(predicate::str::contains("rtlsdr_static_export.h"));

    for name in ["rtlsdr_export.h", "rtlsdr_static_export.h"] {
        let generated = fs::read_to_string(dir.path().join(name)).unwrap();
        let reference = fs::read_to_string(fixture(name)).unwrap();
        assert_eq!(generated, reference, "{} differs from reference", name);
    }
}

#[test]
fn test_generate_twice_leaves_headers_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    for expected in ["wrote", "unchanged"] {
        let mut cmd = Command::cargo_bin("visgen").unwrap();
        cmd.arg("generate")
            .arg("-t")
            .arg("rtlsdr")
            .arg("-o")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::starts_with(expected));
    }
}

#[test]
fn test_generate_stdout_static_target() {
    let reference = fs::read_to_string(fixture("rtlsdr_static_export.h")).unwrap();
    let output = Command::cargo_bin("visgen")
        .unwrap()
        .args(["generate", "-t", "rtlsdr_static", "-k", "static", "--stdout"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), reference);
}

#[test]
fn test_generate_single_target_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .arg("-m")
        .arg(fixture("visgen.toml"))
        .arg("-t")
        .arg("rtlsdr_static")
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join("rtlsdr_static_export.h").exists());
    assert!(!dir.path().join("rtlsdr_export.h").exists());
}

#[test]
fn test_generate_prefix_and_no_deprecated_hook() {
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .arg("-t")
        .arg("rtl-sdr")
        .arg("--base-name")
        .arg("rtlsdr")
        .arg("--prefix")
        .arg("OSMO_")
        .arg("--define-no-deprecated")
        .arg("--stdout")
        .assert()
        .success()
        .stdout(predicate::str::contains("#ifndef OSMO_RTLSDR_EXPORT_H"))
        .stdout(predicate::str::contains("#    ifdef rtl_sdr_EXPORTS"))
        .stdout(predicate::str::contains("#if 1 /* DEFINE_NO_DEPRECATED */"));
}

#[test]
fn test_generate_requires_target_or_manifest() {
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--manifest or --target"));
}

#[test]
fn test_generate_unknown_manifest_target() {
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .arg("-m")
        .arg(fixture("visgen.toml"))
        .arg("-t")
        .arg("airspy")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("airspy not found"));
}

#[test]
fn test_generate_rejects_bad_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("visgen.toml");
    fs::write(&manifest, "[[library]]\ntarget = \"x\"\nkind = \"dll\"\n").unwrap();
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("generate")
        .arg("-m")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load manifest"));
}

#[test]
fn test_check_reference_headers() {
    for (target, kind, name) in [
        ("rtlsdr", "shared", "rtlsdr_export.h"),
        ("rtlsdr_static", "static", "rtlsdr_static_export.h"),
    ] {
        let mut cmd = Command::cargo_bin("visgen").unwrap();
        cmd.arg("check")
            .arg("-t")
            .arg(target)
            .arg("-k")
            .arg(kind)
            .arg("--header")
            .arg(fixture(name))
            .assert()
            .success()
            .stdout(predicate::str::contains(": ok"));
    }
}

#[test]
fn test_check_detects_kind_mismatch() {
    // The shared header exports symbols, which a static target must not do
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("check")
        .arg("-t")
        .arg("rtlsdr")
        .arg("-k")
        .arg("static")
        .arg("--header")
        .arg(fixture("rtlsdr_export.h"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("RTLSDR_EXPORT expected"))
        .stderr(predicate::str::contains("mismatches"));
}

#[test]
fn test_check_rejects_kind_with_manifest() {
    let mut cmd = Command::cargo_bin("visgen").unwrap();
    cmd.arg("check")
        .arg("-m")
        .arg(fixture("visgen.toml"))
        .arg("-t")
        .arg("rtlsdr")
        .arg("-k")
        .arg("static")
        .arg("--header")
        .arg(fixture("rtlsdr_export.h"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
