//! Drive the façade against a scripted stand-in for the runtime binary to
//! cover the "ran and reported failure" path.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use rustainer::Apptainer;

fn fake_runtime(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("apptainer");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn test_runtime_failure_is_returned_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_runtime(&dir, "echo 'FATAL: could not open image' >&2\nexit 255");
    let runner = Apptainer::with_image("/tmp/missing.sif").binary(bin);

    let out = runner.exec(["ls"], None).unwrap();
    assert!(out.failed());
    assert_eq!(out.code(), 255);
    assert!(out.stderr().contains("could not open image"));
    assert!(out.stdout().is_empty());
}

#[test]
fn test_runtime_success_passes_stdout_through() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_runtime(&dir, "echo 'org.label-schema.schema-version: 1.0'");
    let runner = Apptainer::with_image("/tmp/alpine.sif").binary(bin);

    let out = runner.inspect(None).unwrap();
    assert!(out.succeeded());
    assert!(out.stdout().contains("schema-version"));
}

#[test]
fn test_unexecutable_runtime_is_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    // Regular file without the executable bit.
    let path = dir.path().join("apptainer");
    fs::write(&path, "#!/bin/sh\n").unwrap();
    let runner = Apptainer::with_image("/tmp/alpine.sif").binary(&path);

    let err = runner.exec(["ls"], None).unwrap_err();
    let exec_err = err.downcast_ref::<rustainer::ExecError>().unwrap();
    assert!(matches!(exec_err, rustainer::ExecError::Spawn { .. }));
}
