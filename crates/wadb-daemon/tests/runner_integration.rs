//! Runner behavior against scripted fake executables
//!
//! Shell scripts stand in for adb so capture, stdin delivery, exit-code
//! handling, and the output ceiling can be observed end to end.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;
use wadb_core::Error;
use wadb_daemon::{AdbInvocation, AdbRunner};

fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn runner_for(script: &PathBuf) -> AdbRunner {
    AdbRunner::with_program(script.to_string_lossy())
}

#[tokio::test]
async fn captures_merged_output_stdout_first() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "adb", "echo out-line\necho err-line >&2\n");

    let output = runner_for(&script)
        .run(&AdbInvocation::new(["devices"]))
        .await
        .unwrap();

    assert_eq!(output, "out-line\nerr-line\n");
}

#[tokio::test]
async fn delivers_stdin_payload_once_newline_terminated() {
    let dir = TempDir::new().unwrap();
    // cat only terminates once stdin is closed, so a completed run proves
    // the payload write was followed by a close.
    let script = write_script(&dir, "adb", "cat\n");

    let output = runner_for(&script)
        .run(&AdbInvocation::new(["pair", "192.168.1.5:37099"]).with_stdin("123456"))
        .await
        .unwrap();

    assert_eq!(output, "123456\n");
}

#[tokio::test]
async fn no_payload_means_closed_stdin() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "adb", "cat\necho done\n");

    let output = runner_for(&script)
        .run(&AdbInvocation::new(["devices"]))
        .await
        .unwrap();

    assert_eq!(output, "done\n");
}

#[tokio::test]
async fn nonzero_exit_fails_with_captured_output() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "adb",
        "echo partial result\necho broken >&2\nexit 2\n",
    );

    let err = runner_for(&script)
        .run(&AdbInvocation::new(["connect", "192.168.1.5:5555"]))
        .await
        .unwrap_err();

    match err {
        Error::CommandFailed { message, output } => {
            assert!(message.contains("code 2"));
            assert!(output.contains("partial result"));
            assert!(output.contains("broken"));
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_output_is_represented_not_an_error() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "adb", "exit 0\n");

    let output = runner_for(&script)
        .run(&AdbInvocation::new(["start-server"]))
        .await
        .unwrap();

    assert_eq!(output, "");
}

#[tokio::test]
async fn missing_program_maps_to_adb_not_found() {
    let runner = AdbRunner::with_program("/nonexistent/path/to/adb-missing");

    let err = runner
        .run(&AdbInvocation::new(["devices"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AdbNotFound));
}

#[tokio::test]
async fn output_over_ceiling_fails_with_output_too_large() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "adb",
        "i=0\nwhile [ $i -lt 64 ]; do printf '%01024d' 7; i=$((i+1)); done\n",
    );

    let err = runner_for(&script)
        .run(&AdbInvocation::new(["logcat"]).with_max_output(4096))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OutputTooLarge { limit: 4096 }));
}

#[tokio::test]
async fn output_under_ceiling_passes() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "adb", "printf '%0100d' 7\n");

    let output = runner_for(&script)
        .run(&AdbInvocation::new(["devices"]).with_max_output(4096))
        .await
        .unwrap();

    assert_eq!(output.len(), 100);
}
