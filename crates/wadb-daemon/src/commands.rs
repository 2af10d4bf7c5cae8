//! Single-shot adb commands
//!
//! The flat command surface callers display directly: connect, disconnect,
//! listing, install/uninstall, reboot, rotation, server lifecycle, and raw
//! passthrough. Each resolves to a [`CommandOutcome`] at the public boundary
//! -- callers always get something to display, never an unstructured error.

use crate::bulk::uninstall_invocation;
use crate::devices::{parse_device_listing, DeviceEntry};
use crate::runner::{AdbInvocation, AdbRunner, CommandOutcome};
use wadb_core::prelude::*;

/// `adb connect <host[:port]>`
pub async fn connect(runner: &AdbRunner, target: &str) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["connect", target])).await)
}

/// `adb disconnect <identifier-or-endpoint>`
pub async fn disconnect(runner: &AdbRunner, target: &str) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["disconnect", target])).await)
}

/// Current device listing, parsed. Entries are recomputed on every call;
/// nothing is cached across runs.
pub async fn list_devices(runner: &AdbRunner) -> Result<Vec<DeviceEntry>> {
    let output = runner.run(&AdbInvocation::new(["devices", "-l"])).await?;
    Ok(parse_device_listing(&output).collect())
}

/// `adb install <apk>`
pub async fn install_apk(runner: &AdbRunner, apk: &str) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["install", apk])).await)
}

/// Remove a single package for the current user.
pub async fn uninstall_package(runner: &AdbRunner, package: &str) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&uninstall_invocation(package)).await)
}

/// `adb reboot`
pub async fn reboot(runner: &AdbRunner) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["reboot"])).await)
}

/// Force the screen to `rotation` (0 = portrait .. 3 = 270 degrees).
///
/// Two sequential settings writes: the user_rotation value only sticks while
/// accelerometer_rotation is off, so that is locked first. The second write
/// is only issued if the first succeeded.
pub async fn set_rotation(runner: &AdbRunner, rotation: u8) -> CommandOutcome {
    let lock = AdbInvocation::new([
        "shell",
        "settings",
        "put",
        "system",
        "accelerometer_rotation",
        "0",
    ]);
    if let Err(err) = runner.run(&lock).await {
        return CommandOutcome::from_result(Err(err));
    }

    let rotation = rotation.to_string();
    let set = AdbInvocation::new([
        "shell",
        "settings",
        "put",
        "system",
        "user_rotation",
        rotation.as_str(),
    ]);
    CommandOutcome::from_result(runner.run(&set).await)
}

/// `adb start-server`
pub async fn start_server(runner: &AdbRunner) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["start-server"])).await)
}

/// `adb kill-server`
pub async fn kill_server(runner: &AdbRunner) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(["kill-server"])).await)
}

/// Arbitrary adb passthrough: `adb <args..>`.
pub async fn run_adb(runner: &AdbRunner, args: &[String]) -> CommandOutcome {
    CommandOutcome::from_result(runner.run(&AdbInvocation::new(args.to_vec())).await)
}

/// Run a raw command line through the platform shell (`cmd /C` on Windows,
/// `sh -c` elsewhere).
///
/// This is the one path that hands a caller-supplied string to a shell;
/// everything else in this crate passes argument vectors. Callers own the
/// quoting of what they pass here.
pub async fn exec_shell(runner: &AdbRunner, command: &str) -> CommandOutcome {
    #[cfg(windows)]
    let (program, invocation) = ("cmd", AdbInvocation::new(["/C", command]));
    #[cfg(not(windows))]
    let (program, invocation) = ("sh", AdbInvocation::new(["-c", command]));

    debug!("Shell passthrough: {command}");
    CommandOutcome::from_result(runner.run_program(program, &invocation).await)
}
