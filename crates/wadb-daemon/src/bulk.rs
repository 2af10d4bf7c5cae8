//! Bulk operations across device targets
//!
//! Applies one operation to each target strictly in sequence -- concurrent
//! adb invocations contend on the tool's own session state, so parallelism
//! is deliberately not offered. One target's failure never aborts the rest.

use std::collections::HashMap;

use serde::Serialize;

use crate::runner::{AdbInvocation, AdbRunner};
use wadb_core::prelude::*;

/// Per-target result of a bulk operation
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub success: bool,
    /// Success output or error text for this target
    pub detail: String,
}

impl TargetOutcome {
    fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                detail: output,
            },
            Err(err) => {
                let detail = match err.captured_output() {
                    Some(output) if !output.is_empty() => output.to_string(),
                    _ => err.to_string(),
                };
                Self {
                    success: false,
                    detail,
                }
            }
        }
    }
}

/// Apply `op` to every target sequentially, recording each outcome under the
/// original identifier.
///
/// The returned map has exactly one entry per input identifier. Duplicate
/// identifiers collapse to one key, last write wins -- callers should
/// deduplicate upstream if that is undesired.
pub async fn run_bulk<F>(
    runner: &AdbRunner,
    targets: &[String],
    op: F,
) -> HashMap<String, TargetOutcome>
where
    F: Fn(&str) -> AdbInvocation,
{
    let mut results = HashMap::with_capacity(targets.len());

    for target in targets {
        debug!("Bulk operation on {target}");
        let outcome = TargetOutcome::from_result(runner.run(&op(target)).await);
        if !outcome.success {
            warn!("Bulk operation on {target} failed: {}", outcome.detail);
        }
        results.insert(target.clone(), outcome);
    }

    results
}

/// Remove a set of packages from the device, one `pm uninstall` per package.
pub async fn uninstall_packages(
    runner: &AdbRunner,
    packages: &[String],
) -> HashMap<String, TargetOutcome> {
    run_bulk(runner, packages, uninstall_invocation).await
}

/// `pm uninstall --user 0` keeps the APK on disk for other users, which is
/// what debloating workflows expect.
pub(crate) fn uninstall_invocation(package: &str) -> AdbInvocation {
    AdbInvocation::new(["shell", "pm", "uninstall", "--user", "0", package])
}
