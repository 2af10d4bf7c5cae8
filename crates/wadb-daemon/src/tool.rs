//! Locating the adb binary
//!
//! adb is resolved once per runner construction: PATH first, then the
//! platform-tools directory under `ANDROID_HOME` / `ANDROID_SDK_ROOT`.

use std::path::PathBuf;

#[cfg(windows)]
const ADB_EXE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXE: &str = "adb";

/// Resolve the adb program to invoke.
///
/// Absence is not an error here -- the bare name is returned and the first
/// spawn surfaces a proper "adb not found" failure with install guidance.
pub fn locate_adb() -> String {
    if let Ok(path) = which::which(ADB_EXE) {
        return path.to_string_lossy().into_owned();
    }

    for root in sdk_roots() {
        let candidate = root.join("platform-tools").join(ADB_EXE);
        if candidate.exists() {
            return candidate.to_string_lossy().into_owned();
        }
    }

    ADB_EXE.to_string()
}

fn sdk_roots() -> Vec<PathBuf> {
    ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_sdk_roots_includes_android_home() {
        std::env::set_var("ANDROID_HOME", "/test/android");
        let roots = sdk_roots();
        assert!(roots.contains(&PathBuf::from("/test/android")));
        std::env::remove_var("ANDROID_HOME");
    }

    #[test]
    #[serial]
    fn test_sdk_roots_includes_sdk_root() {
        std::env::set_var("ANDROID_SDK_ROOT", "/test/sdk");
        let roots = sdk_roots();
        assert!(roots.contains(&PathBuf::from("/test/sdk")));
        std::env::remove_var("ANDROID_SDK_ROOT");
    }

    #[test]
    #[serial]
    fn test_sdk_roots_skips_empty_values() {
        std::env::set_var("ANDROID_HOME", "");
        assert!(sdk_roots().is_empty() || !sdk_roots().contains(&PathBuf::from("")));
        std::env::remove_var("ANDROID_HOME");
    }

    #[test]
    fn test_locate_adb_always_yields_a_program() {
        assert!(!locate_adb().is_empty());
    }
}
