//! # wadb-daemon - adb Process Management
//!
//! Everything that talks to the adb server: command execution with bounded
//! output capture, device-listing parsing, the wireless pairing workflow,
//! and bulk per-target operations.
//!
//! Depends on [`wadb_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Command Execution
//! - [`AdbRunner`] - Session context: resolved adb program + output ceiling
//! - [`AdbInvocation`] - One immutable command invocation (argv, stdin, cap)
//! - [`CommandOutcome`] - Display-ready result, produced even on failure
//!
//! ### Device Listing
//! - [`DeviceEntry`], [`DeviceState`] - One row of `adb devices -l`
//! - [`parse_device_listing()`] - Lazy, order-preserving listing parser
//!
//! ### Pairing
//! - [`pair_and_connect()`] - Pair, connect, reconcile stale sessions
//! - [`PairRequest`], [`PairingSession`], [`FallbackConnect`]
//!
//! ### Bulk Operations
//! - [`run_bulk()`] - Apply one operation across targets, isolating failures
//! - [`uninstall_packages()`] - Bulk package removal
//!
//! ### Single-shot Commands
//! - [`commands`] - connect/disconnect/listing/install/reboot/rotation/
//!   server lifecycle/passthrough

pub mod bulk;
pub mod commands;
pub mod devices;
pub mod pairing;
pub mod runner;
pub mod tool;

// Public API re-exports
pub use bulk::{run_bulk, uninstall_packages, TargetOutcome};
pub use devices::{parse_device_listing, DeviceEntry, DeviceState};
pub use pairing::{
    pair_and_connect, DisconnectFailure, FallbackConnect, PairRequest, PairingSession,
};
pub use runner::{AdbInvocation, AdbRunner, CommandOutcome, DEFAULT_MAX_OUTPUT};
pub use tool::locate_adb;
