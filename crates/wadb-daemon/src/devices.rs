//! Device listing parsing for `adb devices -l`
//!
//! The listing is line-oriented text: a fixed header line, then one
//! whitespace-delimited row per device. Identifiers are unique within a
//! single snapshot but not stable across snapshots -- a device may
//! re-enumerate under a different transport identifier after a reconnect, so
//! entries are recomputed on every request and never mutated in place.

use serde::Serialize;
use std::fmt;
use wadb_core::Endpoint;

/// mDNS service suffix adb uses for established wireless connections.
const TLS_CONNECT_SUFFIX: &str = "._adb-tls-connect._tcp";

/// Connection status column of a listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Other(String),
}

impl DeviceState {
    fn parse(token: &str) -> Self {
        match token {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            other => DeviceState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Device => write!(f, "device"),
            DeviceState::Offline => write!(f, "offline"),
            DeviceState::Unauthorized => write!(f, "unauthorized"),
            DeviceState::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One row of a device listing snapshot
#[derive(Debug, Clone, Serialize)]
pub struct DeviceEntry {
    /// Transport identifier (first column)
    pub id: String,
    /// Connection status (second column)
    pub state: DeviceState,
    /// The raw source line, kept for display
    pub raw: String,
}

impl DeviceEntry {
    /// The endpoint this entry connects through, if the identifier is
    /// endpoint-form (`host:port`). mDNS identifiers carry no port field.
    pub fn endpoint(&self) -> Option<Endpoint> {
        Endpoint::parse(&self.id)
    }

    /// Whether this entry belongs to the wireless-debugging transport:
    /// an mDNS `_adb-tls-connect` service instance or an endpoint-form
    /// identifier. USB serials and `emulator-NNNN` are not wireless.
    pub fn is_wireless(&self) -> bool {
        (self.id.starts_with("adb-") && self.id.ends_with(TLS_CONNECT_SUFFIX))
            || self.endpoint().is_some()
    }
}

/// Parse `adb devices -l` output into entries, lazily and in source order.
///
/// The first line is the fixed header and is always discarded without
/// inspection. A non-blank line becomes an entry only if it yields at least
/// two whitespace-delimited tokens (identifier, status); malformed lines are
/// dropped rather than aborting the caller's flow -- garbled output from a
/// half-dead connection must not take the listing down with it.
pub fn parse_device_listing(output: &str) -> impl Iterator<Item = DeviceEntry> + '_ {
    output.lines().skip(1).filter_map(parse_device_line)
}

fn parse_device_line(line: &str) -> Option<DeviceEntry> {
    let mut tokens = line.split_whitespace();
    let id = tokens.next()?;
    let state = tokens.next()?;

    Some(DeviceEntry {
        id: id.to_string(),
        state: DeviceState::parse(state),
        raw: line.to_string(),
    })
}
