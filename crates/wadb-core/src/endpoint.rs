//! Network endpoint parsing and extraction
//!
//! Wireless debugging identifies targets by `host:port` pairs. The adb tool
//! echoes endpoints in free-form text (pairing banners, connect confirmations),
//! so extraction works over unstructured output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Static pattern for IPv4 endpoints embedded in tool output:
/// four dot-separated 1-3 digit groups, a colon, and 1-5 port digits.
static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}:\d{1,5}").expect("Invalid endpoint pattern regex")
});

/// A network-reachable debugging target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// IPv4 host address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a strict `host:port` string.
    ///
    /// Returns `None` when the colon or port is missing, or the port does not
    /// fit in a u16.
    pub fn parse(s: &str) -> Option<Self> {
        let (host, port) = s.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port: u16 = port.parse().ok()?;
        Some(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// All non-overlapping endpoint matches in `text`, in scan order.
///
/// Matches whose port digits exceed u16 range are dropped.
pub fn extract_endpoints(text: &str) -> Vec<Endpoint> {
    ENDPOINT_PATTERN
        .find_iter(text)
        .filter_map(|m| Endpoint::parse(m.as_str()))
        .collect()
}

/// The last endpoint match in `text`.
///
/// The tool may echo the requested endpoint before printing the negotiated
/// one, so the last match in scan order is the authoritative endpoint.
pub fn last_endpoint(text: &str) -> Option<Endpoint> {
    extract_endpoints(text).pop()
}

/// The host portion of a `host[:port]` specifier.
pub fn host_part(target: &str) -> &str {
    match target.rsplit_once(':') {
        Some((host, _)) => host,
        None => target,
    }
}
