//! Wireless pairing workflow: pair, connect, reconcile stale sessions
//!
//! The workflow is linear with no backward transitions: pair the requested
//! endpoint, extract the negotiated endpoint from the pairing output, connect
//! to it, then disconnect leftover wireless entries that the new connection
//! supersedes. Every step awaits one adb invocation to completion before the
//! next; adb keeps its own global connection-server state, so no two of these
//! workflows should run concurrently against the same server.
//!
//! The caller always gets back a fully resolved [`PairingSession`] -- inner
//! failures become its `error` field, never a propagated error.

use serde::Serialize;

use crate::devices::{parse_device_listing, DeviceEntry};
use crate::runner::{AdbInvocation, AdbRunner};
use wadb_core::prelude::*;
use wadb_core::{extract_endpoints, host_part, Endpoint};

/// Content marker adb prints on a successful pairing. Exit status alone is
/// not trustworthy for `pair` on every platform, so success is also inferred
/// from output content.
const PAIRED_MARKER: &str = "Successfully paired";

/// A pairing request: the endpoint shown in the device's wireless-debugging
/// dialog and the one-time code that goes with it.
#[derive(Debug, Clone)]
pub struct PairRequest {
    /// `host:port` as displayed by the device
    pub endpoint: String,
    /// One-time pairing code, delivered on the pair process's stdin
    pub code: String,
}

impl PairRequest {
    pub fn new(endpoint: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            code: code.into(),
        }
    }
}

/// Outcome of the host-only fallback connect issued when pairing output
/// contained no endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FallbackConnect {
    /// An endpoint was extracted from pairing output; no fallback was needed.
    NotNeeded,
    /// Host-only connect was attempted and succeeded.
    Succeeded,
    /// Host-only connect was attempted and failed. Pairing may still have
    /// partially succeeded, so the failure is recorded, not propagated.
    Failed { error: String },
}

/// A stale entry that could not be disconnected during reconciliation.
/// Partial cleanup is acceptable; these are reported, not fatal.
#[derive(Debug, Clone, Serialize)]
pub struct DisconnectFailure {
    pub id: String,
    pub error: String,
}

/// Fully resolved result of a pairing workflow.
///
/// Constructed at the start of a request and either completed or marked
/// failed before being returned -- never partially exposed.
#[derive(Debug, Clone, Serialize)]
pub struct PairingSession {
    pub success: bool,
    /// Endpoint the caller asked to pair with
    pub requested: String,
    /// Raw pairing output, kept regardless of success
    pub pairing_output: String,
    /// Endpoint the connection was established to. May differ from the
    /// requested port -- the tool negotiates its own ephemeral port.
    pub connect_endpoint: Option<Endpoint>,
    pub fallback: FallbackConnect,
    /// Identifiers disconnected during stale-session cleanup
    pub disconnected: Vec<String>,
    pub disconnect_failures: Vec<DisconnectFailure>,
    /// Fresh device listing taken after the workflow, for display
    pub devices: Vec<DeviceEntry>,
    pub error: Option<String>,
}

impl PairingSession {
    fn start(request: &PairRequest) -> Self {
        Self {
            success: false,
            requested: request.endpoint.clone(),
            pairing_output: String::new(),
            connect_endpoint: None,
            fallback: FallbackConnect::NotNeeded,
            disconnected: Vec::new(),
            disconnect_failures: Vec::new(),
            devices: Vec::new(),
            error: None,
        }
    }
}

/// Run the full pair -> connect -> reconcile workflow.
///
/// `runner` is the session context; nothing here is process-wide. The
/// returned session carries either the resolved connection or a textual
/// error -- this function does not fail.
pub async fn pair_and_connect(runner: &AdbRunner, request: &PairRequest) -> PairingSession {
    let mut session = PairingSession::start(request);

    match run_workflow(runner, request, &mut session).await {
        Ok(()) => session.success = true,
        Err(err) => {
            warn!("Pairing workflow for {} failed: {err}", request.endpoint);
            if session.pairing_output.is_empty() {
                if let Some(output) = err.captured_output() {
                    session.pairing_output = output.to_string();
                }
            }
            session.error = Some(err.to_string());
        }
    }

    session
}

async fn run_workflow(
    runner: &AdbRunner,
    request: &PairRequest,
    session: &mut PairingSession,
) -> Result<()> {
    // Pairing. The code goes to the process stdin, newline-terminated.
    info!("Pairing with {}", request.endpoint);
    let pair = AdbInvocation::new(["pair", request.endpoint.as_str()])
        .with_stdin(request.code.as_str());
    session.pairing_output = match runner.run(&pair).await {
        Ok(output) => output,
        Err(Error::CommandFailed { message, output }) if output.contains(PAIRED_MARKER) => {
            debug!("pair exited nonzero but output reports success: {message}");
            output
        }
        Err(err) => return Err(err),
    };

    // ExtractEndpoint. The tool may echo the requested endpoint before
    // printing the negotiated one, so the last match is authoritative.
    let target = extract_endpoints(&session.pairing_output).pop();

    // Connecting.
    match &target {
        Some(endpoint) => {
            info!("Connecting to {endpoint}");
            let target_arg = endpoint.to_string();
            runner
                .run(&AdbInvocation::new(["connect", target_arg.as_str()]))
                .await?;
            session.connect_endpoint = Some(endpoint.clone());
        }
        None => {
            // Best-effort host-only connect; its outcome is recorded so the
            // caller can tell "fallback failed" from "fallback not needed".
            let host = host_part(&request.endpoint).to_string();
            info!("No endpoint in pairing output, host-only connect to {host}");
            session.fallback = match runner
                .run(&AdbInvocation::new(["connect", host.as_str()]))
                .await
            {
                Ok(_) => FallbackConnect::Succeeded,
                Err(err) => {
                    warn!("Host-only connect to {host} failed: {err}");
                    FallbackConnect::Failed {
                        error: err.to_string(),
                    }
                }
            };
        }
    }

    // ReconcilingStale.
    let listing = runner.run(&AdbInvocation::new(["devices", "-l"])).await?;
    let entries: Vec<DeviceEntry> = parse_device_listing(&listing).collect();

    if session.connect_endpoint.is_none() {
        session.connect_endpoint =
            resolve_from_listing(&entries, host_part(&request.endpoint));
    }

    match session.connect_endpoint.clone() {
        Some(resolved) => {
            for entry in stale_entries(&entries, &resolved) {
                info!("Disconnecting stale session {}", entry.id);
                match runner
                    .run(&AdbInvocation::new(["disconnect", entry.id.as_str()]))
                    .await
                {
                    Ok(_) => session.disconnected.push(entry.id.clone()),
                    Err(err) => {
                        warn!("Failed to disconnect {}: {err}", entry.id);
                        session.disconnect_failures.push(DisconnectFailure {
                            id: entry.id.clone(),
                            error: err.to_string(),
                        });
                    }
                }
            }
        }
        // Nothing to key stale detection on; disconnecting by guesswork
        // could take down a session that is actually alive.
        None => debug!("No endpoint resolved; skipping stale-session cleanup"),
    }

    // Done. Fresh listing for display.
    let final_listing = runner.run(&AdbInvocation::new(["devices", "-l"])).await?;
    session.devices = parse_device_listing(&final_listing).collect();

    Ok(())
}

/// Last endpoint-form entry on `host`, in listing order. Used when pairing
/// output yielded no endpoint but the connection shows up in the listing.
fn resolve_from_listing(entries: &[DeviceEntry], host: &str) -> Option<Endpoint> {
    entries
        .iter()
        .filter_map(|e| e.endpoint())
        .filter(|ep| ep.host == host)
        .last()
}

/// Wireless entries superseded by the resolved endpoint: mDNS instances
/// (which carry no port field) and same-host endpoint-form entries on a
/// different port. Ports compare numerically, never as substrings, so port
/// 123 cannot match inside 1234.
fn stale_entries<'a>(entries: &'a [DeviceEntry], resolved: &Endpoint) -> Vec<&'a DeviceEntry> {
    entries
        .iter()
        .filter(|entry| {
            if !entry.is_wireless() {
                return false;
            }
            match entry.endpoint() {
                Some(ep) => ep.host == resolved.host && ep.port != resolved.port,
                None => true,
            }
        })
        .collect()
}
