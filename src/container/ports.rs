//! Host port allocation for deployed apps.

use std::net::TcpListener;
use thiserror::Error;
use tracing::debug;

/// How many ports above the base we try before giving up.
const PORT_SCAN_RANGE: u16 = 200;

#[derive(Debug, Error)]
#[error("no free port in range {start}..{end}")]
pub struct PortExhausted {
    pub start: u16,
    pub end: u16,
}

/// Find a currently free TCP port, scanning upward from `base`.
///
/// The port is probed by binding and immediately released, so another
/// process can still grab it before the container does. In practice the
/// window is small and Docker reports the conflict cleanly on start.
pub fn find_free_port(base: u16) -> Result<u16, PortExhausted> {
    let end = base.saturating_add(PORT_SCAN_RANGE);
    for port in base..end {
        if TcpListener::bind(("0.0.0.0", port)).is_ok() {
            debug!(port, "allocated host port");
            return Ok(port);
        }
    }
    Err(PortExhausted { start: base, end })
}
