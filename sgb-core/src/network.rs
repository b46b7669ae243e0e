//! Local address discovery

use crate::error::{CoreError, Result};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Unroutable probe target; connecting a UDP socket sends nothing but makes the
/// OS pick the outbound interface.
const PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(10, 254, 254, 254), 9);

/// Resolve the IPv4 address of the interface the machine would use for LAN traffic
pub fn first_local_ipv4() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_TARGET).map_err(|e| {
        tracing::debug!("Local address probe failed: {}", e);
        CoreError::NoLocalAddress
    })?;

    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        _ => Err(CoreError::NoLocalAddress),
    }
}
