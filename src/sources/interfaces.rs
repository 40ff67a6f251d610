//! Interface enumeration via sysinfo, enriched with the link details each platform exposes
//! (see [`super::platform`]). Fields the platform cannot supply are inferred from the name
//! and addresses.

use super::platform::PlatformDetails;
use super::{InterfaceDescriptor, InterfaceKind, InterfaceSource, OperState};
use crate::error::MonitorError;
use std::net::IpAddr;
use std::time::Duration;
use sysinfo::Networks;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct SystemInterfaceSource {
    command_timeout: Duration,
}

impl Default for SystemInterfaceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInterfaceSource {
    pub fn new() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Bound for each platform tool run while enriching a snapshot.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

impl InterfaceSource for SystemInterfaceSource {
    fn snapshot(&self) -> Result<Vec<InterfaceDescriptor>, MonitorError> {
        let networks = Networks::new_with_refreshed_list();
        let platform = PlatformDetails::load(self.command_timeout);

        let mut out = Vec::new();
        for (name, data) in networks.iter() {
            let mac = data.mac_address();
            let addresses: Vec<IpAddr> = data.ip_networks().iter().map(|n| n.addr).collect();
            let link = platform.link(name);
            let state = match link.up {
                Some(true) => OperState::Up,
                Some(false) => OperState::Down,
                None if addresses.iter().any(|a| !a.is_loopback()) => OperState::Up,
                None => OperState::Down,
            };
            out.push(InterfaceDescriptor {
                id: name.clone(),
                name: name.clone(),
                description: link.description.clone().unwrap_or_else(|| name.clone()),
                kind: link.kind.unwrap_or_else(|| kind_from_name(name)),
                mac: if mac.is_unspecified() {
                    None
                } else {
                    Some(format_mac(&mac.0))
                },
                state,
                speed_bps: link.speed_bps,
                addresses,
                gateways: link.gateways.iter().copied().map(IpAddr::V4).collect(),
                dns_servers: platform.dns_for(&link).into_iter().map(IpAddr::V4).collect(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
            });
        }
        // sysinfo keeps interfaces in a hash map; a stable order keeps speed ties stable.
        out.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(count = out.len(), "interfaces enumerated");
        Ok(out)
    }
}

/// Hardware address as dash-separated upper-case hex pairs (`3C-58-C2-12-34-56`).
pub fn format_mac(octets: &[u8; 6]) -> String {
    octets
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join("-")
}

/// Best guess at the hardware type from the interface name alone.
pub fn kind_from_name(name: &str) -> InterfaceKind {
    let n = name.to_lowercase();
    if n == "lo" || n.starts_with("lo0") || n.contains("loopback") {
        InterfaceKind::Loopback
    } else if n.starts_with("wl")
        || n.contains("wi-fi")
        || n.contains("wireless")
        || n.contains("wlan")
    {
        InterfaceKind::Wireless
    } else if n.starts_with("tun")
        || n.starts_with("utun")
        || n.starts_with("wg")
        || n.starts_with("ipsec")
    {
        InterfaceKind::Tunnel
    } else if n.starts_with("en") || n.starts_with("eth") || n.contains("ethernet") {
        InterfaceKind::Ethernet
    } else {
        InterfaceKind::Other
    }
}
