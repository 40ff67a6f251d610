//! Data sources: interface enumeration, connectivity probe, public address, wireless metadata.
//! Each sits behind a narrow trait so the monitor can be driven by fakes; the platform
//! implementations are best-effort and degrade to "unavailable" rather than failing.

mod command;
pub mod interfaces;
pub mod platform;
pub mod probe;
pub mod public_ip;
pub mod wireless;

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

pub use command::run_command;
pub use interfaces::SystemInterfaceSource;
pub use probe::{ConnectivityProbe, EchoSender, ProbeResult, SystemPing};
pub use public_ip::{HttpAddressFetch, PublicAddressFetch, PublicAddressResolver};
pub use wireless::{CommandWirelessSource, WirelessInfo, WirelessSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Ethernet,
    Wireless,
    Loopback,
    Tunnel,
    Other,
}

impl InterfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            InterfaceKind::Ethernet => "Ethernet",
            InterfaceKind::Wireless => "Wireless",
            InterfaceKind::Loopback => "Loopback",
            InterfaceKind::Tunnel => "Tunnel",
            InterfaceKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperState {
    Up,
    Down,
}

/// One adapter as seen at a sampling instant. Rebuilt on every snapshot, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// Stable id used to re-find the same adapter in later snapshots
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: InterfaceKind,
    /// Hardware address, `None` when absent or all-zero
    pub mac: Option<String>,
    pub state: OperState,
    /// Nominal link speed in bits per second, if the platform reports one
    pub speed_bps: Option<u64>,
    pub addresses: Vec<IpAddr>,
    pub gateways: Vec<IpAddr>,
    pub dns_servers: Vec<IpAddr>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl InterfaceDescriptor {
    pub fn is_up(&self) -> bool {
        self.state == OperState::Up
    }

    pub fn ipv4_addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        ipv4_only(&self.addresses)
    }

    /// True when the adapter carries an IPv4 address outside 127/8 and 169.254/16
    pub fn has_routable_ipv4(&self) -> bool {
        self.ipv4_addresses()
            .any(|a| !a.is_loopback() && !a.is_link_local())
    }

    pub fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4_addresses().next()
    }

    pub fn first_ipv4_gateway(&self) -> Option<Ipv4Addr> {
        ipv4_only(&self.gateways).next()
    }

    pub fn ipv4_dns_servers(&self) -> Vec<Ipv4Addr> {
        ipv4_only(&self.dns_servers).collect()
    }

    /// Description, falling back to the name when the platform has none
    pub fn display_name(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.name
        } else {
            &self.description
        }
    }
}

fn ipv4_only(addrs: &[IpAddr]) -> impl Iterator<Item = Ipv4Addr> + '_ {
    addrs.iter().filter_map(|a| match a {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(_) => None,
    })
}

/// Enumerates the adapters currently known to the OS.
pub trait InterfaceSource {
    fn snapshot(&self) -> Result<Vec<InterfaceDescriptor>, MonitorError>;
}
