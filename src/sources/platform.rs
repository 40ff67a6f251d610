//! Link details sysinfo does not expose: hardware type, operational state, default gateways
//! and resolvers. Linux reads sysfs and procfs, Windows scrapes `ipconfig /all`, macOS asks
//! `networksetup`, `route` and `scutil`. Every lookup is best-effort; a tool that is missing
//! or slow just leaves the fields empty.

use super::interfaces::kind_from_name;
use super::InterfaceKind;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

/// ARPHRD codes from `/sys/class/net/<if>/type`.
const ARPHRD_ETHER: u32 = 1;
const ARPHRD_TUNNEL: u32 = 768;
const ARPHRD_SIT: u32 = 776;
const ARPHRD_LOOPBACK: u32 = 772;
const ARPHRD_NONE: u32 = 65534;

/// Whatever the platform could tell about one link. `None` fields fall back to inference
/// from the interface name and addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDetails {
    pub kind: Option<InterfaceKind>,
    pub up: Option<bool>,
    pub speed_bps: Option<u64>,
    pub description: Option<String>,
    pub gateways: Vec<Ipv4Addr>,
    pub dns_servers: Vec<Ipv4Addr>,
}

/// One snapshot's worth of platform details, keyed by interface name.
#[derive(Debug, Default)]
pub struct PlatformDetails {
    links: HashMap<String, LinkDetails>,
    shared_dns: Vec<Ipv4Addr>,
}

impl PlatformDetails {
    #[cfg(target_os = "linux")]
    pub fn load(_command_timeout: Duration) -> Self {
        let links = std::fs::read_to_string("/proc/net/route")
            .map(|t| parse_route_table(&t))
            .unwrap_or_default()
            .into_iter()
            .map(|(name, gateways)| {
                let details = LinkDetails {
                    gateways,
                    ..Default::default()
                };
                (name, details)
            })
            .collect();
        Self {
            links,
            shared_dns: std::fs::read_to_string("/etc/resolv.conf")
                .map(|t| parse_resolv_conf(&t))
                .unwrap_or_default(),
        }
    }

    #[cfg(target_os = "windows")]
    pub fn load(command_timeout: Duration) -> Self {
        Self {
            links: super::run_command("ipconfig", &["/all"], command_timeout)
                .map(|out| parse_ipconfig(&out))
                .unwrap_or_default(),
            shared_dns: Vec::new(),
        }
    }

    #[cfg(target_os = "macos")]
    pub fn load(command_timeout: Duration) -> Self {
        use super::run_command;

        let mut links: HashMap<String, LinkDetails> =
            run_command("networksetup", &["-listallhardwareports"], command_timeout)
                .map(|out| parse_hardware_ports(&out))
                .unwrap_or_default()
                .into_iter()
                .map(|(device, port)| {
                    let details = LinkDetails {
                        kind: Some(kind_from_hardware_port(&port)),
                        description: Some(format!("{port} ({device})")),
                        ..Default::default()
                    };
                    (device, details)
                })
                .collect();
        let default_route = run_command("route", &["-n", "get", "default"], command_timeout)
            .and_then(|out| parse_route_get(&out));
        if let Some((device, gw)) = default_route {
            links.entry(device).or_default().gateways.push(gw);
        }
        Self {
            links,
            shared_dns: run_command("scutil", &["--dns"], command_timeout)
                .map(|out| parse_scutil_dns(&out))
                .unwrap_or_default(),
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    pub fn load(_command_timeout: Duration) -> Self {
        Self::default()
    }

    /// Details for `name`. On Linux the sysfs attributes are read on demand.
    pub fn link(&self, name: &str) -> LinkDetails {
        let known = self.links.get(name).cloned().unwrap_or_default();
        #[cfg(target_os = "linux")]
        {
            read_sysfs_link(name, known)
        }
        #[cfg(not(target_os = "linux"))]
        {
            known
        }
    }

    /// Adapter-specific resolvers when the platform reports them, the system list otherwise.
    pub fn dns_for(&self, link: &LinkDetails) -> Vec<Ipv4Addr> {
        if link.dns_servers.is_empty() {
            self.shared_dns.clone()
        } else {
            link.dns_servers.clone()
        }
    }
}

#[cfg(target_os = "linux")]
fn read_sysfs_link(name: &str, mut details: LinkDetails) -> LinkDetails {
    let base = std::path::Path::new("/sys/class/net").join(name);
    let read = |file: &str| {
        std::fs::read_to_string(base.join(file))
            .ok()
            .map(|s| s.trim().to_string())
    };
    let Some(type_code) = read("type").and_then(|t| t.parse::<u32>().ok()) else {
        return details;
    };
    let wireless = base.join("wireless").exists() || base.join("phy80211").exists();
    let has_device = base.join("device").exists() && !base.join("bridge").exists();
    let carrier = read("carrier").as_deref() == Some("1");

    details.kind = Some(kind_from_link_type(type_code, wireless, has_device, name));
    details.up = Some(is_oper_up(read("operstate").as_deref().unwrap_or(""), carrier));
    details.speed_bps = read("speed").as_deref().and_then(parse_speed_mbps);
    details.description = std::fs::read_link(base.join("device/driver"))
        .ok()
        .and_then(|p| p.file_name().map(|f| format!("{} ({})", name, f.to_string_lossy())));
    details
}

/// Hardware type from the sysfs link type. Ethernet-framed links without a backing device
/// (bridges, veth pairs, macvlans, dummies) are software and count as `Other`.
pub fn kind_from_link_type(
    type_code: u32,
    wireless: bool,
    has_device: bool,
    name: &str,
) -> InterfaceKind {
    match type_code {
        ARPHRD_LOOPBACK => InterfaceKind::Loopback,
        ARPHRD_ETHER if wireless => InterfaceKind::Wireless,
        ARPHRD_ETHER if !has_device => InterfaceKind::Other,
        ARPHRD_ETHER if kind_from_name(name) == InterfaceKind::Wireless => InterfaceKind::Wireless,
        ARPHRD_ETHER => InterfaceKind::Ethernet,
        ARPHRD_TUNNEL | ARPHRD_SIT | ARPHRD_NONE => InterfaceKind::Tunnel,
        _ => InterfaceKind::Other,
    }
}

/// `operstate` is "unknown" for some drivers that never report it; fall back to carrier.
pub fn is_oper_up(operstate: &str, carrier: bool) -> bool {
    match operstate {
        "up" => true,
        "unknown" => carrier,
        _ => false,
    }
}

/// `/sys/class/net/<if>/speed` is in Mbit/s and reads -1 (or fails) without a link.
pub fn parse_speed_mbps(s: &str) -> Option<u64> {
    let mbps = s.trim().parse::<i64>().ok()?;
    if mbps > 0 {
        Some(mbps as u64 * 1_000_000)
    } else {
        None
    }
}

/// Default-route gateways per interface from `/proc/net/route`.
pub fn parse_route_table(text: &str) -> HashMap<String, Vec<Ipv4Addr>> {
    let mut out: HashMap<String, Vec<Ipv4Addr>> = HashMap::new();
    for line in text.lines().skip(1) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 || cols[1] != "00000000" {
            continue;
        }
        let Ok(raw) = u32::from_str_radix(cols[2], 16) else {
            continue;
        };
        if raw == 0 {
            continue;
        }
        // Hex column is the address in host (little-endian) byte order.
        let gw = Ipv4Addr::from(raw.to_le_bytes());
        let entry = out.entry(cols[0].to_string()).or_default();
        if !entry.contains(&gw) {
            entry.push(gw);
        }
    }
    out
}

/// IPv4 `nameserver` entries from resolv.conf.
pub fn parse_resolv_conf(text: &str) -> Vec<Ipv4Addr> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('#') && !l.starts_with(';'))
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("nameserver"), Some(addr)) => addr.parse::<Ipv4Addr>().ok(),
                _ => None,
            }
        })
        .collect()
}

/// Leading IPv4 of an ipconfig value such as `192.168.1.23(Preferred)`.
fn leading_ipv4(value: &str) -> Option<Ipv4Addr> {
    value
        .trim()
        .split(['(', '%', ' '])
        .next()
        .and_then(|v| v.parse().ok())
}

fn push_unique(list: &mut Vec<Ipv4Addr>, addr: Option<Ipv4Addr>) {
    if let Some(addr) = addr {
        if !list.contains(&addr) {
            list.push(addr);
        }
    }
}

/// `ipconfig /all`, keyed by the connection name from each `... adapter <name>:` header,
/// which is the name sysinfo reports. Multi-valued fields continue on deeper-indented lines.
pub fn parse_ipconfig(text: &str) -> HashMap<String, LinkDetails> {
    const CONTINUATION_INDENT: usize = 8;

    let mut out = HashMap::new();
    let mut current: Option<(String, LinkDetails)> = None;
    let mut last_key = String::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        if indent == 0 {
            if let Some((name, details)) = current.take() {
                out.insert(name, details);
            }
            last_key.clear();
            let Some((kind_part, name)) = line
                .strip_suffix(':')
                .and_then(|header| header.split_once(" adapter "))
            else {
                continue;
            };
            let kind = if kind_part.contains("Wireless") {
                InterfaceKind::Wireless
            } else if kind_part.contains("Ethernet") {
                InterfaceKind::Ethernet
            } else if kind_part.contains("Tunnel") {
                InterfaceKind::Tunnel
            } else {
                InterfaceKind::Other
            };
            let details = LinkDetails {
                kind: Some(kind),
                ..Default::default()
            };
            current = Some((name.trim().to_string(), details));
            continue;
        }

        let Some((_, details)) = current.as_mut() else {
            continue;
        };

        let (key, value) = if indent > CONTINUATION_INDENT {
            (last_key.as_str(), line.trim())
        } else {
            let Some((key, value)) = line
                .split_once(" : ")
                .or_else(|| line.strip_suffix(" :").map(|k| (k, "")))
            else {
                continue;
            };
            last_key = key.trim().trim_end_matches(['.', ' ']).to_string();
            (last_key.as_str(), value.trim())
        };

        match key {
            "Description" => details.description = Some(value.to_string()),
            "Media State" => {
                if value.eq_ignore_ascii_case("Media disconnected") {
                    details.up = Some(false);
                }
            }
            "Default Gateway" => push_unique(&mut details.gateways, leading_ipv4(value)),
            "DNS Servers" => push_unique(&mut details.dns_servers, leading_ipv4(value)),
            _ => {}
        }
    }
    if let Some((name, details)) = current {
        out.insert(name, details);
    }
    out
}

/// `networksetup -listallhardwareports`: device name to hardware port name.
pub fn parse_hardware_ports(text: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut port: Option<&str> = None;
    for line in text.lines().map(str::trim) {
        if let Some(p) = line.strip_prefix("Hardware Port:") {
            port = Some(p.trim());
        } else if let Some(device) = line.strip_prefix("Device:") {
            if let Some(p) = port.take() {
                out.insert(device.trim().to_string(), p.to_string());
            }
        }
    }
    out
}

pub fn kind_from_hardware_port(port: &str) -> InterfaceKind {
    let p = port.to_lowercase();
    if p.contains("wi-fi") || p.contains("airport") {
        InterfaceKind::Wireless
    } else if p.contains("bridge") {
        InterfaceKind::Other
    } else if p.contains("ethernet") || p.contains("lan") {
        InterfaceKind::Ethernet
    } else {
        InterfaceKind::Other
    }
}

/// `route -n get default`: the interface carrying the default route and its gateway.
pub fn parse_route_get(text: &str) -> Option<(String, Ipv4Addr)> {
    let field = |name: &str| {
        text.lines()
            .filter_map(|l| l.trim().split_once(':'))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim().to_string())
    };
    let gateway = field("gateway")?.parse().ok()?;
    let interface = field("interface")?;
    Some((interface, gateway))
}

/// `scutil --dns`: IPv4 resolvers across all resolver blocks, first occurrence order.
pub fn parse_scutil_dns(text: &str) -> Vec<Ipv4Addr> {
    let mut out = Vec::new();
    for line in text.lines().map(str::trim) {
        if !line.starts_with("nameserver[") {
            continue;
        }
        let addr = line.split_once(':').and_then(|(_, v)| v.trim().parse().ok());
        push_unique(&mut out, addr);
    }
    out
}
