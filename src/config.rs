//! Monitor configuration. Defaults reproduce the fixed constants of the dashboard;
//! a JSON file may override any section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Pause between the end of one render and the start of the next cycle
    pub refresh_interval_ms: u64,
    /// Pause after a failed cycle before retrying
    pub error_pause_ms: u64,
    /// Connectivity probe target and cadence
    pub probe: ProbeConfig,
    /// Public address lookup
    pub public_ip: PublicIpConfig,
    /// Platform tools consulted while enumerating interfaces
    pub interfaces: InterfacesConfig,
    /// Wireless metadata query
    pub wireless: WirelessConfig,
    /// Adapter selection heuristics
    pub selector: SelectorConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub host: String,
    /// Echo requests per cycle
    pub count: u32,
    pub attempt_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicIpConfig {
    /// Address-echo endpoint returning the caller's address as plain text
    pub endpoint: String,
    /// Overall HTTP client timeout
    pub client_timeout_ms: u64,
    /// How long a cycle waits for the lookup before giving up on it
    pub wait_budget_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfacesConfig {
    /// Bound on each of `ipconfig`, `networksetup`, `route` and `scutil`
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WirelessConfig {
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Case-insensitive substrings of "name description" that mark an adapter as virtual
    pub deny_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
    /// Log destination; stderr when unset (stdout belongs to the dashboard)
    pub file: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 500,
            error_pause_ms: 1000,
            probe: ProbeConfig::default(),
            public_ip: PublicIpConfig::default(),
            interfaces: InterfacesConfig::default(),
            wireless: WirelessConfig::default(),
            selector: SelectorConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "8.8.8.8".to_string(),
            count: 2,
            attempt_timeout_ms: 1000,
        }
    }
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.ipify.org".to_string(),
            client_timeout_ms: 3000,
            wait_budget_ms: 2500,
        }
    }
}

impl Default for InterfacesConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2000,
        }
    }
}

impl Default for WirelessConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2000,
        }
    }
}

pub const DEFAULT_DENY_LIST: &[&str] = &[
    "vmware",
    "vmnet",
    "virtualbox",
    "vbox",
    "tap",
    "loopback",
    "hyper-v",
    "virtual",
    "vpn",
    "tunnel",
    "pseudo",
];

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
            json: false,
            file: None,
        }
    }
}

impl MonitorConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<MonitorConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Config named by `NETSTATS_CONFIG`, or defaults when the variable is unset
    pub fn from_env() -> Self {
        match std::env::var_os("NETSTATS_CONFIG") {
            Some(path) => Self::load(std::path::Path::new(&path)),
            None => Self::default(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn error_pause(&self) -> Duration {
        Duration::from_millis(self.error_pause_ms)
    }
}
