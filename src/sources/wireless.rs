//! Wireless metadata (SSID, signal) scraped from platform tools. A missing field is not an
//! error, it just stays `None`.

use super::run_command;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirelessInfo {
    pub ssid: Option<String>,
    /// Signal as the platform phrases it ("78%", "-54 dBm")
    pub signal: Option<String>,
}

pub trait WirelessSource {
    fn query(&self) -> WirelessInfo;
}

pub struct CommandWirelessSource {
    timeout: Duration,
}

impl CommandWirelessSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl WirelessSource for CommandWirelessSource {
    #[cfg(target_os = "windows")]
    fn query(&self) -> WirelessInfo {
        run_command("netsh", &["wlan", "show", "interfaces"], self.timeout)
            .map(|out| parse_netsh(&out))
            .unwrap_or_default()
    }

    #[cfg(target_os = "macos")]
    fn query(&self) -> WirelessInfo {
        const AIRPORT: &str = "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";
        run_command(AIRPORT, &["-I"], self.timeout)
            .map(|out| parse_airport(&out))
            .unwrap_or_default()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn query(&self) -> WirelessInfo {
        run_command(
            "nmcli",
            &["-t", "-f", "ACTIVE,SSID,SIGNAL", "dev", "wifi"],
            self.timeout,
        )
        .map(|out| parse_nmcli(&out))
        .unwrap_or_default()
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

cached_regex!(netsh_ssid_line, r"(?im)^\s*SSID\s*: (.+)$");
cached_regex!(netsh_ssid_token, r"(?i)SSID\s*: (\S+)");
cached_regex!(netsh_signal_line, r"(?im)^\s*Signal\s*: (.+)$");
cached_regex!(netsh_signal_percent, r"(?i)Signal\s*: (\d+)%");
cached_regex!(nmcli_active, r"^yes:(.*):(\d+)$");
cached_regex!(airport_ssid, r"(?m)^\s*SSID: (.+)$");
cached_regex!(airport_rssi, r"(?m)^\s*agrCtlRSSI: (-?\d+)\s*$");

/// `netsh wlan show interfaces`
pub fn parse_netsh(output: &str) -> WirelessInfo {
    let ssid = first_capture(netsh_ssid_line(), output)
        .or_else(|| first_capture(netsh_ssid_token(), output));
    let signal = first_capture(netsh_signal_line(), output).or_else(|| {
        first_capture(netsh_signal_percent(), output).map(|pct| format!("{pct}%"))
    });
    WirelessInfo { ssid, signal }
}

/// `nmcli -t -f ACTIVE,SSID,SIGNAL dev wifi`; colons inside the SSID arrive as `\:`.
pub fn parse_nmcli(output: &str) -> WirelessInfo {
    output
        .lines()
        .find_map(|line| {
            let caps = nmcli_active().captures(line.trim_end())?;
            let ssid = caps[1].replace("\\:", ":");
            Some(WirelessInfo {
                ssid: (!ssid.is_empty()).then_some(ssid),
                signal: Some(format!("{}%", &caps[2])),
            })
        })
        .unwrap_or_default()
}

/// `airport -I`
pub fn parse_airport(output: &str) -> WirelessInfo {
    WirelessInfo {
        ssid: first_capture(airport_ssid(), output),
        signal: first_capture(airport_rssi(), output).map(|rssi| format!("{rssi} dBm")),
    }
}
