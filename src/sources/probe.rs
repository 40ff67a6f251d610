//! Connectivity probe: repeated echo requests aggregated into average RTT and loss.

use super::run_command;
use crate::error::MonitorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Sends a single echo request and reports its round-trip time.
pub trait EchoSender {
    fn send(&self, host: &str, timeout: Duration) -> Result<Duration, MonitorError>;
}

impl<T: EchoSender + ?Sized> EchoSender for Box<T> {
    fn send(&self, host: &str, timeout: Duration) -> Result<Duration, MonitorError> {
        (**self).send(host, timeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Mean RTT over successful replies; `None` when nothing came back
    pub avg_rtt_ms: Option<u64>,
    /// floor(100 * lost / count)
    pub loss_percent: u8,
}

impl ProbeResult {
    pub fn unreachable() -> Self {
        Self {
            avg_rtt_ms: None,
            loss_percent: 100,
        }
    }

    pub fn has_connectivity(&self) -> bool {
        self.avg_rtt_ms.is_some() && self.loss_percent < 100
    }

    /// Fold per-attempt outcomes. Zero attempts counts as total loss.
    pub fn from_attempts(attempts: &[Option<Duration>]) -> Self {
        let count = attempts.len() as u64;
        if count == 0 {
            return Self::unreachable();
        }
        let replies: Vec<u64> = attempts
            .iter()
            .flatten()
            .map(|d| d.as_millis() as u64)
            .collect();
        let lost = count - replies.len() as u64;
        let avg_rtt_ms = if replies.is_empty() {
            None
        } else {
            Some(replies.iter().sum::<u64>() / replies.len() as u64)
        };
        Self {
            avg_rtt_ms,
            loss_percent: (100 * lost / count) as u8,
        }
    }
}

pub struct ConnectivityProbe<S> {
    sender: S,
}

impl<S: EchoSender> ConnectivityProbe<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    /// Send `count` sequential requests; each failure counts as lost and is not surfaced.
    pub fn probe(&self, host: &str, count: u32, attempt_timeout: Duration) -> ProbeResult {
        let attempts: Vec<Option<Duration>> = (0..count)
            .map(|_| match self.sender.send(host, attempt_timeout) {
                Ok(rtt) => Some(rtt),
                Err(e) => {
                    tracing::debug!(host, error = %e, "echo attempt lost");
                    None
                }
            })
            .collect();
        ProbeResult::from_attempts(&attempts)
    }
}

/// One echo request through the system `ping` binary (no raw-socket privileges needed).
#[derive(Debug, Default)]
pub struct SystemPing;

impl SystemPing {
    fn args(host: &str, timeout: Duration) -> Vec<String> {
        let ms = timeout.as_millis().max(1);
        if cfg!(target_os = "windows") {
            vec!["-n".into(), "1".into(), "-w".into(), ms.to_string(), host.into()]
        } else if cfg!(target_os = "macos") {
            vec!["-c".into(), "1".into(), "-W".into(), ms.to_string(), host.into()]
        } else {
            let secs = ms.div_ceil(1000);
            vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), host.into()]
        }
    }
}

impl EchoSender for SystemPing {
    fn send(&self, host: &str, timeout: Duration) -> Result<Duration, MonitorError> {
        let args = Self::args(host, timeout);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        // Give the process a little room beyond its own reply timeout to start and exit.
        let out = run_command("ping", &args, timeout + Duration::from_millis(500)).ok_or_else(
            || MonitorError::Command {
                program: "ping".to_string(),
            },
        )?;
        parse_ping_rtt(&out).ok_or(MonitorError::ProbeOutput)
    }
}

fn rtt_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)time\s*[=<]\s*([0-9]+(?:[.,][0-9]+)?)\s*ms").unwrap())
}

/// Extract the reply RTT from ping output (`time=12.3 ms`, `time<1ms`).
pub fn parse_ping_rtt(output: &str) -> Option<Duration> {
    let caps = rtt_regex().captures(output)?;
    let ms: f64 = caps[1].replace(',', ".").parse().ok()?;
    Some(Duration::from_micros((ms * 1000.0).round() as u64))
}
