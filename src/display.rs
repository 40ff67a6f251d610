//! Dashboard view model and its terminal rendering.
//!
//! [`Dashboard`] is laid out as styled text lines first, so the layout can be checked
//! without a terminal; [`TerminalScreen`] only maps tones to colors and paints.

use crate::error::MonitorError;
use crate::sampling::{DirectionLabels, Rates, BYTES_PER_MB};
use crate::sources::{InterfaceKind, ProbeResult, WirelessInfo};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType, SetSize, SetTitle};
use crossterm::{execute, queue};
use serde::Serialize;
use std::io::Write;
use std::net::Ipv4Addr;

pub const TITLE: &str = "Network Stats Tool";
pub const NOT_AVAILABLE: &str = "N/A";
/// Window size requested at start-up; terminals that refuse keep their size.
pub const WINDOW_COLUMNS: u16 = 50;
pub const WINDOW_ROWS: u16 = 19;
/// Rates under this are not worth showing (also hides negative rates after a counter reset)
pub const RATE_VISIBLE_MBPS: f64 = 0.05;

const HEAVY_RULE: &str = "======================================";
const LIGHT_RULE: &str = "--------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Title,
    Rule,
    Label,
    Value,
    Address,
    Hardware,
    Public,
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tone: Tone,
    pub text: String,
}

pub type Line = Vec<Segment>;

fn seg(tone: Tone, text: impl Into<String>) -> Segment {
    Segment {
        tone,
        text: text.into(),
    }
}

fn field(label: &str, value: impl Into<String>, tone: Tone) -> Line {
    vec![seg(Tone::Label, format!("{label:<10}: ")), seg(tone, value)]
}

fn or_na<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Everything one cycle shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Local wall-clock time, HH:MM:SS
    pub clock: String,
    pub adapter: Option<String>,
    pub kind: Option<InterfaceKind>,
    pub connected: bool,
    pub online: bool,
    pub ipv4: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    pub dns: Vec<Ipv4Addr>,
    pub mac: Option<String>,
    pub public_ip: Option<String>,
    /// Present only for wireless adapters
    pub wireless: Option<WirelessInfo>,
    pub probe: ProbeResult,
    pub rx_total_bytes: u64,
    pub tx_total_bytes: u64,
    pub rates: Rates,
    pub labels: DirectionLabels,
}

pub fn loss_tone(loss_percent: u8) -> Tone {
    match loss_percent {
        0 => Tone::Good,
        1..=9 => Tone::Warn,
        _ => Tone::Bad,
    }
}

impl Dashboard {
    pub fn lines(&self) -> Vec<Line> {
        let mut out: Vec<Line> = vec![
            vec![seg(Tone::Title, format!("{TITLE}   {}", self.clock))],
            vec![seg(Tone::Rule, HEAVY_RULE)],
            field("Adapter", or_na(self.adapter.as_deref()), Tone::Value),
            field("Type", or_na(self.kind.map(|k| k.label())), Tone::Value),
        ];

        let (state, state_tone) = if self.connected {
            ("Connected", Tone::Good)
        } else {
            ("Disconnected", Tone::Bad)
        };
        out.push(field("State", state, state_tone));
        let (internet, internet_tone) = if self.online {
            ("Online", Tone::Good)
        } else {
            ("Offline", Tone::Bad)
        };
        out.push(field("Internet", internet, internet_tone));

        let dns = if self.dns.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.dns
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push(field("IP", or_na(self.ipv4), Tone::Address));
        out.push(field("Gateway", or_na(self.gateway), Tone::Address));
        out.push(field("DNS", dns, Tone::Address));
        out.push(field("MAC", or_na(self.mac.as_deref()), Tone::Hardware));
        out.push(field("Public IP", or_na(self.public_ip.as_deref()), Tone::Public));

        if let Some(w) = &self.wireless {
            out.push(field("SSID", or_na(w.ssid.as_deref()), Tone::Value));
            out.push(field("Signal", or_na(w.signal.as_deref()), Tone::Good));
        }

        out.push(vec![seg(Tone::Rule, HEAVY_RULE)]);
        out.push(vec![seg(Tone::Title, "Speed & Status:")]);
        out.push(vec![seg(Tone::Rule, "--------------")]);

        let ping = self
            .probe
            .avg_rtt_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        out.push(vec![
            seg(Tone::Label, "Ping         : "),
            seg(Tone::Good, ping),
            seg(Tone::Label, "      Packet Loss : "),
            seg(
                loss_tone(self.probe.loss_percent),
                format!("{}%", self.probe.loss_percent),
            ),
        ]);

        out.push(traffic_line(
            "Received     : ",
            self.rx_total_bytes,
            self.rates.rx_mbps,
            self.labels.download.then_some(" (Download)"),
            Tone::Good,
        ));
        out.push(traffic_line(
            "Sent         : ",
            self.tx_total_bytes,
            self.rates.tx_mbps,
            self.labels.upload.then_some(" (Upload)"),
            Tone::Warn,
        ));
        out.push(vec![seg(Tone::Rule, LIGHT_RULE)]);
        out
    }

    /// Plain text of the layout, one string per line
    pub fn text(&self) -> Vec<String> {
        self.lines()
            .iter()
            .map(|l| l.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }
}

fn traffic_line(label: &str, total: u64, rate: f64, tag: Option<&str>, rate_tone: Tone) -> Line {
    let mut line = vec![
        seg(Tone::Label, label),
        seg(Tone::Value, format!("{:.2} MB", total as f64 / BYTES_PER_MB)),
    ];
    if rate >= RATE_VISIBLE_MBPS {
        line.push(seg(
            rate_tone,
            format!("  ({rate:.2} MB/s){}", tag.unwrap_or("")),
        ));
    }
    line
}

/// Where dashboards get painted.
pub trait Screen {
    fn start(&mut self) -> Result<(), MonitorError>;
    fn render(&mut self, dashboard: &Dashboard) -> Result<(), MonitorError>;
    /// Replace the screen with a single error notice
    fn render_error(&mut self, message: &str) -> Result<(), MonitorError>;
    fn shutdown(&mut self) -> Result<(), MonitorError>;
}

pub struct TerminalScreen<W: Write> {
    out: W,
}

impl TerminalScreen<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn color(tone: Tone) -> Color {
        match tone {
            Tone::Title => Color::Cyan,
            Tone::Rule => Color::DarkGrey,
            Tone::Label => Color::Grey,
            Tone::Value => Color::White,
            Tone::Address => Color::Cyan,
            Tone::Hardware => Color::Yellow,
            Tone::Public => Color::Magenta,
            Tone::Good => Color::Green,
            Tone::Warn => Color::Yellow,
            Tone::Bad => Color::Red,
        }
    }

    fn paint(&mut self, lines: &[Line]) -> Result<(), MonitorError> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in lines {
            for s in line {
                queue!(
                    self.out,
                    SetForegroundColor(Self::color(s.tone)),
                    Print(&s.text)
                )?;
            }
            queue!(self.out, ResetColor, Print("\n"))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn start(&mut self) -> Result<(), MonitorError> {
        if let Err(e) = execute!(self.out, SetSize(WINDOW_COLUMNS, WINDOW_ROWS)) {
            tracing::debug!(error = %e, "terminal resize refused");
        }
        execute!(self.out, SetTitle(TITLE), Hide)?;
        Ok(())
    }

    fn render(&mut self, dashboard: &Dashboard) -> Result<(), MonitorError> {
        self.paint(&dashboard.lines())
    }

    fn render_error(&mut self, message: &str) -> Result<(), MonitorError> {
        self.paint(&[vec![seg(Tone::Bad, format!("Error: {message}"))]])
    }

    fn shutdown(&mut self) -> Result<(), MonitorError> {
        execute!(
            self.out,
            Show,
            ResetColor,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(format!("Exiting {TITLE}...\n"))
        )?;
        Ok(())
    }
}
