//! Sampling loop: select adapter, read it, probe, compute rates, render, repeat.
//!
//! Every step of a cycle runs in order on the calling thread. Only the public address
//! lookup runs off-thread, and the cycle waits for it no longer than its budget.

use crate::config::MonitorConfig;
use crate::display::{Dashboard, Screen};
use crate::error::MonitorError;
use crate::sampling::{CycleState, DirectionLabels, Sample};
use crate::selector::AdapterSelector;
use crate::sources::{
    ConnectivityProbe, EchoSender, InterfaceKind, InterfaceSource, PublicAddressResolver,
    WirelessSource,
};
use chrono::{DateTime, Local, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Initializing,
    Sampling,
    ShuttingDown,
}

/// The collaborators a monitor reads from.
pub struct Sources {
    pub interfaces: Box<dyn InterfaceSource>,
    pub probe: ConnectivityProbe<Box<dyn EchoSender>>,
    pub public_ip: PublicAddressResolver,
    pub wireless: Box<dyn WirelessSource>,
}

type Clock = Box<dyn FnMut() -> DateTime<Utc>>;

pub struct Monitor {
    config: MonitorConfig,
    sources: Sources,
    selector: AdapterSelector,
    cycle: Option<CycleState>,
    state: MonitorState,
    clock: Clock,
}

impl Monitor {
    pub fn new(config: MonitorConfig, sources: Sources) -> Self {
        let selector = AdapterSelector::new(&config.selector);
        Self {
            config,
            sources,
            selector,
            cycle: None,
            state: MonitorState::Initializing,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the wall clock used to timestamp samples.
    pub fn with_clock(mut self, clock: impl FnMut() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn cycle_state(&self) -> Option<&CycleState> {
        self.cycle.as_ref()
    }

    pub fn selector(&self) -> &AdapterSelector {
        &self.selector
    }

    /// Seed the counters from the current best adapter (zeros when there is none).
    pub fn initialize(&mut self) {
        let chosen = self.selector.select(self.sources.interfaces.as_ref());
        let (rx_bytes, tx_bytes) = chosen
            .as_ref()
            .map(|d| (d.rx_bytes, d.tx_bytes))
            .unwrap_or((0, 0));
        let at = (self.clock)();
        self.cycle = Some(CycleState::new(Sample {
            rx_bytes,
            tx_bytes,
            at,
        }));
        self.state = MonitorState::Sampling;
        info!(adapter = ?chosen.map(|d| d.id), "monitor initialized");
    }

    /// One sampling pass. Source failures are absorbed into "unavailable" fields.
    pub fn run_cycle(&mut self) -> Result<Dashboard, MonitorError> {
        let snapshot = match self.sources.interfaces.snapshot() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "interface snapshot failed");
                Vec::new()
            }
        };
        let chosen = self.selector.select_from(&snapshot);
        // The pick may be a cached one from an earlier cycle; read live fields by id.
        let current = chosen
            .as_ref()
            .and_then(|c| snapshot.iter().find(|d| d.id == c.id));

        let public_ip = self.sources.public_ip.resolve();
        let probe = self.sources.probe.probe(
            &self.config.probe.host,
            self.config.probe.count,
            Duration::from_millis(self.config.probe.attempt_timeout_ms),
        );

        let (rx_bytes, tx_bytes) = current.map(|d| (d.rx_bytes, d.tx_bytes)).unwrap_or((0, 0));
        let now = (self.clock)();
        let sample = Sample {
            rx_bytes,
            tx_bytes,
            at: now,
        };
        let rates = self
            .cycle
            .get_or_insert_with(|| CycleState::new(sample))
            .advance(sample);

        let kind = chosen.as_ref().map(|d| d.kind);
        let wireless =
            (kind == Some(InterfaceKind::Wireless)).then(|| self.sources.wireless.query());

        debug!(
            adapter = ?chosen.as_ref().map(|d| &d.id),
            rx_mbps = rates.rx_mbps,
            tx_mbps = rates.tx_mbps,
            rtt_ms = ?probe.avg_rtt_ms,
            loss = probe.loss_percent,
            "cycle sampled"
        );

        Ok(Dashboard {
            clock: now.with_timezone(&Local).format("%H:%M:%S").to_string(),
            adapter: chosen.as_ref().map(|d| d.display_name().to_string()),
            kind,
            connected: current.map(|d| d.is_up()).unwrap_or(false),
            online: probe.has_connectivity(),
            ipv4: current.and_then(|d| d.first_ipv4()),
            gateway: current.and_then(|d| d.first_ipv4_gateway()),
            dns: current.map(|d| d.ipv4_dns_servers()).unwrap_or_default(),
            mac: current.and_then(|d| d.mac.clone()),
            public_ip,
            wireless,
            probe,
            rx_total_bytes: rx_bytes,
            tx_total_bytes: tx_bytes,
            rates,
            labels: DirectionLabels::classify(&rates),
        })
    }

    /// Run a cycle and paint it; a panic anywhere in the cycle becomes an error.
    pub fn step(&mut self, screen: &mut dyn Screen) -> Result<(), MonitorError> {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let dashboard = self.run_cycle()?;
            screen.render(&dashboard)
        }));
        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(MonitorError::Panicked { message })
            }
        }
    }

    /// Loop until `stop` is set. The flag is checked between cycles only.
    pub fn run(&mut self, screen: &mut dyn Screen, stop: &AtomicBool) {
        if let Err(e) = screen.start() {
            warn!(error = %e, "terminal setup failed");
        }
        self.initialize();

        let mut cycle: u64 = 0;
        while !stop.load(Ordering::Relaxed) {
            cycle += 1;
            match self.step(screen) {
                Ok(()) => std::thread::sleep(self.config.refresh_interval()),
                Err(e) => {
                    warn!(cycle, error = %e, "cycle failed");
                    if let Err(e) = screen.render_error(&e.to_string()) {
                        warn!(error = %e, "error notice could not be shown");
                    }
                    std::thread::sleep(self.config.error_pause());
                }
            }
        }

        self.state = MonitorState::ShuttingDown;
        info!(cycles = cycle, "monitor stopping");
        if let Err(e) = screen.shutdown() {
            warn!(error = %e, "terminal restore failed");
        }
    }
}
