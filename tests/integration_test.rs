//! Integration tests: adapter selection, rate computation, probe aggregation, bounded public
//! address wait, and full monitor cycles against in-memory sources.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use netstats_monitor::{
    config::{MonitorConfig, SelectorConfig},
    display::{Dashboard, Screen},
    error::MonitorError,
    monitor::{Monitor, MonitorState, Sources},
    sampling::{compute_rates, CycleState, DirectionLabels, Rates, Sample},
    selector::AdapterSelector,
    sources::{
        ConnectivityProbe, EchoSender, InterfaceDescriptor, InterfaceKind, InterfaceSource,
        platform::kind_from_link_type,
        run_command, OperState, ProbeResult, PublicAddressFetch, PublicAddressResolver,
        SystemInterfaceSource, WirelessInfo, WirelessSource,
    },
};
use std::cell::{Cell, RefCell};
use std::net::IpAddr;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const MB: u64 = 1_048_576;

fn adapter(
    id: &str,
    kind: InterfaceKind,
    up: bool,
    addrs: &[&str],
    speed: u64,
) -> InterfaceDescriptor {
    InterfaceDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        description: format!("{id} adapter"),
        kind,
        mac: Some("AA-BB-CC-DD-EE-FF".to_string()),
        state: if up { OperState::Up } else { OperState::Down },
        speed_bps: Some(speed),
        addresses: addrs.iter().map(|a| a.parse::<IpAddr>().unwrap()).collect(),
        gateways: vec!["192.168.1.1".parse().unwrap()],
        dns_servers: vec![
            "1.1.1.1".parse().unwrap(),
            "fe80::1".parse().unwrap(),
            "8.8.8.8".parse().unwrap(),
        ],
        rx_bytes: 0,
        tx_bytes: 0,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

// ── Fakes ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct FakeInterfaces(Rc<RefCell<Vec<InterfaceDescriptor>>>);

impl FakeInterfaces {
    fn set(&self, adapters: Vec<InterfaceDescriptor>) {
        *self.0.borrow_mut() = adapters;
    }

    fn counters(&self, id: &str, rx: u64, tx: u64) {
        for d in self.0.borrow_mut().iter_mut().filter(|d| d.id == id) {
            d.rx_bytes = rx;
            d.tx_bytes = tx;
        }
    }
}

impl InterfaceSource for FakeInterfaces {
    fn snapshot(&self) -> Result<Vec<InterfaceDescriptor>, MonitorError> {
        Ok(self.0.borrow().clone())
    }
}

struct FailingInterfaces;

impl InterfaceSource for FailingInterfaces {
    fn snapshot(&self) -> Result<Vec<InterfaceDescriptor>, MonitorError> {
        Err(MonitorError::Enumeration {
            reason: "gone".into(),
        })
    }
}

/// Panics on exactly one call (1-based), succeeds with no adapters otherwise
struct PanickingInterfaces {
    calls: Cell<u32>,
    panic_on_call: u32,
}

impl PanickingInterfaces {
    fn on_call(n: u32) -> Self {
        Self {
            calls: Cell::new(0),
            panic_on_call: n,
        }
    }
}

impl InterfaceSource for PanickingInterfaces {
    fn snapshot(&self) -> Result<Vec<InterfaceDescriptor>, MonitorError> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == self.panic_on_call {
            panic!("driver query exploded");
        }
        Ok(Vec::new())
    }
}

/// Replays RTTs in order; `None` entries are lost replies.
struct ScriptedEcho {
    replies: Vec<Option<u64>>,
    next: Cell<usize>,
}

impl ScriptedEcho {
    fn new(replies: &[Option<u64>]) -> Self {
        Self {
            replies: replies.to_vec(),
            next: Cell::new(0),
        }
    }
}

impl EchoSender for ScriptedEcho {
    fn send(&self, _host: &str, _timeout: Duration) -> Result<Duration, MonitorError> {
        let i = self.next.get();
        self.next.set(i + 1);
        match self.replies.get(i % self.replies.len()).copied().flatten() {
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Err(MonitorError::ProbeOutput),
        }
    }
}

struct FixedAddress(&'static str);

#[async_trait]
impl PublicAddressFetch for FixedAddress {
    async fn fetch(&self) -> Result<String, MonitorError> {
        Ok(self.0.to_string())
    }
}

struct NeverAnswers;

#[async_trait]
impl PublicAddressFetch for NeverAnswers {
    async fn fetch(&self) -> Result<String, MonitorError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("203.0.113.9".to_string())
    }
}

struct BrokenFetch;

#[async_trait]
impl PublicAddressFetch for BrokenFetch {
    async fn fetch(&self) -> Result<String, MonitorError> {
        Err(MonitorError::EmptyAddress)
    }
}

struct FakeWireless;

impl WirelessSource for FakeWireless {
    fn query(&self) -> WirelessInfo {
        WirelessInfo {
            ssid: Some("HomeNet".into()),
            signal: None,
        }
    }
}

#[derive(Default)]
struct RecordingScreen {
    started: bool,
    shut_down: bool,
    dashboards: Vec<Dashboard>,
    errors: Vec<String>,
    stop_after: Option<(usize, Arc<AtomicBool>)>,
}

impl RecordingScreen {
    fn check_stop(&self) {
        if let Some((n, flag)) = &self.stop_after {
            if self.dashboards.len() + self.errors.len() >= *n {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }
}

impl Screen for RecordingScreen {
    fn start(&mut self) -> Result<(), MonitorError> {
        self.started = true;
        Ok(())
    }

    fn render(&mut self, dashboard: &Dashboard) -> Result<(), MonitorError> {
        self.dashboards.push(dashboard.clone());
        self.check_stop();
        Ok(())
    }

    fn render_error(&mut self, message: &str) -> Result<(), MonitorError> {
        self.errors.push(message.to_string());
        self.check_stop();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), MonitorError> {
        self.shut_down = true;
        Ok(())
    }
}

fn fast_config() -> MonitorConfig {
    let mut c = MonitorConfig::default();
    c.refresh_interval_ms = 0;
    c.error_pause_ms = 0;
    c
}

fn sources(interfaces: Box<dyn InterfaceSource>, echo: &[Option<u64>]) -> Sources {
    Sources {
        interfaces,
        probe: ConnectivityProbe::new(Box::new(ScriptedEcho::new(echo)) as Box<dyn EchoSender>),
        public_ip: PublicAddressResolver::new(
            Arc::new(FixedAddress("203.0.113.7")),
            Duration::from_millis(500),
        )
        .unwrap(),
        wireless: Box::new(FakeWireless),
    }
}

/// Clock the test advances by hand
fn manual_clock() -> (Rc<Cell<DateTime<Utc>>>, impl FnMut() -> DateTime<Utc>) {
    let now = Rc::new(Cell::new(t0()));
    let handle = Rc::clone(&now);
    (now, move || handle.get())
}

// ── Config ───────────────────────────────────────────────────────────

#[test]
fn config_load_default() {
    let c = MonitorConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.refresh_interval_ms, 500);
    assert_eq!(c.probe.host, "8.8.8.8");
    assert_eq!(c.probe.count, 2);
    assert_eq!(c.public_ip.wait_budget_ms, 2500);
    assert_eq!(c.public_ip.client_timeout_ms, 3000);
    assert_eq!(c.interfaces.command_timeout_ms, 2000);
    assert_eq!(c.wireless.command_timeout_ms, 2000);
    assert_eq!(c.selector.deny_list.len(), 11);
}

#[test]
fn config_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("netstats.json");
    let json = r#"{"probe": {"host": "1.1.1.1"}, "refresh_interval_ms": 1000}"#;
    std::fs::write(&path, json).unwrap();
    let c = MonitorConfig::load(&path);
    assert_eq!(c.probe.host, "1.1.1.1");
    assert_eq!(c.probe.count, 2);
    assert_eq!(c.refresh_interval_ms, 1000);
    assert_eq!(c.error_pause_ms, 1000);
}

#[test]
fn config_invalid_file_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let c = MonitorConfig::load(&path);
    assert_eq!(c.refresh_interval_ms, 500);
}

// ── Adapter selection ────────────────────────────────────────────────

#[test]
fn selector_prefers_highest_speed_in_tier_one() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let slow = adapter("eth1", InterfaceKind::Ethernet, true, &["192.168.1.20"], 100);
    let fast = adapter("eth0", InterfaceKind::Ethernet, true, &["192.168.1.10"], 1000);
    let picked = s.select_from(&[slow, fast]).unwrap();
    assert_eq!(picked.id, "eth0");
}

#[test]
fn selector_tier_one_beats_faster_unaddressed_adapter() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let link_local = adapter("eth0", InterfaceKind::Ethernet, true, &["169.254.3.4"], 10_000);
    let wifi = adapter("wlan0", InterfaceKind::Wireless, true, &["10.0.0.5"], 300);
    assert_eq!(s.select_from(&[link_local, wifi]).unwrap().id, "wlan0");
}

#[test]
fn selector_falls_to_tier_two_without_routable_ipv4() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let a = adapter("eth0", InterfaceKind::Ethernet, true, &["169.254.3.4"], 100);
    let b = adapter("eth1", InterfaceKind::Ethernet, true, &["127.0.0.2", "fe80::1"], 1000);
    let down = adapter("eth2", InterfaceKind::Ethernet, false, &["192.168.1.9"], 10_000);
    assert_eq!(s.select_from(&[a, b, down]).unwrap().id, "eth1");
}

#[test]
fn selector_falls_to_tier_three_when_everything_is_down() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let a = adapter("eth0", InterfaceKind::Ethernet, false, &[], 100);
    let b = adapter("wlan0", InterfaceKind::Wireless, false, &[], 50);
    assert_eq!(s.select_from(&[a, b]).unwrap().id, "eth0");
}

#[test]
fn selector_skips_virtual_loopback_and_other_types() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let mut vm = adapter("eth9", InterfaceKind::Ethernet, true, &["192.168.56.1"], 10_000);
    vm.description = "VMware Virtual Ethernet Adapter".into();
    let vpn = adapter("OpenVPN Connect", InterfaceKind::Ethernet, true, &["10.8.0.2"], 10_000);
    let mut lo = adapter("lo", InterfaceKind::Loopback, true, &["10.1.1.1"], 10_000);
    lo.description = "plain".into();
    let tun = adapter("wg0", InterfaceKind::Tunnel, true, &["10.9.0.1"], 10_000);
    let other = adapter("ib0", InterfaceKind::Other, true, &["10.7.0.1"], 10_000);
    assert!(s.select_from(&[vm, vpn, lo, tun, other]).is_none());
    assert!(s.cached().is_none());
}

#[test]
fn selector_returns_cached_pick_when_nothing_qualifies() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let x = adapter("wlan0", InterfaceKind::Wireless, true, &["10.0.0.5"], 300);
    assert_eq!(s.select_from(&[x.clone()]).unwrap(), x);
    assert_eq!(s.select_from(&[]).unwrap(), x);
    assert_eq!(s.cached(), Some(&x));
}

#[test]
fn selector_enumeration_failure_keeps_cached_pick() {
    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let x = adapter("eth0", InterfaceKind::Ethernet, true, &["10.0.0.5"], 1000);
    s.select_from(&[x.clone()]);
    assert_eq!(s.select(&FailingInterfaces), Some(x));
}

#[test]
fn selector_deny_list_is_configurable() {
    let config = SelectorConfig {
        deny_list: vec!["DOCKER".into()],
    };
    let mut s = AdapterSelector::new(&config);
    let docker = adapter("docker0", InterfaceKind::Ethernet, true, &["172.17.0.1"], 10_000);
    let vbox = adapter("vboxnet0", InterfaceKind::Ethernet, true, &["192.168.56.1"], 1000);
    assert_eq!(s.select_from(&[docker, vbox]).unwrap().id, "vboxnet0");
}

#[test]
fn selector_ignores_bridges_whatever_the_enumeration_order() {
    let wifi_kind = kind_from_link_type(1, true, true, "wlp2s0");
    let bridge_kind = kind_from_link_type(1, false, false, "docker0");
    let mut wifi = adapter("wlp2s0", wifi_kind, true, &["192.168.1.23"], 0);
    let mut bridge = adapter("docker0", bridge_kind, true, &["172.17.0.1"], 0);
    wifi.speed_bps = None;
    bridge.speed_bps = None;

    let mut s = AdapterSelector::new(&SelectorConfig::default());
    let forward = s.select_from(&[wifi.clone(), bridge.clone()]).unwrap();
    let reversed = s.select_from(&[bridge, wifi]).unwrap();
    assert_eq!(forward.id, "wlp2s0");
    assert_eq!(reversed.id, "wlp2s0");
}

#[test]
fn system_snapshot_is_ordered_by_name() {
    let snapshot = SystemInterfaceSource::new()
        .with_command_timeout(Duration::from_millis(500))
        .snapshot()
        .unwrap();
    let names: Vec<&str> = snapshot.iter().map(|d| d.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

// ── Sampling ─────────────────────────────────────────────────────────

fn sample(rx: u64, tx: u64, ms: i64) -> Sample {
    Sample {
        rx_bytes: rx,
        tx_bytes: tx,
        at: t0() + chrono::Duration::milliseconds(ms),
    }
}

#[test]
fn rates_match_byte_delta_over_elapsed() {
    let r = compute_rates(&sample(1000, 500, 0), &sample(1000 + 3 * MB, 500 + MB / 2, 1500));
    assert!((r.rx_mbps - 2.0).abs() < 1e-9);
    assert!((r.tx_mbps - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn rates_floor_elapsed_at_one_millisecond() {
    let r = compute_rates(&sample(0, 0, 0), &sample(MB, 0, 0));
    assert!((r.rx_mbps - 1000.0).abs() < 1e-6);
    let backwards = compute_rates(&sample(0, 0, 10), &sample(MB, 0, 0));
    assert!((backwards.rx_mbps - 1000.0).abs() < 1e-6);
}

#[test]
fn rates_pass_counter_resets_through_as_negative() {
    let r = compute_rates(&sample(5 * MB, MB, 0), &sample(MB, MB, 1000));
    assert!((r.rx_mbps + 4.0).abs() < 1e-9);
    assert_eq!(r.tx_mbps, 0.0);
}

#[test]
fn cycle_state_two_cycles_yield_one_megabyte_per_second() {
    let mut state = CycleState::new(sample(MB, 0, 0));
    let r = state.advance(sample(2 * MB, 0, 1000));
    assert_eq!(format!("{:.2}", r.rx_mbps), "1.00");
    assert_eq!(state.last().rx_bytes, 2 * MB);
}

#[test]
fn direction_labels_follow_dominance() {
    let l = |rx, tx| DirectionLabels::classify(&Rates { rx_mbps: rx, tx_mbps: tx });
    assert_eq!(l(1.0, 0.1), DirectionLabels { download: true, upload: false });
    assert_eq!(l(0.1, 2.0), DirectionLabels { download: false, upload: true });
    assert_eq!(l(0.6, 0.6), DirectionLabels { download: true, upload: true });
    assert_eq!(l(0.1, 0.1), DirectionLabels::default());
    // Significant but not dominant: only the side above the threshold is called out.
    assert_eq!(l(0.6, 0.3), DirectionLabels { download: true, upload: false });
}

// ── Probe ────────────────────────────────────────────────────────────

#[test]
fn probe_all_lost_is_full_loss_without_average() {
    let p = ConnectivityProbe::new(ScriptedEcho::new(&[None]));
    let r = p.probe("8.8.8.8", 2, Duration::from_millis(10));
    assert_eq!(r, ProbeResult { avg_rtt_ms: None, loss_percent: 100 });
    assert!(!r.has_connectivity());
}

#[test]
fn probe_all_replies_is_zero_loss() {
    let p = ConnectivityProbe::new(ScriptedEcho::new(&[Some(10), Some(31)]));
    let r = p.probe("8.8.8.8", 2, Duration::from_millis(10));
    assert_eq!(r, ProbeResult { avg_rtt_ms: Some(20), loss_percent: 0 });
}

#[test]
fn probe_loss_percent_is_floored() {
    let p = ConnectivityProbe::new(ScriptedEcho::new(&[Some(5), None, None]));
    let r = p.probe("8.8.8.8", 3, Duration::from_millis(10));
    assert_eq!(r.loss_percent, 66);
    assert_eq!(r.avg_rtt_ms, Some(5));
}

#[test]
fn connectivity_needs_an_average_and_less_than_full_loss() {
    let sentinel = ProbeResult { avg_rtt_ms: None, loss_percent: 0 };
    assert!(!sentinel.has_connectivity());
    let half = ProbeResult { avg_rtt_ms: Some(20), loss_percent: 50 };
    assert!(half.has_connectivity());
    assert_eq!(ProbeResult::from_attempts(&[]), ProbeResult::unreachable());
}

// ── External commands ────────────────────────────────────────────────

#[cfg(unix)]
#[test]
fn command_is_killed_when_it_outlives_its_timeout() {
    let started = Instant::now();
    assert_eq!(run_command("sleep", &["5"], Duration::from_millis(100)), None);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[cfg(unix)]
#[test]
fn command_output_is_trimmed_and_missing_programs_are_unavailable() {
    let out = run_command("echo", &["  hello  "], Duration::from_secs(2));
    assert_eq!(out.as_deref(), Some("hello"));
    assert_eq!(
        run_command("netstats-no-such-tool", &[], Duration::from_secs(1)),
        None
    );
}

// ── Public address ───────────────────────────────────────────────────

#[test]
fn public_address_resolves_when_fast() {
    let r = PublicAddressResolver::new(
        Arc::new(FixedAddress("198.51.100.4")),
        Duration::from_secs(2),
    )
    .unwrap();
    assert_eq!(r.resolve().as_deref(), Some("198.51.100.4"));
}

#[test]
fn public_address_resolves_every_cycle_from_a_plain_thread() {
    let r = PublicAddressResolver::new(
        Arc::new(FixedAddress("198.51.100.4")),
        Duration::from_secs(2),
    )
    .unwrap();
    let resolved = std::thread::spawn(move || (0..3).map(|_| r.resolve()).collect::<Vec<_>>())
        .join()
        .unwrap();
    assert_eq!(resolved, vec![Some("198.51.100.4".to_string()); 3]);
}

#[test]
fn public_address_wait_is_bounded() {
    let r =
        PublicAddressResolver::new(Arc::new(NeverAnswers), Duration::from_millis(150)).unwrap();
    let started = Instant::now();
    assert_eq!(r.resolve(), None);
    assert!(started.elapsed() < Duration::from_secs(2));
    // A second lookup is dispatched fresh and also gives up on time.
    assert_eq!(r.resolve(), None);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn public_address_failure_is_unavailable() {
    let r = PublicAddressResolver::new(Arc::new(BrokenFetch), Duration::from_secs(1)).unwrap();
    assert_eq!(r.resolve(), None);
}

// ── Monitor ──────────────────────────────────────────────────────────

#[test]
fn monitor_two_cycles_compute_throughput() {
    let ifaces = FakeInterfaces::default();
    ifaces.set(vec![
        adapter("eth0", InterfaceKind::Ethernet, true, &["fe80::2", "192.168.1.10"], 1000),
        adapter("vmnet8", InterfaceKind::Ethernet, true, &["192.168.200.1"], 10_000),
    ]);
    ifaces.counters("eth0", MB, 0);

    let (now, clock) = manual_clock();
    let mut m = Monitor::new(fast_config(), sources(Box::new(ifaces.clone()), &[Some(20)]))
        .with_clock(clock);
    assert_eq!(m.state(), MonitorState::Initializing);
    m.initialize();
    assert_eq!(m.state(), MonitorState::Sampling);
    assert_eq!(m.cycle_state().unwrap().last().rx_bytes, MB);

    ifaces.counters("eth0", 2 * MB, 0);
    now.set(t0() + chrono::Duration::seconds(1));
    let d = m.run_cycle().unwrap();

    assert_eq!(format!("{:.2}", d.rates.rx_mbps), "1.00");
    assert_eq!(d.labels, DirectionLabels { download: true, upload: false });
    assert_eq!(d.adapter.as_deref(), Some("eth0 adapter"));
    assert_eq!(d.kind, Some(InterfaceKind::Ethernet));
    assert!(d.connected);
    assert!(d.online);
    assert_eq!(d.ipv4.unwrap().to_string(), "192.168.1.10");
    assert_eq!(d.gateway.unwrap().to_string(), "192.168.1.1");
    assert_eq!(d.dns.len(), 2);
    assert_eq!(d.public_ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(d.probe.avg_rtt_ms, Some(20));
    assert!(d.wireless.is_none());
    assert_eq!(m.cycle_state().unwrap().last().rx_bytes, 2 * MB);
}

#[test]
fn monitor_queries_wireless_only_for_wireless_adapters() {
    let ifaces = FakeInterfaces::default();
    ifaces.set(vec![adapter("wlan0", InterfaceKind::Wireless, true, &["10.0.0.5"], 300)]);
    let mut m = Monitor::new(fast_config(), sources(Box::new(ifaces), &[None]));
    m.initialize();
    let d = m.run_cycle().unwrap();
    let w = d.wireless.unwrap();
    assert_eq!(w.ssid.as_deref(), Some("HomeNet"));
    assert_eq!(w.signal, None);
    assert!(!d.online);
    assert_eq!(d.probe.loss_percent, 100);
}

#[test]
fn monitor_keeps_showing_vanished_adapter_as_disconnected() {
    let ifaces = FakeInterfaces::default();
    ifaces.set(vec![adapter("eth0", InterfaceKind::Ethernet, true, &["10.0.0.5"], 1000)]);
    ifaces.counters("eth0", 10 * MB, MB);
    let (now, clock) = manual_clock();
    let mut m = Monitor::new(fast_config(), sources(Box::new(ifaces.clone()), &[Some(5)]))
        .with_clock(clock);
    m.initialize();

    ifaces.set(Vec::new());
    now.set(t0() + chrono::Duration::seconds(1));
    let d = m.run_cycle().unwrap();

    assert_eq!(d.adapter.as_deref(), Some("eth0 adapter"));
    assert!(!d.connected);
    assert_eq!(d.ipv4, None);
    assert_eq!(d.mac, None);
    assert!(d.dns.is_empty());
    assert_eq!(d.rx_total_bytes, 0);
    assert!(d.rates.rx_mbps < 0.0);
    assert_eq!(d.labels, DirectionLabels::default());
    assert_eq!(m.selector().cached().unwrap().id, "eth0");
}

#[test]
fn monitor_without_any_adapter_still_renders() {
    let mut m = Monitor::new(fast_config(), sources(Box::new(FailingInterfaces), &[Some(12)]));
    m.initialize();
    let d = m.run_cycle().unwrap();
    assert_eq!(d.adapter, None);
    assert!(!d.connected);
    assert!(d.online);
    assert_eq!(d.rates.rx_mbps, 0.0);
}

#[test]
fn monitor_step_turns_panics_into_errors() {
    // First call is initialization, the second is the cycle.
    let source = PanickingInterfaces::on_call(2);
    let mut m = Monitor::new(fast_config(), sources(Box::new(source), &[Some(1)]));
    m.initialize();
    let mut screen = RecordingScreen::default();
    let err = m.step(&mut screen).unwrap_err();
    assert!(err.to_string().contains("driver query exploded"));
    m.step(&mut screen).unwrap();
    assert_eq!(screen.dashboards.len(), 1);
}

#[test]
fn monitor_run_loops_until_stopped_then_shuts_down() {
    let ifaces = FakeInterfaces::default();
    ifaces.set(vec![adapter("eth0", InterfaceKind::Ethernet, true, &["10.0.0.5"], 1000)]);
    let stop = Arc::new(AtomicBool::new(false));
    let mut screen = RecordingScreen {
        stop_after: Some((3, Arc::clone(&stop))),
        ..Default::default()
    };
    let mut m = Monitor::new(fast_config(), sources(Box::new(ifaces), &[Some(3)]));
    m.run(&mut screen, &stop);

    assert!(screen.started);
    assert!(screen.shut_down);
    assert_eq!(screen.dashboards.len(), 3);
    assert!(screen.errors.is_empty());
    assert_eq!(m.state(), MonitorState::ShuttingDown);
}

#[test]
fn monitor_run_survives_failed_cycles() {
    let source = PanickingInterfaces::on_call(2);
    let stop = Arc::new(AtomicBool::new(false));
    let mut screen = RecordingScreen {
        stop_after: Some((2, Arc::clone(&stop))),
        ..Default::default()
    };
    let mut m = Monitor::new(fast_config(), sources(Box::new(source), &[Some(3)]));
    m.run(&mut screen, &stop);
    assert_eq!(screen.errors.len(), 1);
    assert_eq!(screen.dashboards.len(), 1);
}

#[test]
fn monitor_stopped_before_start_renders_nothing() {
    let stop = AtomicBool::new(true);
    let mut screen = RecordingScreen::default();
    let ifaces = FakeInterfaces::default();
    let mut m = Monitor::new(fast_config(), sources(Box::new(ifaces), &[Some(3)]));
    m.run(&mut screen, &stop);
    assert!(screen.dashboards.is_empty());
    assert!(screen.shut_down);
}
