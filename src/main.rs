//! Network Stats entrypoint: paints the dashboard every refresh interval until Ctrl+C.
//! Settings come from the file named by `NETSTATS_CONFIG`, defaults otherwise.

use netstats_monitor::{
    config::MonitorConfig,
    logging::StructuredLogger,
    monitor::{Monitor, Sources},
    sources::{
        CommandWirelessSource, ConnectivityProbe, EchoSender, HttpAddressFetch,
        PublicAddressResolver, SystemInterfaceSource, SystemPing,
    },
    TerminalScreen,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

static STOP: AtomicBool = AtomicBool::new(false);

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = MonitorConfig::from_env();

    StructuredLogger::init(&config.log);
    StructuredLogger::route_panics();

    info!(
        refresh_ms = config.refresh_interval_ms,
        probe_host = %config.probe.host,
        "network stats starting"
    );

    ctrlc::set_handler(|| {
        STOP.store(true, Ordering::Relaxed);
    })?;

    let fetcher = Arc::new(HttpAddressFetch::new(&config.public_ip)?);
    let sources = Sources {
        interfaces: Box::new(SystemInterfaceSource::new().with_command_timeout(
            Duration::from_millis(config.interfaces.command_timeout_ms),
        )),
        probe: ConnectivityProbe::new(Box::new(SystemPing) as Box<dyn EchoSender>),
        public_ip: PublicAddressResolver::new(
            fetcher,
            Duration::from_millis(config.public_ip.wait_budget_ms),
        )?,
        wireless: Box::new(CommandWirelessSource::new(Duration::from_millis(
            config.wireless.command_timeout_ms,
        ))),
    };

    let mut screen = TerminalScreen::stdout();
    let mut monitor = Monitor::new(config, sources);
    monitor.run(&mut screen, &STOP);

    info!("network stats stopped");
    Ok(())
}
