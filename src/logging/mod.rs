//! Tracing setup. stdout is owned by the dashboard, so log lines go to a file or stderr.

use crate::config::LogConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: level from RUST_LOG or the configured default.
    pub fn init(config: &LogConfig) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

        let file = config.file.as_ref().and_then(|path| {
            OpenOptions::new().create(true).append(true).open(path).ok()
        });
        let to_file = file.is_some();
        let writer = match file {
            Some(f) => BoxMakeWriter::new(Mutex::new(f)),
            None => BoxMakeWriter::new(std::io::stderr),
        };

        if config.json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(writer);
            let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
        } else {
            let fmt = tracing_subscriber::fmt::layer()
                .with_ansi(!to_file)
                .with_writer(writer);
            let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
        }
    }

    /// Replace the default panic hook, which prints to stderr over the dashboard, with one
    /// that logs the panic. The monitor loop still recovers the panic itself.
    pub fn route_panics() {
        std::panic::set_hook(Box::new(|info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let location = info.location().map(|l| l.to_string());
            tracing::error!(panic = %message, location = ?location, "panic captured");
        }));
    }
}
