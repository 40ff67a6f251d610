//! Network Stats: live terminal dashboard for the machine's real network connection.
//!
//! Modular structure:
//! - [`sources`]: Interface enumeration, connectivity probe, public address, Wi-Fi metadata
//! - [`selector`]: Picks the adapter that represents the user's connection
//! - [`sampling`]: Throughput from consecutive counter samples
//! - [`display`]: Dashboard view model and terminal painting
//! - [`monitor`]: Fixed-interval sampling loop
//! - [`logging`]: tracing setup

pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod sampling;
pub mod selector;
pub mod sources;

pub use config::MonitorConfig;
pub use display::{Dashboard, Screen, TerminalScreen};
pub use error::MonitorError;
pub use logging::StructuredLogger;
pub use monitor::{Monitor, MonitorState, Sources};
pub use sampling::{compute_rates, CycleState, DirectionLabels, Rates, Sample};
pub use selector::AdapterSelector;
pub use sources::{InterfaceDescriptor, InterfaceKind, InterfaceSource, OperState, ProbeResult};
