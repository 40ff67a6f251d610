use thiserror::Error;

/// Failures raised by the data sources and the display.
///
/// None of these are fatal: sources map them to "unavailable" values and the
/// monitor loop renders anything that escapes a cycle as a one-line notice.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("interface enumeration failed: {reason}")]
    Enumeration { reason: String },

    #[error("command `{program}` failed or timed out")]
    Command { program: String },

    #[error("no round-trip time in ping output")]
    ProbeOutput,

    #[error("public address lookup failed: {0}")]
    PublicAddress(#[from] reqwest::Error),

    #[error("public address response was empty")]
    EmptyAddress,

    #[error("async runtime unavailable: {0}")]
    Runtime(std::io::Error),

    #[error("cycle panicked: {message}")]
    Panicked { message: String },

    #[error("display error: {0}")]
    Display(#[from] std::io::Error),
}
