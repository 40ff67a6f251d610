//! Throughput from consecutive byte-counter samples, and which direction to call out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BYTES_PER_MB: f64 = 1_048_576.0;
/// Elapsed-time floor in seconds
pub const MIN_ELAPSED_SECS: f64 = 0.001;
/// Below this on both directions nothing is labelled
pub const LABEL_THRESHOLD_MBPS: f64 = 0.5;
/// One direction dominates when it exceeds the other by this factor
pub const DOMINANCE_FACTOR: f64 = 3.0;

/// Cumulative counters of one adapter at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub rx_mbps: f64,
    pub tx_mbps: f64,
}

/// MB/s in each direction between two samples. A counter that went backwards (adapter
/// reset or swapped) yields a negative rate; callers decide whether to show it.
pub fn compute_rates(prev: &Sample, curr: &Sample) -> Rates {
    let elapsed = (curr.at - prev.at)
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or(f64::MAX);
    let secs = elapsed.max(MIN_ELAPSED_SECS);
    let delta = |now: u64, before: u64| (now as f64 - before as f64) / BYTES_PER_MB / secs;
    Rates {
        rx_mbps: delta(curr.rx_bytes, prev.rx_bytes),
        tx_mbps: delta(curr.tx_bytes, prev.tx_bytes),
    }
}

/// Counters carried from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    last: Sample,
}

impl CycleState {
    pub fn new(seed: Sample) -> Self {
        Self { last: seed }
    }

    pub fn last(&self) -> &Sample {
        &self.last
    }

    /// Rates since the previous sample; `curr` becomes the new baseline.
    pub fn advance(&mut self, curr: Sample) -> Rates {
        let rates = compute_rates(&self.last, &curr);
        self.last = curr;
        rates
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionLabels {
    pub download: bool,
    pub upload: bool,
}

impl DirectionLabels {
    pub fn classify(rates: &Rates) -> Self {
        let (rx, tx) = (rates.rx_mbps, rates.tx_mbps);
        if rx < LABEL_THRESHOLD_MBPS && tx < LABEL_THRESHOLD_MBPS {
            Self::default()
        } else if rx > tx * DOMINANCE_FACTOR {
            Self { download: true, upload: false }
        } else if tx > rx * DOMINANCE_FACTOR {
            Self { download: false, upload: true }
        } else {
            // Neither dominates: call out each side that is itself significant.
            Self {
                download: rx >= LABEL_THRESHOLD_MBPS,
                upload: tx >= LABEL_THRESHOLD_MBPS,
            }
        }
    }
}
