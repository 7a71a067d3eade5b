use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Record operation whose latch wait is being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchOp {
    Read,
    Prewrite,
    Abort,
    Commit,
}

impl LatchOp {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            LatchOp::Read => 0,
            LatchOp::Prewrite => 1,
            LatchOp::Abort => 2,
            LatchOp::Commit => 3,
        }
    }
}

#[derive(Default)]
struct Counter {
    acquisitions: AtomicU64,
    wait_nanos: AtomicU64,
}

/// Latch wait counters shared by every record of an engine.
///
/// Purely observational. Counters are relaxed atomics, so a snapshot taken
/// while workers run is approximate.
#[derive(Default)]
pub struct LatchStats {
    counters: [Counter; LatchOp::COUNT],
}

/// Point-in-time copy of one operation's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatchWait {
    pub acquisitions: u64,
    pub total_wait: Duration,
}

impl LatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, op: LatchOp, waited: Duration) {
        let counter = &self.counters[op.index()];
        counter.acquisitions.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        counter.wait_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self, op: LatchOp) -> LatchWait {
        let counter = &self.counters[op.index()];
        LatchWait {
            acquisitions: counter.acquisitions.load(Ordering::Relaxed),
            total_wait: Duration::from_nanos(counter.wait_nanos.load(Ordering::Relaxed)),
        }
    }

    /// Total acquisitions across all operations.
    pub fn total_acquisitions(&self) -> u64 {
        self.counters
            .iter()
            .map(|c| c.acquisitions.load(Ordering::Relaxed))
            .sum()
    }
}
