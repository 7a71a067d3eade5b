use std::sync::atomic::{AtomicU64, Ordering};

/// Logical timestamp. Larger means later.
pub type Timestamp = u64;

/// Transaction identifier.
pub type TxnId = u64;

/// Source of commit timestamps and transaction ids.
///
/// A replicated deployment can back this with its consensus log. Records only
/// compare and store the values; they never ask the oracle themselves.
pub trait TimestampOracle: Send + Sync {
    /// Next value of the clock. Each call returns a larger value than the last.
    fn get_timestamp(&self) -> Timestamp;

    /// Last value handed out, without advancing the clock.
    fn current(&self) -> Timestamp;
}

/// In-process clock backed by one atomic counter.
pub struct LocalTimestampOracle {
    counter: AtomicU64,
}

impl LocalTimestampOracle {
    pub fn new() -> Self {
        Self::with_initial(0)
    }

    /// Clock whose first timestamp is `initial + 1`.
    pub fn with_initial(initial: Timestamp) -> Self {
        Self {
            counter: AtomicU64::new(initial),
        }
    }
}

impl Default for LocalTimestampOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampOracle for LocalTimestampOracle {
    fn get_timestamp(&self) -> Timestamp {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> Timestamp {
        self.counter.load(Ordering::SeqCst)
    }
}
