use crate::config::EngineConfig;
use crate::error::Result;
use crate::stats::LatchStats;
use crate::table::Table;
use crate::timestamp::{LocalTimestampOracle, Timestamp, TimestampOracle};
use crate::txn::Txn;
use std::sync::Arc;
use tracing::debug;

/// A table of MaaT-controlled records plus the clock that feeds them.
///
/// The engine hands out transactions and, when asked, a commit timestamp.
/// Cross-record validation of a transaction's timestamp interval is not done
/// here; callers that need serializability decide the timestamp themselves and
/// use [`Txn::commit_at`].
pub struct MaatEngine {
    table: Table,
    ts_oracle: Arc<dyn TimestampOracle>,
    stats: Option<Arc<LatchStats>>,
}

impl std::fmt::Debug for MaatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaatEngine")
            .field("records", &self.table.len())
            .field("clock", &self.ts_oracle.current())
            .finish()
    }
}

impl MaatEngine {
    pub fn new() -> Self {
        Self::with_oracle(Arc::new(LocalTimestampOracle::new()))
    }

    pub fn with_oracle(ts_oracle: Arc<dyn TimestampOracle>) -> Self {
        Self {
            table: Table::new(),
            ts_oracle,
            stats: None,
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let stats = config.latch_stats.then(|| Arc::new(LatchStats::new()));
        Ok(Self {
            table: Table::with_stats(stats.clone()),
            ts_oracle: Arc::new(LocalTimestampOracle::with_initial(config.initial_timestamp)),
            stats,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn ts_oracle(&self) -> &Arc<dyn TimestampOracle> {
        &self.ts_oracle
    }

    /// Latch counters, if enabled in the config.
    pub fn latch_stats(&self) -> Option<&Arc<LatchStats>> {
        self.stats.as_ref()
    }

    /// Begin a transaction. Its id is drawn from the oracle.
    pub fn begin(&self) -> Txn {
        let txn_id = self.ts_oracle.get_timestamp();
        debug!(txn_id, "transaction begun");
        Txn::new(txn_id)
    }

    /// Commit at the next oracle timestamp, raised to the transaction's
    /// observed lower bound if the clock is behind it.
    pub fn commit(&self, txn: &mut Txn) -> Result<Timestamp> {
        let commit_ts = self
            .ts_oracle
            .get_timestamp()
            .max(txn.observations().min_commit_ts());
        txn.commit_at(commit_ts)
    }
}

impl Default for MaatEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_draws_ids_from_oracle() {
        let engine = MaatEngine::with_oracle(Arc::new(LocalTimestampOracle::with_initial(20)));
        assert_eq!(engine.begin().id(), 21);
        assert_eq!(engine.begin().id(), 22);
    }

    #[test]
    fn test_commit_respects_observed_bound() {
        let engine = MaatEngine::new();
        let row = engine.table().get_or_insert(1, Vec::new());

        let mut writer = engine.begin();
        writer.write(&row, b"v".to_vec()).unwrap();
        writer.commit_at(50).unwrap();

        // The clock is far behind the committed write.
        let mut reader = engine.begin();
        assert_eq!(reader.read(&row).unwrap(), b"v");
        assert_eq!(engine.commit(&mut reader).unwrap(), 51);
        assert_eq!(row.last_committed_read_ts(), 51);
    }

    #[test]
    fn test_with_config_enables_stats() {
        let engine =
            MaatEngine::with_config(EngineConfig::default().with_latch_stats(true)).unwrap();
        let row = engine.table().get_or_insert(1, Vec::new());
        let mut txn = engine.begin();
        txn.read(&row).unwrap();
        engine.commit(&mut txn).unwrap();

        let stats = engine.latch_stats().expect("stats enabled");
        assert_eq!(stats.total_acquisitions(), 2);
        assert!(MaatEngine::new().latch_stats().is_none());
    }
}
