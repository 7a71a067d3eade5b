use crate::error::{MaatError, Result};
use crate::timestamp::Timestamp;

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Record latch wait times per operation.
    pub latch_stats: bool,
    /// Clock value the local oracle starts from.
    pub initial_timestamp: Timestamp,
}

impl EngineConfig {
    pub fn with_latch_stats(mut self, enabled: bool) -> Self {
        self.latch_stats = enabled;
        self
    }

    pub fn with_initial_timestamp(mut self, ts: Timestamp) -> Self {
        self.initial_timestamp = ts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_timestamp == Timestamp::MAX {
            return Err(MaatError::InvalidConfig(
                "initial_timestamp leaves no room for new timestamps".to_string(),
            ));
        }
        Ok(())
    }
}
