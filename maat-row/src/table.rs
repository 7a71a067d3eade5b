use crate::row::{RecordKey, RowMaat};
use crate::stats::LatchStats;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Keyed collection of records.
///
/// The map only hands out rows; every access to a row's state goes through
/// that row's own latch.
pub struct Table {
    rows: DashMap<RecordKey, Arc<RowMaat>>,
    stats: Option<Arc<LatchStats>>,
}

impl Table {
    pub fn new() -> Self {
        Self::with_stats(None)
    }

    pub fn with_stats(stats: Option<Arc<LatchStats>>) -> Self {
        Self {
            rows: DashMap::new(),
            stats,
        }
    }

    /// Insert a record, or return the existing one if `key` is taken.
    pub fn get_or_insert(&self, key: RecordKey, data: Vec<u8>) -> Arc<RowMaat> {
        self.rows
            .entry(key)
            .or_insert_with(|| Arc::new(RowMaat::with_stats(key, data, self.stats.clone())))
            .value()
            .clone()
    }

    /// Insert a record. Returns `None` if `key` already exists.
    pub fn insert(&self, key: RecordKey, data: Vec<u8>) -> Option<Arc<RowMaat>> {
        match self.rows.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let row = Arc::new(RowMaat::with_stats(key, data, self.stats.clone()));
                slot.insert(row.clone());
                Some(row)
            }
        }
    }

    pub fn get(&self, key: RecordKey) -> Option<Arc<RowMaat>> {
        self.rows.get(&key).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
