//! # MaaT record-level concurrency control
//!
//! `maat-row` implements the per-record half of MaaT, an optimistic protocol
//! that orders transactions by shrinking a timestamp interval instead of by
//! blocking.
//!
//! ## How it works
//!
//! Every record carries a [`RowMaat`]: the transactions holding an uncommitted
//! read or write on it (soft locks), and the timestamps of its latest committed
//! read and write, all behind a single per-record latch.
//!
//! - **Reads** copy the in-flight writers and the last committed write
//!   timestamp into the reader, then join the uncommitted readers.
//! - **Prewrites** copy in-flight readers, in-flight writers and both committed
//!   timestamps into the writer, then join the uncommitted writers. No data
//!   changes yet.
//! - **Commit** raises the committed timestamp and, for writes, replaces the
//!   payload. **Abort** just leaves the uncommitted set.
//!
//! Nobody waits on anybody's soft lock. What a transaction gathered
//! ([`TxnObservations`]) is what the caller uses to pick a commit timestamp or
//! to abort.
//!
//! ## Example
//!
//! ```rust
//! use maat_row::MaatEngine;
//!
//! let engine = MaatEngine::new();
//! let row = engine.table().get_or_insert(1, b"v0".to_vec());
//!
//! let mut writer = engine.begin();
//! writer.write(&row, b"v1".to_vec()).unwrap();
//!
//! // Concurrent reader sees the staged write as in flight.
//! let mut reader = engine.begin();
//! assert_eq!(reader.read(&row).unwrap(), b"v0");
//! assert!(reader.observations().writers_on_read().contains(&writer.id()));
//!
//! let ts = engine.commit(&mut writer).unwrap();
//! assert_eq!(row.last_committed_write_ts(), ts);
//! assert_eq!(row.data(), b"v1");
//! # reader.abort().unwrap();
//! ```

mod access;
mod config;
mod engine;
mod error;
mod observer;
mod row;
mod stats;
mod table;
mod timestamp;
mod txn;

pub use crate::access::{AccessKind, AccessStatus};
pub use crate::config::EngineConfig;
pub use crate::engine::MaatEngine;
pub use crate::error::{MaatError, Result};
pub use crate::observer::AccessObserver;
pub use crate::row::{RecordKey, RowMaat};
pub use crate::stats::{LatchOp, LatchStats, LatchWait};
pub use crate::table::Table;
pub use crate::timestamp::{LocalTimestampOracle, Timestamp, TimestampOracle, TxnId};
pub use crate::txn::{Txn, TxnObservations};
