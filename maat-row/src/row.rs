use crate::access::{AccessKind, AccessStatus};
use crate::observer::AccessObserver;
use crate::stats::{LatchOp, LatchStats};
use crate::timestamp::{Timestamp, TxnId};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{trace, warn};

/// Primary key of a record.
pub type RecordKey = u64;

/// Everything the latch guards.
struct RowState {
    last_committed_read_ts: Timestamp,
    last_committed_write_ts: Timestamp,
    /// Soft read locks: transactions with an in-flight read.
    uncommitted_readers: HashSet<TxnId>,
    /// Soft write locks: transactions with a staged write.
    uncommitted_writers: HashSet<TxnId>,
    /// Visible payload. Replaced only by a write commit.
    data: Vec<u8>,
}

/// Concurrency-control state of one record, together with its payload.
///
/// All operations take the record latch for their whole critical section and
/// never touch another record while holding it, so there is no lock ordering
/// between records. Readers and writers never wait on each other here: the
/// uncommitted sets are advisory markers that transactions copy into their
/// accumulators, and the abort decision is taken later from what was copied.
///
/// Per (transaction, kind) the lifecycle is
/// `none -> in flight` (`read`/`prewrite`) `-> committed` (`commit`) or
/// `-> none` (`abort`).
pub struct RowMaat {
    key: RecordKey,
    latch: Mutex<RowState>,
    stats: Option<Arc<LatchStats>>,
}

impl RowMaat {
    pub fn new(key: RecordKey, data: Vec<u8>) -> Self {
        Self::with_stats(key, data, None)
    }

    pub fn with_stats(key: RecordKey, data: Vec<u8>, stats: Option<Arc<LatchStats>>) -> Self {
        Self {
            key,
            latch: Mutex::new(RowState {
                last_committed_read_ts: 0,
                last_committed_write_ts: 0,
                uncommitted_readers: HashSet::new(),
                uncommitted_writers: HashSet::new(),
                data,
            }),
            stats,
        }
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    fn lock(&self, op: LatchOp) -> MutexGuard<'_, RowState> {
        match &self.stats {
            Some(stats) => {
                let started = Instant::now();
                let guard = self.latch.lock();
                stats.record(op, started.elapsed());
                guard
            }
            None => self.latch.lock(),
        }
    }

    /// Dispatch to [`read`](Self::read) or [`prewrite`](Self::prewrite).
    pub fn access<O: AccessObserver>(&self, kind: AccessKind, txn: &mut O) -> AccessStatus {
        match kind {
            AccessKind::Read => self.read(txn),
            AccessKind::Write => self.prewrite(txn),
        }
    }

    /// Register an in-flight read.
    ///
    /// Copies the in-flight writers into the caller's read-side writer set,
    /// raises its high-water write timestamp to the last committed write and
    /// adds the caller to the uncommitted readers.
    pub fn read<O: AccessObserver>(&self, txn: &mut O) -> AccessStatus {
        let mut state = self.lock(LatchOp::Read);
        self.read_locked(&mut state, txn);
        AccessStatus::Ok
    }

    /// Same as [`read`](Self::read), also returning the payload seen in the
    /// same critical section.
    pub fn read_with_data<O: AccessObserver>(&self, txn: &mut O) -> (AccessStatus, Vec<u8>) {
        let mut state = self.lock(LatchOp::Read);
        self.read_locked(&mut state, txn);
        (AccessStatus::Ok, state.data.clone())
    }

    fn read_locked<O: AccessObserver>(&self, state: &mut RowState, txn: &mut O) {
        let txn_id = txn.txn_id();
        trace!(
            txn_id,
            key = self.key,
            last_write = state.last_committed_write_ts,
            writers = state.uncommitted_writers.len(),
            "read"
        );

        for &writer in &state.uncommitted_writers {
            txn.observe_writer_on_read(writer);
        }
        txn.raise_write_ts(state.last_committed_write_ts);

        state.uncommitted_readers.insert(txn_id);
    }

    /// Stage a write. Nothing is applied to the payload yet.
    ///
    /// Copies in-flight readers and in-flight writers into the caller (writers
    /// into the prewrite-side set), raises both high-water timestamps and adds
    /// the caller to the uncommitted writers.
    pub fn prewrite<O: AccessObserver>(&self, txn: &mut O) -> AccessStatus {
        let mut state = self.lock(LatchOp::Prewrite);
        let txn_id = txn.txn_id();
        trace!(
            txn_id,
            key = self.key,
            last_write = state.last_committed_write_ts,
            last_read = state.last_committed_read_ts,
            readers = state.uncommitted_readers.len(),
            writers = state.uncommitted_writers.len(),
            "prewrite"
        );

        for &reader in &state.uncommitted_readers {
            txn.observe_reader(reader);
        }
        for &writer in &state.uncommitted_writers {
            txn.observe_writer_on_prewrite(writer);
        }
        txn.raise_read_ts(state.last_committed_read_ts);
        txn.raise_write_ts(state.last_committed_write_ts);

        state.uncommitted_writers.insert(txn_id);
        AccessStatus::Ok
    }

    /// Roll back one in-flight access. Committed timestamps are untouched.
    pub fn abort(&self, kind: AccessKind, txn_id: TxnId) -> AccessStatus {
        let mut state = self.lock(LatchOp::Abort);
        trace!(txn_id, key = self.key, %kind, "abort");

        let set = match kind {
            AccessKind::Read => &mut state.uncommitted_readers,
            AccessKind::Write => &mut state.uncommitted_writers,
        };
        self.release(set, txn_id, kind, "abort");
        AccessStatus::Abort
    }

    /// Finalize one access at the transaction's decided commit timestamp.
    ///
    /// For a write, `new_data` replaces the payload inside the critical
    /// section, so it becomes visible to readers only once the latch is
    /// released. `new_data` is ignored for reads.
    pub fn commit(
        &self,
        kind: AccessKind,
        txn_id: TxnId,
        commit_ts: Timestamp,
        new_data: Option<&[u8]>,
    ) -> AccessStatus {
        let mut state = self.lock(LatchOp::Commit);
        trace!(txn_id, key = self.key, %kind, commit_ts, "commit");

        match kind {
            AccessKind::Read => {
                if commit_ts > state.last_committed_read_ts {
                    state.last_committed_read_ts = commit_ts;
                }
                self.release(&mut state.uncommitted_readers, txn_id, kind, "commit");
            }
            AccessKind::Write => {
                if commit_ts > state.last_committed_write_ts {
                    state.last_committed_write_ts = commit_ts;
                }
                self.release(&mut state.uncommitted_writers, txn_id, kind, "commit");
                match new_data {
                    Some(data) => Self::write(&mut state, data),
                    None => warn!(txn_id, key = self.key, "write committed without a payload"),
                }
                debug_assert!(
                    new_data.is_some(),
                    "write commit of txn {txn_id} carries no payload"
                );
            }
        }
        AccessStatus::Ok
    }

    /// Copy the new payload over the old one, reusing its buffer.
    fn write(state: &mut RowState, data: &[u8]) {
        state.data.clear();
        state.data.extend_from_slice(data);
    }

    /// Drop `txn_id` from an uncommitted set.
    ///
    /// Finishing an access that is not in flight is a caller bug. Debug builds
    /// assert; release builds log and leave the set as it is.
    fn release(&self, set: &mut HashSet<TxnId>, txn_id: TxnId, kind: AccessKind, op: &str) {
        let removed = set.remove(&txn_id);
        if !removed {
            warn!(txn_id, key = self.key, %kind, op, "access was not in flight");
        }
        debug_assert!(
            removed,
            "{op} of {kind} by txn {txn_id} on record {} that is not in flight",
            self.key
        );
    }

    pub fn last_committed_read_ts(&self) -> Timestamp {
        self.latch.lock().last_committed_read_ts
    }

    pub fn last_committed_write_ts(&self) -> Timestamp {
        self.latch.lock().last_committed_write_ts
    }

    /// Snapshot of the in-flight readers, in no particular order.
    pub fn uncommitted_readers(&self) -> Vec<TxnId> {
        self.latch.lock().uncommitted_readers.iter().copied().collect()
    }

    /// Snapshot of the in-flight writers, in no particular order.
    pub fn uncommitted_writers(&self) -> Vec<TxnId> {
        self.latch.lock().uncommitted_writers.iter().copied().collect()
    }

    pub fn is_reading(&self, txn_id: TxnId) -> bool {
        self.latch.lock().uncommitted_readers.contains(&txn_id)
    }

    pub fn is_writing(&self, txn_id: TxnId) -> bool {
        self.latch.lock().uncommitted_writers.contains(&txn_id)
    }

    /// Copy of the committed payload.
    pub fn data(&self) -> Vec<u8> {
        self.latch.lock().data.clone()
    }
}

impl std::fmt::Debug for RowMaat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.latch.lock();
        f.debug_struct("RowMaat")
            .field("key", &self.key)
            .field("last_committed_read_ts", &state.last_committed_read_ts)
            .field("last_committed_write_ts", &state.last_committed_write_ts)
            .field("uncommitted_readers", &state.uncommitted_readers.len())
            .field("uncommitted_writers", &state.uncommitted_writers.len())
            .finish()
    }
}
