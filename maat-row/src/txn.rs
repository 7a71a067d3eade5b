use crate::access::AccessKind;
use crate::error::{MaatError, Result};
use crate::observer::AccessObserver;
use crate::row::RowMaat;
use crate::timestamp::{Timestamp, TxnId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// What a transaction has gathered from every record it touched.
///
/// Sets are merged by union and timestamps by maximum, so the result does not
/// depend on the order records were accessed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxnObservations {
    txn_id: TxnId,
    /// Writers in flight when we read.
    writers_on_read: HashSet<TxnId>,
    /// Writers in flight when we prewrote.
    writers_on_prewrite: HashSet<TxnId>,
    /// Readers in flight when we prewrote.
    readers: HashSet<TxnId>,
    high_water_read_ts: Timestamp,
    high_water_write_ts: Timestamp,
}

impl TxnObservations {
    pub fn new(txn_id: TxnId) -> Self {
        Self {
            txn_id,
            ..Default::default()
        }
    }

    pub fn writers_on_read(&self) -> &HashSet<TxnId> {
        &self.writers_on_read
    }

    pub fn writers_on_prewrite(&self) -> &HashSet<TxnId> {
        &self.writers_on_prewrite
    }

    pub fn readers(&self) -> &HashSet<TxnId> {
        &self.readers
    }

    pub fn high_water_read_ts(&self) -> Timestamp {
        self.high_water_read_ts
    }

    pub fn high_water_write_ts(&self) -> Timestamp {
        self.high_water_write_ts
    }

    /// Smallest commit timestamp that orders this transaction after every
    /// committed read and write it observed.
    pub fn min_commit_ts(&self) -> Timestamp {
        self.high_water_read_ts
            .max(self.high_water_write_ts)
            .saturating_add(1)
    }
}

impl AccessObserver for TxnObservations {
    fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    // Our own soft locks are not concurrent accesses.
    fn observe_writer_on_read(&mut self, writer: TxnId) {
        if writer != self.txn_id {
            self.writers_on_read.insert(writer);
        }
    }

    fn observe_writer_on_prewrite(&mut self, writer: TxnId) {
        if writer != self.txn_id {
            self.writers_on_prewrite.insert(writer);
        }
    }

    fn observe_reader(&mut self, reader: TxnId) {
        if reader != self.txn_id {
            self.readers.insert(reader);
        }
    }

    fn raise_read_ts(&mut self, ts: Timestamp) {
        if self.high_water_read_ts < ts {
            self.high_water_read_ts = ts;
        }
    }

    fn raise_write_ts(&mut self, ts: Timestamp) {
        if self.high_water_write_ts < ts {
            self.high_water_write_ts = ts;
        }
    }
}

struct Access {
    row: Arc<RowMaat>,
    kind: AccessKind,
    /// Payload to apply on commit, for writes.
    staged: Option<Vec<u8>>,
}

/// Drives one transaction's accesses and finishes each of them exactly once.
///
/// The commit timestamp is decided outside, from [`observations`](Self::observations).
/// A `Txn` dropped before it commits aborts every access it made, so no soft
/// lock outlives its transaction.
pub struct Txn {
    observations: TxnObservations,
    /// Accesses in the order they were made.
    accesses: Vec<Access>,
    /// (row address, kind) -> index into `accesses`.
    index: HashMap<(usize, AccessKind), usize>,
    finished: bool,
}

impl Txn {
    pub fn new(txn_id: TxnId) -> Self {
        Self {
            observations: TxnObservations::new(txn_id),
            accesses: Vec::new(),
            index: HashMap::new(),
            finished: false,
        }
    }

    pub fn id(&self) -> TxnId {
        self.observations.txn_id
    }

    pub fn observations(&self) -> &TxnObservations {
        &self.observations
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of distinct (record, kind) accesses made so far.
    pub fn access_count(&self) -> usize {
        self.accesses.len()
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(MaatError::AlreadyFinished { txn_id: self.id() });
        }
        Ok(())
    }

    fn position(&self, row: &Arc<RowMaat>, kind: AccessKind) -> Option<usize> {
        self.index.get(&(Arc::as_ptr(row) as usize, kind)).copied()
    }

    fn record(&mut self, row: &Arc<RowMaat>, kind: AccessKind, staged: Option<Vec<u8>>) {
        self.index
            .insert((Arc::as_ptr(row) as usize, kind), self.accesses.len());
        self.accesses.push(Access {
            row: row.clone(),
            kind,
            staged,
        });
    }

    fn staged(&self, row: &Arc<RowMaat>) -> Option<&Vec<u8>> {
        self.position(row, AccessKind::Write)
            .and_then(|idx| self.accesses[idx].staged.as_ref())
    }

    /// Read a record. Returns our own staged write if there is one, otherwise
    /// the committed payload.
    ///
    /// Only the first read of a record registers with it; later reads return
    /// the payload without going back in flight.
    pub fn read(&mut self, row: &Arc<RowMaat>) -> Result<Vec<u8>> {
        self.ensure_active()?;

        let data = if self.position(row, AccessKind::Read).is_some() {
            None
        } else {
            let (_, data) = row.read_with_data(&mut self.observations);
            self.record(row, AccessKind::Read, None);
            Some(data)
        };

        // Read-your-own-writes
        if let Some(staged) = self.staged(row) {
            return Ok(staged.clone());
        }
        Ok(data.unwrap_or_else(|| row.data()))
    }

    /// Stage a write. It becomes visible when the transaction commits.
    ///
    /// Writing a record again only replaces the staged payload.
    pub fn write(&mut self, row: &Arc<RowMaat>, data: Vec<u8>) -> Result<()> {
        self.ensure_active()?;

        match self.position(row, AccessKind::Write) {
            Some(idx) => self.accesses[idx].staged = Some(data),
            None => {
                let _ = row.prewrite(&mut self.observations);
                self.record(row, AccessKind::Write, Some(data));
            }
        }
        Ok(())
    }

    /// Commit every access at `commit_ts`.
    ///
    /// Fails without touching any record if `commit_ts` is below
    /// [`TxnObservations::min_commit_ts`]; the transaction stays active and can
    /// still be aborted.
    pub fn commit_at(&mut self, commit_ts: Timestamp) -> Result<Timestamp> {
        self.ensure_active()?;

        let min_commit_ts = self.observations.min_commit_ts();
        if commit_ts < min_commit_ts {
            return Err(MaatError::CommitTimestampTooLow {
                txn_id: self.id(),
                commit_ts,
                min_commit_ts,
            });
        }

        let txn_id = self.id();
        for access in &self.accesses {
            let _ = access
                .row
                .commit(access.kind, txn_id, commit_ts, access.staged.as_deref());
        }
        self.finished = true;

        debug!(txn_id, commit_ts, accesses = self.accesses.len(), "transaction committed");
        Ok(commit_ts)
    }

    /// Roll back every access.
    pub fn abort(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.rollback();
        Ok(())
    }

    fn rollback(&mut self) {
        let txn_id = self.id();
        for access in &self.accesses {
            let _ = access.row.abort(access.kind, txn_id);
        }
        self.finished = true;
        debug!(txn_id, accesses = self.accesses.len(), "transaction aborted");
    }
}

impl Drop for Txn {
    fn drop(&mut self) {
        if !self.finished {
            self.rollback();
        }
    }
}

impl std::fmt::Debug for Txn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Txn")
            .field("txn_id", &self.id())
            .field("accesses", &self.accesses.len())
            .field("finished", &self.finished)
            .finish()
    }
}
