use crate::timestamp::{Timestamp, TxnId};

/// Write-side interface of a transaction's accumulator.
///
/// A record copies what it sees under its latch into the caller through this
/// trait. Implementors are owned by a single transaction and are only touched
/// by the thread running it, so no synchronization is needed here.
///
/// Writers seen during a read and writers seen during a prewrite go to two
/// different sets. They order differently against the observing transaction
/// and must not be merged.
pub trait AccessObserver {
    /// Id of the observing transaction.
    fn txn_id(&self) -> TxnId;

    /// A writer was in flight when this transaction read the record.
    fn observe_writer_on_read(&mut self, writer: TxnId);

    /// A writer was in flight when this transaction prewrote the record.
    fn observe_writer_on_prewrite(&mut self, writer: TxnId);

    /// A reader was in flight when this transaction prewrote the record.
    fn observe_reader(&mut self, reader: TxnId);

    /// Raise the high-water read timestamp to `ts` if it is larger.
    fn raise_read_ts(&mut self, ts: Timestamp);

    /// Raise the high-water write timestamp to `ts` if it is larger.
    fn raise_write_ts(&mut self, ts: Timestamp);
}
