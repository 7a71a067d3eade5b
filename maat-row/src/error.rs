use crate::timestamp::{Timestamp, TxnId};
use thiserror::Error;

/// Typed errors for transaction-level operations.
///
/// Record-level operations never fail; these are raised by the [`Txn`](crate::Txn)
/// driver and the engine when a caller breaks the access protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaatError {
    /// The transaction already committed or aborted.
    #[error("transaction {txn_id} already finished")]
    AlreadyFinished { txn_id: TxnId },

    /// The decided commit timestamp does not order the transaction after
    /// every committed access it observed.
    #[error(
        "commit timestamp {commit_ts} for transaction {txn_id} is below the observed bound {min_commit_ts}"
    )]
    CommitTimestampTooLow {
        txn_id: TxnId,
        commit_ts: Timestamp,
        min_commit_ts: Timestamp,
    },

    /// Engine configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MaatError>;
